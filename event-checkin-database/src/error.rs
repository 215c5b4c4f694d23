use std::env::VarError;

use diesel::result::DatabaseErrorKind;
use diesel_async::pooled_connection::deadpool;
use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database url not set in env variable DATABASE_URL")]
    DatabaseEnvUrl(#[from] VarError),
    #[error("Failed to create database pool {0}")]
    PoolBuild(#[from] deadpool::BuildError),
    #[error("Database pool failed {0}")]
    Pool(#[from] deadpool::PoolError),
    #[error("Database migration failed {0}")]
    Migration(#[from] diesel::result::Error),
}

/// Failure reported by a [`crate::executor::QueryExecutor`].
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Database pool failed {0}")]
    Pool(#[from] deadpool::PoolError),
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error("Database query failed {0}")]
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for QueryError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation(info.message().to_owned())
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::ForeignKeyViolation(info.message().to_owned())
            }
            other => Self::Database(other),
        }
    }
}

/// Outcome of a data access operation that did not succeed.
#[derive(Error, Debug)]
pub enum CheckinError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(#[from] QueryError),
}

impl CheckinError {
    /// HTTP status code for this kind of failure.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) | Self::Conflict(_) => 400,
            Self::NotFound(_) => 404,
            Self::Storage(_) => 500,
        }
    }
}
