use std::sync::Arc;

use async_trait::async_trait;
use diesel::deserialize::QueryableByName;
use diesel::pg::Pg;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::error::QueryError;
use crate::statement::Statement;
use crate::Pool;

/// A row type a statement can be decoded into.
#[cfg(not(any(test, feature = "stub")))]
pub trait Row: QueryableByName<Pg> + Send + 'static {}

#[cfg(not(any(test, feature = "stub")))]
impl<T> Row for T where T: QueryableByName<Pg> + Send + 'static {}

/// A row type a statement can be decoded into. The scripted executor builds
/// rows from JSON, so they must also be deserializable.
#[cfg(any(test, feature = "stub"))]
pub trait Row: QueryableByName<Pg> + serde::de::DeserializeOwned + Send + 'static {}

#[cfg(any(test, feature = "stub"))]
impl<T> Row for T where T: QueryableByName<Pg> + serde::de::DeserializeOwned + Send + 'static {}

/// Runs parameterized statements. Implementations own connection handling and
/// must be usable from many requests at once.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Runs `statement` and returns its rows in result order.
    async fn query<R: Row>(&self, statement: &Statement) -> Result<Vec<R>, QueryError>;

    /// Runs `statement` and returns the number of affected rows.
    async fn execute(&self, statement: &Statement) -> Result<usize, QueryError>;
}

#[async_trait]
impl<T: QueryExecutor> QueryExecutor for Arc<T> {
    async fn query<R: Row>(&self, statement: &Statement) -> Result<Vec<R>, QueryError> {
        QueryExecutor::query(&**self, statement).await
    }

    async fn execute(&self, statement: &Statement) -> Result<usize, QueryError> {
        QueryExecutor::execute(&**self, statement).await
    }
}

#[derive(Clone)]
pub struct PgExecutor {
    pool: Pool,
}

impl PgExecutor {
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn query<R: Row>(&self, statement: &Statement) -> Result<Vec<R>, QueryError> {
        debug!(
            statement = statement.name,
            params = statement.params.len(),
            "query"
        );
        let mut connection = self.pool.get().await?;
        statement
            .to_sql_query()
            .load::<R>(&mut connection)
            .await
            .map_err(|err| {
                debug!(statement = statement.name, "query failed: {err}");
                err.into()
            })
    }

    async fn execute(&self, statement: &Statement) -> Result<usize, QueryError> {
        debug!(
            statement = statement.name,
            params = statement.params.len(),
            "execute"
        );
        let mut connection = self.pool.get().await?;
        statement
            .to_sql_query()
            .execute(&mut connection)
            .await
            .map_err(|err| {
                debug!(statement = statement.name, "execute failed: {err}");
                err.into()
            })
    }
}
