pub mod error;
pub mod executor;
pub mod migrator;
pub mod models;
pub mod queries;
pub mod schema;
pub mod statement;
#[cfg(any(test, feature = "stub"))]
pub mod stub;

use diesel_async::pooled_connection::deadpool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
pub use error::{CheckinError, DatabaseError, QueryError};
pub use executor::{PgExecutor, QueryExecutor};
pub use queries::Queries;

pub type Pool = deadpool::Pool<AsyncPgConnection>;

// https://github.com/tokio-rs/axum/tree/main/examples/diesel-async-postgres

pub fn get_database_connection(database_url: &str, max_size: usize) -> Result<Pool, DatabaseError> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Ok(deadpool::Pool::builder(config).max_size(max_size).build()?)
}

pub fn get_database_connection_from_env() -> Result<Pool, DatabaseError> {
    let database_url = std::env::var("DATABASE_URL")?;
    get_database_connection(&database_url, 4)
}
