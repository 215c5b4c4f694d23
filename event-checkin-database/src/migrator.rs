use diesel_async::SimpleAsyncConnection;
use tracing::info;

use crate::error::DatabaseError;
use crate::Pool;

// idempotent, runs on every startup
const CREATE_CHECKIN: &str = include_str!("../migrations/2024-01-15-000000_create_checkin/up.sql");

pub async fn run_migrations(pool: &Pool) -> Result<(), DatabaseError> {
    let mut connection = pool.get().await?;
    info!("creating check-in tables if missing");
    connection.batch_execute(CREATE_CHECKIN).await?;
    Ok(())
}
