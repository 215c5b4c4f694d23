use axum::Json;
use event_checkin_database::models::Company;
use event_checkin_database::QueryExecutor;

use super::Shared;
use crate::error::ApiError;

pub async fn list<E: QueryExecutor + 'static>(
    queries: Shared<E>,
) -> Result<Json<Vec<Company>>, ApiError> {
    Ok(Json(queries.fetch_companies().await?))
}
