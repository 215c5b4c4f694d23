use axum::extract::Path;
use axum::Json;
use event_checkin_database::models::{Acknowledgment, NewPerson, Person, PersonUpdate};
use event_checkin_database::QueryExecutor;
use hyper::StatusCode;

use super::{JsonBody, Shared};
use crate::error::ApiError;

pub async fn fetch_by_id<E: QueryExecutor + 'static>(
    queries: Shared<E>,
    Path(id): Path<String>,
) -> Result<Json<Person>, ApiError> {
    Ok(Json(queries.fetch_person_by_id(Some(&id)).await?))
}

pub async fn fetch_by_card_id<E: QueryExecutor + 'static>(
    queries: Shared<E>,
    Path(card_id): Path<String>,
) -> Result<Json<Person>, ApiError> {
    Ok(Json(queries.fetch_person_by_card_id(Some(&card_id)).await?))
}

pub async fn update<E: QueryExecutor + 'static>(
    queries: Shared<E>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<PersonUpdate>,
) -> Result<Json<Acknowledgment>, ApiError> {
    Ok(Json(queries.update_person_by_id(Some(&id), &update).await?))
}

pub async fn create<E: QueryExecutor + 'static>(
    queries: Shared<E>,
    JsonBody(person): JsonBody<NewPerson>,
) -> Result<(StatusCode, Json<Acknowledgment>), ApiError> {
    let acknowledgment = queries.create_person(&person).await?;
    Ok((StatusCode::CREATED, Json(acknowledgment)))
}
