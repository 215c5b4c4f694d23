use axum::extract::Query;
use axum::Json;
use event_checkin_database::models::{Acknowledgment, NewParticipation, Participation};
use event_checkin_database::{CheckinError, QueryExecutor};
use hyper::StatusCode;
use serde::Deserialize;

use super::{JsonBody, Shared};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ParticipationQuery {
    person_id: Option<String>,
    event_id: Option<String>,
}

/// Answers `null` when the person does not attend the event.
pub async fn fetch<E: QueryExecutor + 'static>(
    queries: Shared<E>,
    Query(query): Query<ParticipationQuery>,
) -> Result<Json<Option<Participation>>, ApiError> {
    let (Some(person_id), Some(event_id)) = (query.person_id, query.event_id) else {
        return Err(CheckinError::InvalidRequest(
            "person_id and event_id are required".to_owned(),
        )
        .into());
    };
    Ok(Json(queries.fetch_participation(&person_id, &event_id).await?))
}

pub async fn add<E: QueryExecutor + 'static>(
    queries: Shared<E>,
    JsonBody(participation): JsonBody<NewParticipation>,
) -> Result<(StatusCode, Json<Acknowledgment>), ApiError> {
    let acknowledgment = queries.add_participation(&participation).await?;
    Ok((StatusCode::CREATED, Json(acknowledgment)))
}
