use axum::extract::Path;
use axum::Json;
use event_checkin_database::models::{AttendeeCount, CompanyAttendance, Event, Participant};
use event_checkin_database::QueryExecutor;

use super::Shared;
use crate::error::ApiError;

pub async fn list<E: QueryExecutor + 'static>(
    queries: Shared<E>,
) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(queries.fetch_events().await?))
}

pub async fn fetch_by_id<E: QueryExecutor + 'static>(
    queries: Shared<E>,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(queries.fetch_event_by_id(Some(&id)).await?))
}

pub async fn participants<E: QueryExecutor + 'static>(
    queries: Shared<E>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Participant>>, ApiError> {
    Ok(Json(queries.fetch_participants_by_event_id(Some(&id)).await?))
}

pub async fn attendance<E: QueryExecutor + 'static>(
    queries: Shared<E>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CompanyAttendance>>, ApiError> {
    Ok(Json(
        queries
            .fetch_company_attendance_count_by_event_id(Some(&id))
            .await?,
    ))
}

pub async fn total_attendance<E: QueryExecutor + 'static>(
    queries: Shared<E>,
    Path(id): Path<String>,
) -> Result<Json<AttendeeCount>, ApiError> {
    Ok(Json(
        queries
            .fetch_total_attendee_count_by_event_id(Some(&id))
            .await?,
    ))
}
