use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::Json;
use event_checkin_config::ConfigError;
use event_checkin_database::{CheckinError, DatabaseError};
use hyper::StatusCode;
use serde::Serialize;
use tracing::error;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    File(#[from] std::io::Error),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

/// A failed check-in operation on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub CheckinError);

impl From<CheckinError> for ApiError {
    fn from(value: CheckinError) -> Self {
        Self(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(CheckinError::InvalidRequest(rejection.body_text()))
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match self.0 {
            CheckinError::Storage(err) => {
                error!("storage error: {err}");
                "internal server error".to_owned()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
