pub mod companies;
pub mod events;
pub mod participation;
pub mod persons;

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequest, Request, State};
use axum::Json;
use event_checkin_database::Queries;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Router state shared by every handler.
pub type Shared<E> = State<Arc<Queries<E>>>;

/// A JSON request body. Malformed bodies are answered like any other invalid
/// request instead of with axum's plain-text rejection.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
