//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A decision for this pair already exists. Clients should treat the 409
  /// as confirmation of prior state, not as a failure to surface.
  #[error("conflict: {0}")]
  Conflict(String),

  /// The persistence layer (or an upstream collaborator) could not be
  /// reached. Retryable by the caller; the service never retries itself.
  #[error("unavailable: {0}")]
  Unavailable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store failure through the domain taxonomy.
  pub fn from_store<E>(e: E) -> Self
  where
    E: Into<kindred_core::Error>,
  {
    Self::from(e.into())
  }
}

impl From<kindred_core::Error> for ApiError {
  fn from(e: kindred_core::Error) -> Self {
    use kindred_core::Error as Core;
    match e {
      Core::SelfSwipe(_) | Core::EmptyUserId | Core::InvalidProfile(_) => {
        ApiError::BadRequest(e.to_string())
      }
      Core::DuplicateSwipe { .. } => ApiError::Conflict(e.to_string()),
      Core::ProfileNotFound(_) => ApiError::NotFound(e.to_string()),
      Core::StorageUnavailable(_) => ApiError::Unavailable(e.to_string()),
      Core::Serialization(inner) => ApiError::Store(Box::new(inner)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "unauthorized".to_string())
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
