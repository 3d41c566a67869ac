//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! This is the single place where failures become HTTP responses; handlers
//! only ever return `Err(ApiError)`.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Status sent when an authenticated caller tries to mutate a document it
/// does not own.
///
/// This is `401`, the same status as a missing token, not `403`. Clients
/// of the API already rely on it.
pub const OWNERSHIP_DENIED_STATUS: StatusCode = StatusCode::UNAUTHORIZED;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("missing or invalid bearer token")]
  Unauthenticated,

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("validation failed: {0}")]
  ValidationFailed(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<rally_core::Error> for ApiError {
  fn from(e: rally_core::Error) -> Self {
    use rally_core::Error;
    match e {
      Error::NotFound { .. } => ApiError::NotFound(e.to_string()),
      Error::Forbidden { .. } => ApiError::Forbidden(e.to_string()),
      Error::Validation { .. } => ApiError::ValidationFailed(e.to_string()),
      Error::Serialization(e) => ApiError::Serialization(e),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Forbidden(m) => {
        tracing::warn!("ownership denied: {m}");
        (OWNERSHIP_DENIED_STATUS, m.clone())
      }
      ApiError::ValidationFailed(_) => {
        (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
      }
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Serialization(e) => {
        tracing::error!("serialization failure: {e}");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
      ApiError::Store(e) => {
        tracing::error!("store failure: {e}");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if matches!(self, ApiError::Unauthenticated) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"rally\""),
      );
    }
    res
  }
}
