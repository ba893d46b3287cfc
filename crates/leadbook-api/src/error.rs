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
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  /// A path id that is not a UUID. Surfaced as a server error, the same way
  /// any other failed store lookup is.
  #[error("invalid lead id {0:?}")]
  MalformedId(String),

  #[error("{0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<leadbook_core::Error> for ApiError {
  fn from(e: leadbook_core::Error) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::MalformedId(_) | ApiError::Store(_) => {
        tracing::error!(error = %self, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    (status, Json(json!({ "message": self.to_string() }))).into_response()
  }
}
