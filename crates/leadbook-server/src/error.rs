//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Rejections produced by the HTTP surface itself (auth and rate limiting).
#[derive(Debug, Error)]
pub enum Error {
  #[error("Please provide email and password")]
  MissingCredentials,
  #[error("Invalid credentials")]
  InvalidCredentials,
  #[error("No token, authorization denied")]
  MissingToken,
  #[error("Token is not valid")]
  InvalidToken,
  #[error("Too many requests, please try again later.")]
  RateLimited,
  #[error("jwt_secret is not configured")]
  MissingSecret,
  #[error("token error: {0}")]
  Token(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match self {
      Error::MissingCredentials => StatusCode::BAD_REQUEST,
      Error::InvalidCredentials | Error::MissingToken | Error::InvalidToken => {
        StatusCode::UNAUTHORIZED
      }
      Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
      Error::MissingSecret | Error::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "message": self.to_string() }))).into_response()
  }
}
