//! Server error type and axum `IntoResponse` implementation.
//!
//! Storage and verifier internals are logged, never returned to clients.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("bad request: {0}")]
  BadRequest(String),

  /// The verifier examined the proof and rejected it.
  #[error("invalid proof")]
  InvalidProof,

  /// A session credential that matches no session.
  #[error("unauthorized")]
  Unauthorized,

  #[error("validation failed: {0}")]
  Validation(#[source] gatehouse_core::Error),

  #[error("verifier unavailable")]
  VerifierUnavailable,

  #[error("store error")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      Error::InvalidProof => {
        (StatusCode::UNAUTHORIZED, "invalid identity token".to_string())
      }
      Error::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "unauthorized".to_string())
      }
      Error::Validation(e) => {
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
      }
      Error::VerifierUnavailable => (
        StatusCode::INTERNAL_SERVER_ERROR,
        "verification service failure".to_string(),
      ),
      Error::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, "storage failure".to_string())
      }
    };
    (status, Json(json!({ "message": message }))).into_response()
  }
}
