//! API error type and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use dramatis_core::RosterError;
use serde_json::json;
use thiserror::Error;

/// A roster failure leaving through HTTP. The status mapping is the whole
/// job; the service already decided what the failure is.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub RosterError);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      RosterError::InvalidImage => StatusCode::BAD_REQUEST,
      RosterError::Denied => StatusCode::FORBIDDEN,
      RosterError::NotFound(_) => StatusCode::NOT_FOUND,
      RosterError::DuplicateName(_) | RosterError::Ambiguous(_) => {
        StatusCode::CONFLICT
      }
      RosterError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = match &self.0 {
      // Ambiguity is the one failure that carries data the caller needs.
      RosterError::Ambiguous(candidates) => {
        json!({ "error": self.0.to_string(), "candidates": candidates })
      }
      other => json!({ "error": other.to_string() }),
    };

    (status, Json(body)).into_response()
  }
}
