//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use causw_core::ErrorKind;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The acting user could not be identified from the request.
  #[error("missing or malformed {} header", crate::auth::USER_ID_HEADER)]
  Unauthorized,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] causw_core::Error),
}

impl ApiError {
  fn status_and_kind(&self) -> (StatusCode, &'static str) {
    match self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
      ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
      ApiError::Core(e) => match e.kind() {
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        ErrorKind::ValidationFailed => (StatusCode::BAD_REQUEST, "validation_failed"),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "conflict"),
        ErrorKind::PermissionDenied => (StatusCode::FORBIDDEN, "permission_denied"),
        ErrorKind::InternalMisconfiguration => {
          (StatusCode::INTERNAL_SERVER_ERROR, "internal_misconfiguration")
        }
        ErrorKind::Backend => (StatusCode::INTERNAL_SERVER_ERROR, "backend"),
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind) = self.status_and_kind();
    if status.is_server_error() {
      tracing::error!(error = %self, kind, "request failed");
    }
    (status, Json(json!({ "error": self.to_string(), "kind": kind }))).into_response()
  }
}
