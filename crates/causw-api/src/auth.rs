//! Identification of the acting user.
//!
//! Authentication happens upstream; this crate only reads the user id the
//! gateway forwards in [`USER_ID_HEADER`].

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf a request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub Uuid);

impl<St: Send + Sync> FromRequestParts<St> for ActingUser {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
    parts
      .headers
      .get(USER_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .and_then(|s| Uuid::parse_str(s.trim()).ok())
      .map(ActingUser)
      .ok_or(ApiError::Unauthorized)
  }
}
