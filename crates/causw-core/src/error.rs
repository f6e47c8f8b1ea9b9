//! Error types for `causw-core`.
//!
//! Every variant is classified by [`Error::kind`] so outer layers can render
//! a status without matching on individual variants.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::user::{Role, UserState};

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  NotFound,
  ValidationFailed,
  Conflict,
  PermissionDenied,
  InternalMisconfiguration,
  Backend,
}

#[derive(Debug, Error)]
pub enum Error {
  // ── Missing rows ──────────────────────────────────────────────────────
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("locker not found: {0}")]
  LockerNotFound(Uuid),

  // ── User-correctable validation ───────────────────────────────────────
  #[error("user is not active (state: {0})")]
  UserNotActive(UserState),

  #[error("user has no role")]
  RoleIsNone,

  #[error("locker registration is currently closed")]
  LockerAccessDenied,

  #[error("locker registration cooldown has not elapsed ({remaining_secs}s remaining)")]
  CooldownNotElapsed { remaining_secs: i64 },

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error("a circle id is required to grant {0}")]
  CircleIdRequired(Role),

  // ── Conflicts with current locker state ───────────────────────────────
  #[error("locker is already in use")]
  LockerInUse,

  #[error("locker is deactivated")]
  LockerDeactivated,

  #[error("locker is not in use")]
  LockerNotInUse,

  #[error("locker is held by another user")]
  LockerNotOwned,

  // ── Authorisation ─────────────────────────────────────────────────────
  #[error("permission denied: {0}")]
  PermissionDenied(String),

  // ── Operator misconfiguration ─────────────────────────────────────────
  #[error("locker expiration date is not configured")]
  ExpirationNotConfigured,

  #[error("locker expiration date {0:?} is not in yyyy-MM-dd HH:mm form")]
  ExpirationMalformed(String),

  // ── Backends ──────────────────────────────────────────────────────────
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("upload error: {0}")]
  Upload(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error raised by a persistence port.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// Box a backend error raised by a [`FileUploader`](crate::upload::FileUploader).
  pub fn upload<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Upload(Box::new(e))
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::UserNotFound(_) | Self::LockerNotFound(_) => ErrorKind::NotFound,
      Self::UserNotActive(_)
      | Self::RoleIsNone
      | Self::LockerAccessDenied
      | Self::CooldownNotElapsed { .. }
      | Self::UnknownRole(_)
      | Self::CircleIdRequired(_) => ErrorKind::ValidationFailed,
      Self::LockerInUse
      | Self::LockerDeactivated
      | Self::LockerNotInUse
      | Self::LockerNotOwned => ErrorKind::Conflict,
      Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
      Self::ExpirationNotConfigured | Self::ExpirationMalformed(_) => {
        ErrorKind::InternalMisconfiguration
      }
      Self::Store(_) | Self::Upload(_) => ErrorKind::Backend,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
