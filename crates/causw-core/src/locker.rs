//! Lockers, their audit log, and the atomic transitions between them.
//!
//! A locker moves between `Free` and `Held`. Both directions are expressed
//! as a [`LockerTransition`] which the store applies as one unit: a
//! compare-and-set on the target's holder, an optional release of another
//! locker, and the log entries describing what happened.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::User;

// ─── Locker ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locker {
  pub locker_id:     Uuid,
  pub locker_number: u32,
  /// Human-readable name of the location (building/floor).
  pub location:      String,
  pub is_active:     bool,
  /// The user currently holding this locker.
  pub holder:        Option<Uuid>,
  /// Due date for returning the locker, in the platform's local time.
  pub expired_at:    Option<NaiveDateTime>,
}

impl Locker {
  pub fn is_held(&self) -> bool { self.holder.is_some() }

  pub fn is_held_by(&self, user_id: Uuid) -> bool { self.holder == Some(user_id) }

  pub fn register(&mut self, user_id: Uuid, expired_at: NaiveDateTime) {
    self.holder = Some(user_id);
    self.expired_at = Some(expired_at);
  }

  pub fn return_locker(&mut self) {
    self.holder = None;
    self.expired_at = None;
  }
}

// ─── Log ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockerLogAction {
  Register,
  Return,
  Activate,
  Deactivate,
}

impl LockerLogAction {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Register => "REGISTER",
      Self::Return => "RETURN",
      Self::Activate => "ACTIVATE",
      Self::Deactivate => "DEACTIVATE",
    }
  }
}

/// An immutable audit entry. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockerLog {
  pub log_id:        Uuid,
  pub locker_number: u32,
  pub location_name: String,
  pub user_id:       Uuid,
  pub user_email:    String,
  pub action:        LockerLogAction,
  pub message:       String,
  pub created_at:    DateTime<Utc>,
}

/// Input for appending a [`LockerLog`]. The store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLockerLog {
  pub locker_number: u32,
  pub location_name: String,
  pub user_id:       Uuid,
  pub user_email:    String,
  pub action:        LockerLogAction,
  pub message:       String,
}

impl NewLockerLog {
  pub fn new(locker: &Locker, actor: &User, action: LockerLogAction) -> Self {
    Self {
      locker_number: locker.locker_number,
      location_name: locker.location.clone(),
      user_id:       actor.user_id,
      user_email:    actor.email.clone(),
      action,
      message:       String::new(),
    }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = message.into();
    self
  }
}

// ─── Transitions ─────────────────────────────────────────────────────────────

/// A locker that must be freed as part of a transition, provided it is still
/// held by `holder` when the transition is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
  pub locker: Locker,
  pub holder: Uuid,
}

/// A holder change applied atomically by
/// [`LockerPort::commit_transition`](crate::store::LockerPort::commit_transition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockerTransition {
  /// The desired state of the target locker after the transition.
  pub target:          Locker,
  /// The holder the target must still have for the transition to apply.
  pub expected_holder: Option<Uuid>,
  /// Another locker to free in the same unit of work.
  pub release:         Option<Release>,
  /// Log entries appended only if the transition applies.
  pub logs:            Vec<NewLockerLog>,
}

/// What happened when a [`LockerTransition`] was committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
  /// Every write succeeded; carries the stored target locker.
  Applied(Locker),
  /// The target locker no longer exists. Nothing was written.
  Missing,
  /// A holder or activity check failed. Nothing was written.
  Contended,
}
