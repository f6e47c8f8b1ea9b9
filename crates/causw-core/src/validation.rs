//! Fail-fast validation over plain predicates.
//!
//! A [`ValidatorBucket`] collects [`Validator`]s and evaluates them in
//! insertion order; the first failure is returned and the rest are skipped.

use chrono::{DateTime, Duration, Utc};

use crate::{
  Error, Result,
  user::{Role, UserState},
};

/// A single check together with the error it raises.
#[derive(Debug, Clone)]
pub enum Validator {
  /// The user's account must be active.
  UserState(UserState),
  /// The user must have been given a role.
  UserRoleIsNone(Role),
  /// The locker must not already have a holder.
  LockerInUse { in_use: bool },
  /// The locker must be enabled.
  LockerIsDeactivated { is_active: bool },
  /// Self-service locker registration must be open.
  LockerAccess { allowed: bool },
  /// More than `window` must have passed since `since`.
  TimePassed {
    since:  DateTime<Utc>,
    now:    DateTime<Utc>,
    window: Duration,
  },
  /// The role must be one of `allowed`.
  RoleIn {
    role:    Role,
    allowed: &'static [Role],
    action:  &'static str,
  },
}

impl Validator {
  pub fn check(&self) -> Result<()> {
    match self {
      Self::UserState(state) => {
        if !state.is_active() {
          return Err(Error::UserNotActive(*state));
        }
      }
      Self::UserRoleIsNone(role) => {
        if role.is_none() {
          return Err(Error::RoleIsNone);
        }
      }
      Self::LockerInUse { in_use } => {
        if *in_use {
          return Err(Error::LockerInUse);
        }
      }
      Self::LockerIsDeactivated { is_active } => {
        if !is_active {
          return Err(Error::LockerDeactivated);
        }
      }
      Self::LockerAccess { allowed } => {
        if !allowed {
          return Err(Error::LockerAccessDenied);
        }
      }
      Self::TimePassed { since, now, window } => {
        let elapsed = *now - *since;
        if elapsed <= *window {
          return Err(Error::CooldownNotElapsed {
            remaining_secs: (*window - elapsed).num_seconds().max(1),
          });
        }
      }
      Self::RoleIn { role, allowed, action } => {
        if !allowed.contains(role) {
          return Err(Error::PermissionDenied(format!("{role} may not {action}")));
        }
      }
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Default)]
pub struct ValidatorBucket {
  validators: Vec<Validator>,
}

impl ValidatorBucket {
  pub fn of() -> Self { Self::default() }

  pub fn consist_of(mut self, validator: Validator) -> Self {
    self.validators.push(validator);
    self
  }

  /// Run every validator in order, stopping at the first failure.
  pub fn validate(self) -> Result<()> {
    self.validators.iter().try_for_each(Validator::check)
  }
}

/// The checks every signed-in action starts with.
pub fn active_user(state: UserState, role: Role) -> ValidatorBucket {
  ValidatorBucket::of()
    .consist_of(Validator::UserState(state))
    .consist_of(Validator::UserRoleIsNone(role))
}
