//! The locker workflow.
//!
//! Every action validates against the locker and acting user as loaded,
//! builds a [`LockerTransition`] and hands it to the store, which applies it
//! atomically. No write happens before all checks have passed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  clock::Clock,
  locker::{Locker, LockerLog, LockerLogAction, LockerTransition, NewLockerLog, Release, TransitionOutcome},
  settings::{EXPIRED_AT, LOCKER_ACCESS, LockerPolicy, parse_expiration},
  store::{FlagPort, LockerLogPort, LockerPort, TextFieldPort, UserPort},
  user::{Role, User},
  validation::{Validator, ValidatorBucket},
};

use super::load_active_user;

/// What a user asks to do with a locker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockerAction {
  Register,
  Return,
  Activate,
  Deactivate,
}

pub struct LockerService<'a, S> {
  store:  &'a S,
  clock:  &'a dyn Clock,
  policy: LockerPolicy,
}

impl<'a, S> LockerService<'a, S>
where
  S: UserPort + LockerPort + LockerLogPort + FlagPort + TextFieldPort,
{
  pub fn new(store: &'a S, clock: &'a dyn Clock, policy: LockerPolicy) -> Self {
    Self { store, clock, policy }
  }

  pub async fn find(&self, locker_id: Uuid) -> Result<Locker> {
    self
      .store
      .find_locker(locker_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::LockerNotFound(locker_id))
  }

  /// The audit trail of a locker, oldest first.
  pub async fn logs(&self, locker_id: Uuid) -> Result<Vec<LockerLog>> {
    let locker = self.find(locker_id).await?;
    self
      .store
      .find_locker_logs(locker.locker_number, &locker.location)
      .await
      .map_err(Error::store)
  }

  /// Load the acting user and locker, then perform `action`.
  ///
  /// Returns `None` if the locker disappeared between validation and the
  /// write.
  pub async fn apply(
    &self,
    action: LockerAction,
    locker_id: Uuid,
    user_id: Uuid,
  ) -> Result<Option<Locker>> {
    let user = load_active_user(self.store, user_id).await?;
    let locker = self.find(locker_id).await?;

    let result = match action {
      LockerAction::Register => self.register(locker, &user).await,
      LockerAction::Return => self.return_locker(locker, &user).await,
      LockerAction::Activate => self.set_active(locker, &user, true).await,
      LockerAction::Deactivate => self.set_active(locker, &user, false).await,
    };

    match &result {
      Ok(Some(l)) => tracing::info!(
        ?action,
        locker_number = l.locker_number,
        location = %l.location,
        user_id = %user.user_id,
        "locker action applied"
      ),
      Ok(None) => tracing::warn!(?action, %locker_id, "locker vanished during action"),
      Err(e) => tracing::debug!(?action, %locker_id, error = %e, "locker action rejected"),
    }
    result
  }

  /// Register `locker` to `user`, first releasing any other locker the user
  /// holds.
  ///
  /// Administrators skip the access flag and cooldown checks but still give
  /// up their previous locker.
  pub async fn register(&self, locker: Locker, user: &User) -> Result<Option<Locker>> {
    ValidatorBucket::of()
      .consist_of(Validator::LockerInUse { in_use: locker.is_held() })
      .consist_of(Validator::LockerIsDeactivated { is_active: locker.is_active })
      .validate()?;

    if !user.role.is_admin() {
      let allowed = self
        .store
        .find_flag(LOCKER_ACCESS)
        .await
        .map_err(Error::store)?
        .unwrap_or(false);
      ValidatorBucket::of()
        .consist_of(Validator::LockerAccess { allowed })
        .validate()?;

      if let Some(since) = self
        .store
        .when_register(user.user_id)
        .await
        .map_err(Error::store)?
      {
        ValidatorBucket::of()
          .consist_of(Validator::TimePassed {
            since,
            now: self.clock.now(),
            window: self.policy.cooldown(),
          })
          .validate()?;
      }
    }

    // Resolved before any write so a misconfiguration never strands the
    // user without a locker.
    let due = self
      .store
      .find_text_field(EXPIRED_AT)
      .await
      .map_err(Error::store)?;
    let expired_at = parse_expiration(due.as_deref())?;

    let release = self
      .store
      .find_locker_by_user_id(user.user_id)
      .await
      .map_err(Error::store)?
      .filter(|held| held.locker_id != locker.locker_id)
      .map(|mut held| {
        held.return_locker();
        Release { locker: held, holder: user.user_id }
      });

    let mut logs = Vec::with_capacity(2);
    if let Some(release) = &release {
      logs.push(NewLockerLog::new(&release.locker, user, LockerLogAction::Return));
    }

    let mut target = locker;
    target.register(user.user_id, expired_at);
    logs.push(NewLockerLog::new(&target, user, LockerLogAction::Register));

    self
      .commit(
        LockerTransition { target, expected_holder: None, release, logs },
        Error::LockerInUse,
      )
      .await
  }

  /// Free `locker`. Only its holder or an administrator may do so.
  pub async fn return_locker(&self, locker: Locker, user: &User) -> Result<Option<Locker>> {
    let holder = locker.holder.ok_or(Error::LockerNotInUse)?;
    if holder != user.user_id && !user.role.is_admin() {
      return Err(Error::LockerNotOwned);
    }

    let mut target = locker;
    target.return_locker();
    let log = NewLockerLog::new(&target, user, LockerLogAction::Return);

    self
      .commit(
        LockerTransition {
          target,
          expected_holder: Some(holder),
          release: None,
          logs: vec![log],
        },
        Error::LockerNotOwned,
      )
      .await
  }

  /// Enable or disable `locker`. Administrators only; a held locker cannot
  /// be disabled.
  pub async fn set_active(
    &self,
    locker: Locker,
    user: &User,
    active: bool,
  ) -> Result<Option<Locker>> {
    let action = if active { "activate lockers" } else { "deactivate lockers" };
    ValidatorBucket::of()
      .consist_of(Validator::RoleIn { role: user.role, allowed: &[Role::Admin], action })
      .validate()?;

    if !active {
      ValidatorBucket::of()
        .consist_of(Validator::LockerInUse { in_use: locker.is_held() })
        .validate()?;
    }

    let expected_holder = locker.holder;
    let mut target = locker;
    target.is_active = active;
    let log_action = if active { LockerLogAction::Activate } else { LockerLogAction::Deactivate };
    let log = NewLockerLog::new(&target, user, log_action);

    self
      .commit(
        LockerTransition { target, expected_holder, release: None, logs: vec![log] },
        Error::LockerInUse,
      )
      .await
  }

  async fn commit(
    &self,
    transition: LockerTransition,
    on_contention: Error,
  ) -> Result<Option<Locker>> {
    match self
      .store
      .commit_transition(transition)
      .await
      .map_err(Error::store)?
    {
      TransitionOutcome::Applied(locker) => Ok(Some(locker)),
      TransitionOutcome::Missing => Ok(None),
      TransitionOutcome::Contended => Err(on_contention),
    }
  }
}
