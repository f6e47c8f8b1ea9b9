//! Application services.
//!
//! Services borrow their store for the duration of one request and are
//! cheap to construct per call.

pub mod home;
pub mod locker;
pub mod user;

pub use home::HomePageService;
pub use locker::{LockerAction, LockerService};
pub use user::UserService;

use uuid::Uuid;

use crate::{Error, Result, store::UserPort, user::User, validation};

/// Load a user and check they may act on the platform at all.
async fn load_active_user<S: UserPort>(store: &S, user_id: Uuid) -> Result<User> {
  let user = store
    .find_user(user_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::UserNotFound(user_id))?;

  validation::active_user(user.state, user.role).validate()?;
  Ok(user)
}

#[cfg(test)]
pub(crate) mod testing;
