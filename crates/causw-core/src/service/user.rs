//! Role management.

use uuid::Uuid;

use crate::{
  Error, Result,
  dto::UserUpdateRoleRequest,
  store::UserPort,
  user::{Role, User},
  validation::{Validator, ValidatorBucket},
};

use super::load_active_user;

pub struct UserService<'a, S> {
  store: &'a S,
}

impl<'a, S: UserPort> UserService<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Change `grantee_id`'s role on behalf of `granter_id`.
  ///
  /// Admins and presidents may change roles. Nobody may grant or revoke
  /// `ADMIN`, and only an admin may grant `PRESIDENT`. A circle leader must
  /// be bound to a circle.
  pub async fn update_role(
    &self,
    granter_id: Uuid,
    grantee_id: Uuid,
    request: &UserUpdateRoleRequest,
  ) -> Result<User> {
    let granter = load_active_user(self.store, granter_id).await?;
    let role = request.role()?;

    ValidatorBucket::of()
      .consist_of(Validator::RoleIn {
        role:    granter.role,
        allowed: &[Role::Admin, Role::President],
        action:  "change roles",
      })
      .validate()?;

    if role == Role::Admin {
      return Err(Error::PermissionDenied("ADMIN cannot be granted".into()));
    }
    if role == Role::President && !granter.role.is_admin() {
      return Err(Error::PermissionDenied(
        "only an ADMIN may grant PRESIDENT".into(),
      ));
    }

    let circle_id = match role {
      Role::LeaderCircle => Some(
        request
          .circle_id()
          .ok_or(Error::CircleIdRequired(role))?
          .to_owned(),
      ),
      _ => None,
    };

    let grantee = self
      .store
      .find_user(grantee_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound(grantee_id))?;
    if grantee.role.is_admin() {
      return Err(Error::PermissionDenied("ADMIN cannot be demoted".into()));
    }

    let updated = self
      .store
      .update_user_role(grantee_id, role, circle_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound(grantee_id))?;

    tracing::info!(
      granter = %granter.user_id,
      grantee = %updated.user_id,
      from = %grantee.role,
      to = %updated.role,
      "role updated"
    );
    Ok(updated)
  }
}
