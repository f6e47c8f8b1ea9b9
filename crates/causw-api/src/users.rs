//! Handlers for `/users` endpoints.

use axum::{
  Json,
  extract::{Path, State},
};
use causw_core::{
  dto::UserUpdateRoleRequest,
  service::UserService,
  upload::FileUploader,
  user::User,
};
use uuid::Uuid;

use crate::{AppState, Store, auth::ActingUser, error::ApiError};

/// `PUT /users/:id/role`, body: `{"role":"COUNCIL","circleId":null}`
pub async fn update_role<S, U>(
  State(state): State<AppState<S, U>>,
  ActingUser(granter_id): ActingUser,
  Path(grantee_id): Path<Uuid>,
  Json(body): Json<UserUpdateRoleRequest>,
) -> Result<Json<User>, ApiError>
where
  S: Store,
  U: FileUploader + 'static,
{
  let user = UserService::new(&*state.store)
    .update_role(granter_id, grantee_id, &body)
    .await?;
  Ok(Json(user))
}
