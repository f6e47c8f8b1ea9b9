//! Handlers for `/lockers` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/lockers/:id` | 404 if not found |
//! | `GET`  | `/lockers/:id/logs` | Audit trail, oldest first |
//! | `POST` | `/lockers/:id/:action` | `register`, `return`, `activate` or `deactivate` |

use axum::{
  Json,
  extract::{Path, State},
};
use causw_core::{
  Error,
  locker::{Locker, LockerLog},
  service::{LockerAction, LockerService},
  upload::FileUploader,
};
use uuid::Uuid;

use crate::{AppState, Store, auth::ActingUser, error::ApiError};

fn service<S, U>(state: &AppState<S, U>) -> LockerService<'_, S>
where
  S: Store,
{
  LockerService::new(&*state.store, &*state.clock, state.policy)
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /lockers/:id`
pub async fn get_one<S, U>(
  State(state): State<AppState<S, U>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Locker>, ApiError>
where
  S: Store,
  U: FileUploader + 'static,
{
  Ok(Json(service(&state).find(id).await?))
}

/// `GET /lockers/:id/logs`
pub async fn logs<S, U>(
  State(state): State<AppState<S, U>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<LockerLog>>, ApiError>
where
  S: Store,
  U: FileUploader + 'static,
{
  Ok(Json(service(&state).logs(id).await?))
}

// ─── Actions ──────────────────────────────────────────────────────────────────

/// `POST /lockers/:id/:action`
pub async fn act<S, U>(
  State(state): State<AppState<S, U>>,
  ActingUser(user_id): ActingUser,
  Path((id, action)): Path<(Uuid, LockerAction)>,
) -> Result<Json<Locker>, ApiError>
where
  S: Store,
  U: FileUploader + 'static,
{
  let locker = service(&state)
    .apply(action, id, user_id)
    .await?
    .ok_or(Error::LockerNotFound(id))?;
  Ok(Json(locker))
}
