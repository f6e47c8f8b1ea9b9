//! Handlers for `/home` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/home` | Sections for the platform's home boards |
//! | `GET`  | `/home/favorites` | Sections for the user's favourite boards |

use axum::{Json, extract::State};
use causw_core::{board::HomePage, service::HomePageService, upload::FileUploader};

use crate::{AppState, Store, auth::ActingUser, error::ApiError};

/// `GET /home`
pub async fn default_page<S, U>(
  State(state): State<AppState<S, U>>,
  ActingUser(user_id): ActingUser,
) -> Result<Json<Vec<HomePage>>, ApiError>
where
  S: Store,
  U: FileUploader + 'static,
{
  let sections = HomePageService::new(&*state.store)
    .home_page_default(user_id)
    .await?;
  Ok(Json(sections))
}

/// `GET /home/favorites`
pub async fn favorites_page<S, U>(
  State(state): State<AppState<S, U>>,
  ActingUser(user_id): ActingUser,
) -> Result<Json<Vec<HomePage>>, ApiError>
where
  S: Store,
  U: FileUploader + 'static,
{
  let sections = HomePageService::new(&*state.store).home_page(user_id).await?;
  Ok(Json(sections))
}
