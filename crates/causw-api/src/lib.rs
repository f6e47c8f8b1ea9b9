//! JSON REST API for the CAUSW platform.
//!
//! Exposes an axum [`Router`] backed by any store implementing the
//! persistence ports and any [`FileUploader`]. Authentication, TLS, and
//! transport concerns are the caller's responsibility; the acting user
//! arrives in the [`auth::USER_ID_HEADER`] header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", causw_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod home;
pub mod lockers;
pub mod uploads;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post, put},
};
use causw_core::{
  clock::Clock,
  settings::LockerPolicy,
  store::{
    BoardPort, CommentPort, FavoriteBoardPort, FlagPort, LockerLogPort, LockerPort, PostPort,
    TextFieldPort, UserPort,
  },
  upload::FileUploader,
};

pub use auth::ActingUser;
pub use error::ApiError;

/// Largest accepted upload request body.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Every port the API needs from one store.
pub trait Store:
  UserPort
  + BoardPort
  + PostPort
  + CommentPort
  + FavoriteBoardPort
  + LockerPort
  + LockerLogPort
  + FlagPort
  + TextFieldPort
  + 'static
{
}

impl<T> Store for T where
  T: UserPort
    + BoardPort
    + PostPort
    + CommentPort
    + FavoriteBoardPort
    + LockerPort
    + LockerLogPort
    + FlagPort
    + TextFieldPort
    + 'static
{
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, U> {
  pub store:    Arc<S>,
  pub uploader: Arc<U>,
  pub clock:    Arc<dyn Clock>,
  pub policy:   LockerPolicy,
}

impl<S, U> Clone for AppState<S, U> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      uploader: Arc::clone(&self.uploader),
      clock:    Arc::clone(&self.clock),
      policy:   self.policy,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, U>(state: AppState<S, U>) -> Router<()>
where
  S: Store,
  U: FileUploader + 'static,
{
  Router::new()
    // Home
    .route("/home", get(home::default_page::<S, U>))
    .route("/home/favorites", get(home::favorites_page::<S, U>))
    // Lockers
    .route("/lockers/{id}", get(lockers::get_one::<S, U>))
    .route("/lockers/{id}/logs", get(lockers::logs::<S, U>))
    .route("/lockers/{id}/{action}", post(lockers::act::<S, U>))
    // Users
    .route("/users/{id}/role", put(users::update_role::<S, U>))
    // Uploads
    .route(
      "/uploads/files",
      post(uploads::file::<S, U>).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
    .route(
      "/uploads/images",
      post(uploads::image::<S, U>).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
    .with_state(state)
}
