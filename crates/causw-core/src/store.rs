//! Persistence ports.
//!
//! Each port covers one aggregate. A backend implements all of them against
//! a single [`Backend::Error`] type so services can be generic over one store
//! value. Higher layers (`causw-api`, `causw-server`) depend on these traits,
//! not on any concrete backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  board::{Board, FavoriteBoard, Page, Post},
  locker::{Locker, LockerLog, LockerTransition, NewLockerLog, TransitionOutcome},
  user::{Role, User},
};

/// The error type shared by every port of one backend.
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub trait UserPort: Backend {
  /// Retrieve a user by id. Returns `None` if not found.
  fn find_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Change a user's role and led circle. Returns `None` if the user does
  /// not exist.
  fn update_user_role(
    &self,
    user_id: Uuid,
    role: Role,
    circle_id: Option<String>,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;
}

// ─── Boards and posts ────────────────────────────────────────────────────────

pub trait BoardPort: Backend {
  /// The boards shown on the default home page, in display order.
  fn find_home_boards(
    &self,
  ) -> impl Future<Output = Result<Vec<Board>, Self::Error>> + Send + '_;
}

pub trait PostPort: Backend {
  /// One page of a board's non-deleted posts, newest first.
  fn find_posts(
    &self,
    board_id: Uuid,
    page: u32,
    size: u32,
  ) -> impl Future<Output = Result<Page<Post>, Self::Error>> + Send + '_;
}

pub trait CommentPort: Backend {
  fn count_comments_by_post_id(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}

pub trait FavoriteBoardPort: Backend {
  /// The user's favourite boards, in the order they were added.
  fn find_favorite_boards(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<FavoriteBoard>, Self::Error>> + Send + '_;
}

// ─── Lockers ─────────────────────────────────────────────────────────────────

pub trait LockerPort: Backend {
  fn find_locker(
    &self,
    locker_id: Uuid,
  ) -> impl Future<Output = Result<Option<Locker>, Self::Error>> + Send + '_;

  /// The locker currently held by `user_id`, if any.
  fn find_locker_by_user_id(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Locker>, Self::Error>> + Send + '_;

  /// Overwrite a locker row. Returns `None` if no such locker exists.
  fn update_locker(
    &self,
    locker_id: Uuid,
    locker: Locker,
  ) -> impl Future<Output = Result<Option<Locker>, Self::Error>> + Send + '_;

  /// Apply a holder change as a single unit of work.
  ///
  /// Implementations must guarantee that either every write in the
  /// transition is applied or none is, and that the target is only updated
  /// if its stored holder still equals `expected_holder` (and, when a holder
  /// is being assigned, it is still active). The same holds for the
  /// optional release. This is the guarantee that prevents two concurrent
  /// registrations from both claiming a free locker.
  fn commit_transition(
    &self,
    transition: LockerTransition,
  ) -> impl Future<Output = Result<TransitionOutcome, Self::Error>> + Send + '_;
}

pub trait LockerLogPort: Backend {
  /// When `user_id` last registered a locker.
  fn when_register(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<DateTime<Utc>>, Self::Error>> + Send + '_;

  /// Append a log entry. The store assigns id and timestamp.
  fn create_locker_log(
    &self,
    log: NewLockerLog,
  ) -> impl Future<Output = Result<LockerLog, Self::Error>> + Send + '_;

  /// Every entry for one physical locker, oldest first.
  fn find_locker_logs<'a>(
    &'a self,
    locker_number: u32,
    location_name: &'a str,
  ) -> impl Future<Output = Result<Vec<LockerLog>, Self::Error>> + Send + 'a;
}

// ─── Configuration ───────────────────────────────────────────────────────────

pub trait FlagPort: Backend {
  fn find_flag<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<bool>, Self::Error>> + Send + 'a;
}

pub trait TextFieldPort: Backend {
  fn find_text_field<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;
}
