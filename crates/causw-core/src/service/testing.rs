//! In-memory store used by the service unit tests.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  board::{Board, FavoriteBoard, Page, Post},
  locker::{Locker, LockerLog, LockerLogAction, LockerTransition, NewLockerLog, TransitionOutcome},
  store::{
    Backend, BoardPort, CommentPort, FavoriteBoardPort, FlagPort, LockerLogPort, LockerPort,
    PostPort, TextFieldPort, UserPort,
  },
  user::{Role, User, UserState},
};

#[derive(Default)]
struct Inner {
  users:       HashMap<Uuid, User>,
  boards:      Vec<Board>,
  posts:       Vec<Post>,
  comments:    HashMap<Uuid, u64>,
  favorites:   Vec<FavoriteBoard>,
  lockers:     HashMap<Uuid, Locker>,
  logs:        Vec<LockerLog>,
  flags:       HashMap<String, bool>,
  text_fields: HashMap<String, String>,
}

#[derive(Default)]
pub struct MemoryStore {
  inner:       Mutex<Inner>,
  board_reads: AtomicUsize,
  /// Timestamp stamped on appended logs; defaults to `Utc::now()`.
  log_time:    Mutex<Option<DateTime<Utc>>>,
}

impl MemoryStore {
  pub fn put_user(&self, user: User) {
    self.inner.lock().unwrap().users.insert(user.user_id, user);
  }

  pub fn put_board(&self, board: Board) { self.inner.lock().unwrap().boards.push(board); }

  pub fn put_post(&self, post: Post) { self.inner.lock().unwrap().posts.push(post); }

  pub fn put_comments(&self, post_id: Uuid, count: u64) {
    self.inner.lock().unwrap().comments.insert(post_id, count);
  }

  pub fn put_favorite(&self, user_id: Uuid, board: Board) {
    self.inner.lock().unwrap().favorites.push(FavoriteBoard {
      favorite_board_id: Uuid::new_v4(),
      user_id,
      board,
    });
  }

  pub fn put_locker(&self, locker: Locker) {
    self.inner.lock().unwrap().lockers.insert(locker.locker_id, locker);
  }

  pub fn put_flag(&self, key: &str, value: bool) {
    self.inner.lock().unwrap().flags.insert(key.to_owned(), value);
  }

  pub fn put_text_field(&self, key: &str, value: &str) {
    self.inner.lock().unwrap().text_fields.insert(key.to_owned(), value.to_owned());
  }

  pub fn set_log_time(&self, at: DateTime<Utc>) { *self.log_time.lock().unwrap() = Some(at); }

  pub fn locker(&self, locker_id: Uuid) -> Locker {
    self.inner.lock().unwrap().lockers[&locker_id].clone()
  }

  pub fn logs(&self) -> Vec<LockerLog> { self.inner.lock().unwrap().logs.clone() }

  pub fn user(&self, user_id: Uuid) -> User { self.inner.lock().unwrap().users[&user_id].clone() }

  pub fn board_reads(&self) -> usize { self.board_reads.load(Ordering::SeqCst) }

  fn append(&self, inner: &mut Inner, log: NewLockerLog) -> LockerLog {
    let created_at = self.log_time.lock().unwrap().unwrap_or_else(Utc::now);
    let log = LockerLog {
      log_id: Uuid::new_v4(),
      locker_number: log.locker_number,
      location_name: log.location_name,
      user_id: log.user_id,
      user_email: log.user_email,
      action: log.action,
      message: log.message,
      created_at,
    };
    inner.logs.push(log.clone());
    log
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn user(role: Role, state: UserState) -> User {
  let user_id = Uuid::new_v4();
  User {
    user_id,
    email: format!("{user_id}@cau.ac.kr"),
    name: "Kim".into(),
    role,
    state,
    circle_id: None,
  }
}

pub fn board(name: &str, is_home: bool) -> Board {
  Board {
    board_id: Uuid::new_v4(),
    name: name.into(),
    description: None,
    category: "GENERAL".into(),
    create_roles: vec![Role::Student],
    is_home,
    is_deleted: false,
    created_at: Utc::now(),
  }
}

pub fn post(board: &Board, title: &str) -> Post {
  Post {
    post_id: Uuid::new_v4(),
    board_id: board.board_id,
    title: title.into(),
    content: String::new(),
    writer_id: Uuid::new_v4(),
    writer_name: "Lee".into(),
    is_deleted: false,
    created_at: Utc::now(),
  }
}

pub fn locker(number: u32) -> Locker {
  Locker {
    locker_id: Uuid::new_v4(),
    locker_number: number,
    location: "Building 310".into(),
    is_active: true,
    holder: None,
    expired_at: None,
  }
}

// ─── Ports ───────────────────────────────────────────────────────────────────

impl Backend for MemoryStore {
  type Error = Infallible;
}

impl UserPort for MemoryStore {
  async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, Infallible> {
    Ok(self.inner.lock().unwrap().users.get(&user_id).cloned())
  }

  async fn update_user_role(
    &self,
    user_id: Uuid,
    role: Role,
    circle_id: Option<String>,
  ) -> Result<Option<User>, Infallible> {
    let mut inner = self.inner.lock().unwrap();
    Ok(inner.users.get_mut(&user_id).map(|u| {
      u.role = role;
      u.circle_id = circle_id;
      u.clone()
    }))
  }
}

impl BoardPort for MemoryStore {
  async fn find_home_boards(&self) -> Result<Vec<Board>, Infallible> {
    self.board_reads.fetch_add(1, Ordering::SeqCst);
    let inner = self.inner.lock().unwrap();
    Ok(inner.boards.iter().filter(|b| b.is_home && !b.is_deleted).cloned().collect())
  }
}

impl PostPort for MemoryStore {
  async fn find_posts(
    &self,
    board_id: Uuid,
    page: u32,
    size: u32,
  ) -> Result<Page<Post>, Infallible> {
    let inner = self.inner.lock().unwrap();
    let all: Vec<_> = inner
      .posts
      .iter()
      .filter(|p| p.board_id == board_id && !p.is_deleted)
      .cloned()
      .collect();
    let content = all
      .iter()
      .skip((page * size) as usize)
      .take(size as usize)
      .cloned()
      .collect();
    Ok(Page { content, page, size, total_elements: all.len() as u64 })
  }
}

impl CommentPort for MemoryStore {
  async fn count_comments_by_post_id(&self, post_id: Uuid) -> Result<u64, Infallible> {
    Ok(self.inner.lock().unwrap().comments.get(&post_id).copied().unwrap_or(0))
  }
}

impl FavoriteBoardPort for MemoryStore {
  async fn find_favorite_boards(&self, user_id: Uuid) -> Result<Vec<FavoriteBoard>, Infallible> {
    self.board_reads.fetch_add(1, Ordering::SeqCst);
    let inner = self.inner.lock().unwrap();
    Ok(inner.favorites.iter().filter(|f| f.user_id == user_id).cloned().collect())
  }
}

impl LockerPort for MemoryStore {
  async fn find_locker(&self, locker_id: Uuid) -> Result<Option<Locker>, Infallible> {
    Ok(self.inner.lock().unwrap().lockers.get(&locker_id).cloned())
  }

  async fn find_locker_by_user_id(&self, user_id: Uuid) -> Result<Option<Locker>, Infallible> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.lockers.values().find(|l| l.is_held_by(user_id)).cloned())
  }

  async fn update_locker(
    &self,
    locker_id: Uuid,
    locker: Locker,
  ) -> Result<Option<Locker>, Infallible> {
    let mut inner = self.inner.lock().unwrap();
    Ok(inner.lockers.get_mut(&locker_id).map(|stored| {
      *stored = locker;
      stored.clone()
    }))
  }

  async fn commit_transition(
    &self,
    transition: LockerTransition,
  ) -> Result<TransitionOutcome, Infallible> {
    let mut inner = self.inner.lock().unwrap();

    let Some(current) = inner.lockers.get(&transition.target.locker_id) else {
      return Ok(TransitionOutcome::Missing);
    };
    let assigning = transition.target.holder.is_some()
      && transition.target.holder != transition.expected_holder;
    if current.holder != transition.expected_holder || (assigning && !current.is_active) {
      return Ok(TransitionOutcome::Contended);
    }
    if let Some(release) = &transition.release {
      match inner.lockers.get(&release.locker.locker_id) {
        Some(l) if l.is_held_by(release.holder) => {}
        _ => return Ok(TransitionOutcome::Contended),
      }
    }

    if let Some(release) = transition.release {
      inner.lockers.insert(release.locker.locker_id, release.locker);
    }
    let target = transition.target;
    inner.lockers.insert(target.locker_id, target.clone());
    for log in transition.logs {
      self.append(&mut inner, log);
    }
    Ok(TransitionOutcome::Applied(target))
  }
}

impl LockerLogPort for MemoryStore {
  async fn when_register(&self, user_id: Uuid) -> Result<Option<DateTime<Utc>>, Infallible> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .logs
        .iter()
        .filter(|l| l.user_id == user_id && l.action == LockerLogAction::Register)
        .map(|l| l.created_at)
        .max(),
    )
  }

  async fn create_locker_log(&self, log: NewLockerLog) -> Result<LockerLog, Infallible> {
    let mut inner = self.inner.lock().unwrap();
    Ok(self.append(&mut inner, log))
  }

  async fn find_locker_logs<'a>(
    &'a self,
    locker_number: u32,
    location_name: &'a str,
  ) -> Result<Vec<LockerLog>, Infallible> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .logs
        .iter()
        .filter(|l| l.locker_number == locker_number && l.location_name == location_name)
        .cloned()
        .collect(),
    )
  }
}

impl FlagPort for MemoryStore {
  async fn find_flag<'a>(&'a self, key: &'a str) -> Result<Option<bool>, Infallible> {
    Ok(self.inner.lock().unwrap().flags.get(key).copied())
  }
}

impl TextFieldPort for MemoryStore {
  async fn find_text_field<'a>(&'a self, key: &'a str) -> Result<Option<String>, Infallible> {
    Ok(self.inner.lock().unwrap().text_fields.get(key).cloned())
  }
}
