//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that they
//! order correctly as text. Local due dates carry no offset. UUIDs are
//! hyphenated lowercase strings. Role lists are compact JSON.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use causw_core::{
  board::{Board, Post},
  locker::{Locker, LockerLog, LockerLogAction},
  user::{Role, User, UserState},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps ───────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn encode_naive(dt: NaiveDateTime) -> String { dt.format(NAIVE_FORMAT).to_string() }

pub fn decode_naive(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, NAIVE_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ────────────────────────────────────────────────────────────────────

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown role: {s:?}")))
}

pub fn decode_user_state(s: &str) -> Result<UserState> {
  match s {
    "AWAIT" => Ok(UserState::Await),
    "ACTIVE" => Ok(UserState::Active),
    "INACTIVE" => Ok(UserState::Inactive),
    "REJECTED" => Ok(UserState::Rejected),
    "DROPPED" => Ok(UserState::Dropped),
    other => Err(Error::Decode(format!("unknown user state: {other:?}"))),
  }
}

pub fn decode_log_action(s: &str) -> Result<LockerLogAction> {
  match s {
    "REGISTER" => Ok(LockerLogAction::Register),
    "RETURN" => Ok(LockerLogAction::Return),
    "ACTIVATE" => Ok(LockerLogAction::Activate),
    "DEACTIVATE" => Ok(LockerLogAction::Deactivate),
    other => Err(Error::Decode(format!("unknown locker log action: {other:?}"))),
  }
}

pub fn encode_roles(roles: &[Role]) -> Result<String> { Ok(serde_json::to_string(roles)?) }

pub fn decode_roles(s: &str) -> Result<Vec<Role>> { Ok(serde_json::from_str(s)?) }

fn decode_number(n: i64) -> Result<u32> {
  u32::try_from(n).map_err(|_| Error::Decode(format!("locker number out of range: {n}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:   String,
  pub email:     String,
  pub name:      String,
  pub role:      String,
  pub state:     String,
  pub circle_id: Option<String>,
}

impl RawUser {
  pub const COLUMNS: &'static str = "user_id, email, name, role, state, circle_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:   row.get(0)?,
      email:     row.get(1)?,
      name:      row.get(2)?,
      role:      row.get(3)?,
      state:     row.get(4)?,
      circle_id: row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:   decode_uuid(&self.user_id)?,
      email:     self.email,
      name:      self.name,
      role:      decode_role(&self.role)?,
      state:     decode_user_state(&self.state)?,
      circle_id: self.circle_id,
    })
  }
}

/// Raw values read directly from a `boards` row.
pub struct RawBoard {
  pub board_id:     String,
  pub name:         String,
  pub description:  Option<String>,
  pub category:     String,
  pub create_roles: String,
  pub is_home:      bool,
  pub is_deleted:   bool,
  pub created_at:   String,
}

impl RawBoard {
  /// Column list, qualified with the `b` alias used by every board query.
  pub const COLUMNS: &'static str = "b.board_id, b.name, b.description, b.category, \
     b.create_roles, b.is_home, b.is_deleted, b.created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      board_id:     row.get(0)?,
      name:         row.get(1)?,
      description:  row.get(2)?,
      category:     row.get(3)?,
      create_roles: row.get(4)?,
      is_home:      row.get(5)?,
      is_deleted:   row.get(6)?,
      created_at:   row.get(7)?,
    })
  }

  pub fn into_board(self) -> Result<Board> {
    Ok(Board {
      board_id:     decode_uuid(&self.board_id)?,
      name:         self.name,
      description:  self.description,
      category:     self.category,
      create_roles: decode_roles(&self.create_roles)?,
      is_home:      self.is_home,
      is_deleted:   self.is_deleted,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `posts` row.
pub struct RawPost {
  pub post_id:     String,
  pub board_id:    String,
  pub title:       String,
  pub content:     String,
  pub writer_id:   String,
  pub writer_name: String,
  pub is_deleted:  bool,
  pub created_at:  String,
}

impl RawPost {
  pub const COLUMNS: &'static str =
    "post_id, board_id, title, content, writer_id, writer_name, is_deleted, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:     row.get(0)?,
      board_id:    row.get(1)?,
      title:       row.get(2)?,
      content:     row.get(3)?,
      writer_id:   row.get(4)?,
      writer_name: row.get(5)?,
      is_deleted:  row.get(6)?,
      created_at:  row.get(7)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      post_id:     decode_uuid(&self.post_id)?,
      board_id:    decode_uuid(&self.board_id)?,
      title:       self.title,
      content:     self.content,
      writer_id:   decode_uuid(&self.writer_id)?,
      writer_name: self.writer_name,
      is_deleted:  self.is_deleted,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `lockers` row.
pub struct RawLocker {
  pub locker_id:     String,
  pub locker_number: i64,
  pub location:      String,
  pub is_active:     bool,
  pub user_id:       Option<String>,
  pub expired_at:    Option<String>,
}

impl RawLocker {
  pub const COLUMNS: &'static str =
    "locker_id, locker_number, location, is_active, user_id, expired_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      locker_id:     row.get(0)?,
      locker_number: row.get(1)?,
      location:      row.get(2)?,
      is_active:     row.get(3)?,
      user_id:       row.get(4)?,
      expired_at:    row.get(5)?,
    })
  }

  pub fn into_locker(self) -> Result<Locker> {
    Ok(Locker {
      locker_id:     decode_uuid(&self.locker_id)?,
      locker_number: decode_number(self.locker_number)?,
      location:      self.location,
      is_active:     self.is_active,
      holder:        self.user_id.as_deref().map(decode_uuid).transpose()?,
      expired_at:    self.expired_at.as_deref().map(decode_naive).transpose()?,
    })
  }
}

/// Raw values read directly from a `locker_logs` row.
pub struct RawLockerLog {
  pub log_id:        String,
  pub locker_number: i64,
  pub location_name: String,
  pub user_id:       String,
  pub user_email:    String,
  pub action:        String,
  pub message:       String,
  pub created_at:    String,
}

impl RawLockerLog {
  pub const COLUMNS: &'static str = "log_id, locker_number, location_name, user_id, \
     user_email, action, message, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      log_id:        row.get(0)?,
      locker_number: row.get(1)?,
      location_name: row.get(2)?,
      user_id:       row.get(3)?,
      user_email:    row.get(4)?,
      action:        row.get(5)?,
      message:       row.get(6)?,
      created_at:    row.get(7)?,
    })
  }

  pub fn into_log(self) -> Result<LockerLog> {
    Ok(LockerLog {
      log_id:        decode_uuid(&self.log_id)?,
      locker_number: decode_number(self.locker_number)?,
      location_name: self.location_name,
      user_id:       decode_uuid(&self.user_id)?,
      user_email:    self.user_email,
      action:        decode_log_action(&self.action)?,
      message:       self.message,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
