//! [`SqliteStore`], the SQLite implementation of the persistence ports.

use std::path::Path;

use chrono::{DateTime, Utc};
use causw_core::{
  board::{Board, Comment, FavoriteBoard, Page, Post},
  locker::{Locker, LockerLog, LockerTransition, NewLockerLog, TransitionOutcome},
  store::{
    Backend, BoardPort, CommentPort, FavoriteBoardPort, FlagPort, LockerLogPort, LockerPort,
    PostPort, TextFieldPort, UserPort,
  },
  user::{Role, User},
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawBoard, RawLocker, RawLockerLog, RawPost, RawUser, decode_dt, encode_dt, encode_naive,
    encode_roles, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A CAUSW store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// A log entry with every column already encoded.
struct LogRow {
  log:        LockerLog,
  log_id:     String,
  user_id:    String,
  created_at: String,
}

impl LogRow {
  fn new(input: NewLockerLog) -> Self {
    let log = LockerLog {
      log_id:        Uuid::new_v4(),
      locker_number: input.locker_number,
      location_name: input.location_name,
      user_id:       input.user_id,
      user_email:    input.user_email,
      action:        input.action,
      message:       input.message,
      created_at:    Utc::now(),
    };
    Self {
      log_id:     encode_uuid(log.log_id),
      user_id:    encode_uuid(log.user_id),
      created_at: encode_dt(log.created_at),
      log,
    }
  }

  fn insert(&self, conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute(
      "INSERT INTO locker_logs (
         log_id, locker_number, location_name, user_id,
         user_email, action, message, created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
      rusqlite::params![
        self.log_id,
        i64::from(self.log.locker_number),
        self.log.location_name,
        self.user_id,
        self.log.user_email,
        self.log.action.as_str(),
        self.log.message,
        self.created_at,
      ],
    )?;
    Ok(())
  }
}

/// Result of running a transition inside the connection thread.
enum Committed {
  Applied,
  Missing,
  Contended,
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _) if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Administrative writes ─────────────────────────────────────────────────
  //
  // Account, board and locker management live outside the core services.
  // These writes let operators and tests populate a store directly; no
  // HTTP route reaches them.

  pub async fn insert_user(&self, user: &User) -> Result<()> {
    let id_str    = encode_uuid(user.user_id);
    let email     = user.email.clone();
    let name      = user.name.clone();
    let role      = user.role.as_str();
    let state     = user.state.as_str();
    let circle_id = user.circle_id.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, email, name, role, state, circle_id)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, email, name, role, state, circle_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_board(&self, board: &Board) -> Result<()> {
    let id_str       = encode_uuid(board.board_id);
    let name         = board.name.clone();
    let description  = board.description.clone();
    let category     = board.category.clone();
    let create_roles = encode_roles(&board.create_roles)?;
    let is_home      = board.is_home;
    let is_deleted   = board.is_deleted;
    let at_str       = encode_dt(board.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO boards (
             board_id, name, description, category,
             create_roles, is_home, is_deleted, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            name,
            description,
            category,
            create_roles,
            is_home,
            is_deleted,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_post(&self, post: &Post) -> Result<()> {
    let id_str       = encode_uuid(post.post_id);
    let board_id_str = encode_uuid(post.board_id);
    let title        = post.title.clone();
    let content      = post.content.clone();
    let writer_id    = encode_uuid(post.writer_id);
    let writer_name  = post.writer_name.clone();
    let is_deleted   = post.is_deleted;
    let at_str       = encode_dt(post.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (
             post_id, board_id, title, content,
             writer_id, writer_name, is_deleted, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            board_id_str,
            title,
            content,
            writer_id,
            writer_name,
            is_deleted,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_comment(&self, comment: &Comment) -> Result<()> {
    let id_str      = encode_uuid(comment.comment_id);
    let post_id_str = encode_uuid(comment.post_id);
    let writer_id   = encode_uuid(comment.writer_id);
    let content     = comment.content.clone();
    let is_deleted  = comment.is_deleted;
    let at_str      = encode_dt(comment.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, post_id, writer_id, content, is_deleted, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, post_id_str, writer_id, content, is_deleted, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Mark `board_id` as a favourite of `user_id`; returns the link id.
  pub async fn add_favorite_board(&self, user_id: Uuid, board_id: Uuid) -> Result<Uuid> {
    let favorite_id  = Uuid::new_v4();
    let id_str       = encode_uuid(favorite_id);
    let user_id_str  = encode_uuid(user_id);
    let board_id_str = encode_uuid(board_id);
    let at_str       = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO favorite_boards (favorite_board_id, user_id, board_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, user_id_str, board_id_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(favorite_id)
  }

  pub async fn insert_locker(&self, locker: &Locker) -> Result<()> {
    let id_str     = encode_uuid(locker.locker_id);
    let number     = i64::from(locker.locker_number);
    let location   = locker.location.clone();
    let is_active  = locker.is_active;
    let holder     = locker.holder.map(encode_uuid);
    let expired_at = locker.expired_at.map(encode_naive);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lockers (locker_id, locker_number, location, is_active, user_id, expired_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, number, location, is_active, holder, expired_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn set_flag(&self, key: &str, value: bool) -> Result<()> {
    let key = key.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO flags (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
          rusqlite::params![key, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn set_text_field(&self, key: &str, value: &str) -> Result<()> {
    let key = key.to_owned();
    let value = value.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO text_fields (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
          rusqlite::params![key, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_locker(&self, sql: String, param: String) -> Result<Option<Locker>> {
    let raw: Option<RawLocker> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![param], RawLocker::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLocker::into_locker).transpose()
  }
}

// ─── Ports ───────────────────────────────────────────────────────────────────

impl Backend for SqliteStore {
  type Error = Error;
}

impl UserPort for SqliteStore {
  async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn update_user_role(
    &self,
    user_id:   Uuid,
    role:      Role,
    circle_id: Option<String>,
  ) -> Result<Option<User>> {
    let id_str   = encode_uuid(user_id);
    let role_str = role.as_str();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE users SET role = ?1, circle_id = ?2 WHERE user_id = ?3",
          rusqlite::params![role_str, circle_id, id_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}

impl BoardPort for SqliteStore {
  async fn find_home_boards(&self) -> Result<Vec<Board>> {
    let raws: Vec<RawBoard> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM boards b
           WHERE b.is_home = 1 AND b.is_deleted = 0
           ORDER BY b.created_at, b.rowid",
          RawBoard::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawBoard::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBoard::into_board).collect()
  }
}

impl PostPort for SqliteStore {
  async fn find_posts(&self, board_id: Uuid, page: u32, size: u32) -> Result<Page<Post>> {
    let board_id_str = encode_uuid(board_id);
    let limit        = i64::from(size);
    let offset       = i64::from(page) * i64::from(size);

    let (total, raws): (i64, Vec<RawPost>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM posts WHERE board_id = ?1 AND is_deleted = 0",
          rusqlite::params![board_id_str],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM posts
           WHERE board_id = ?1 AND is_deleted = 0
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?2 OFFSET ?3",
          RawPost::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![board_id_str, limit, offset], RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let content = raws
      .into_iter()
      .map(RawPost::into_post)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page {
      content,
      page,
      size,
      total_elements: u64::try_from(total)
        .map_err(|_| Error::Decode(format!("negative post count: {total}")))?,
    })
  }
}

impl CommentPort for SqliteStore {
  async fn count_comments_by_post_id(&self, post_id: Uuid) -> Result<u64> {
    let post_id_str = encode_uuid(post_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM comments WHERE post_id = ?1 AND is_deleted = 0",
          rusqlite::params![post_id_str],
          |r| r.get(0),
        )?)
      })
      .await?;

    u64::try_from(count).map_err(|_| Error::Decode(format!("negative comment count: {count}")))
  }
}

impl FavoriteBoardPort for SqliteStore {
  async fn find_favorite_boards(&self, user_id: Uuid) -> Result<Vec<FavoriteBoard>> {
    let user_id_str = encode_uuid(user_id);

    let raws: Vec<(RawBoard, String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {}, f.favorite_board_id, f.user_id
           FROM favorite_boards f
           JOIN boards b ON b.board_id = f.board_id
           WHERE f.user_id = ?1 AND b.is_deleted = 0
           ORDER BY f.created_at, f.rowid",
          RawBoard::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str], |row| {
            Ok((RawBoard::from_row(row)?, row.get(8)?, row.get(9)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(board, favorite_id, user_id)| {
        Ok(FavoriteBoard {
          favorite_board_id: Uuid::parse_str(&favorite_id)?,
          user_id:           Uuid::parse_str(&user_id)?,
          board:             board.into_board()?,
        })
      })
      .collect()
  }
}

impl LockerPort for SqliteStore {
  async fn find_locker(&self, locker_id: Uuid) -> Result<Option<Locker>> {
    self
      .query_locker(
        format!("SELECT {} FROM lockers WHERE locker_id = ?1", RawLocker::COLUMNS),
        encode_uuid(locker_id),
      )
      .await
  }

  async fn find_locker_by_user_id(&self, user_id: Uuid) -> Result<Option<Locker>> {
    self
      .query_locker(
        format!("SELECT {} FROM lockers WHERE user_id = ?1", RawLocker::COLUMNS),
        encode_uuid(user_id),
      )
      .await
  }

  async fn update_locker(&self, locker_id: Uuid, locker: Locker) -> Result<Option<Locker>> {
    let id_str     = encode_uuid(locker_id);
    let number     = i64::from(locker.locker_number);
    let location   = locker.location;
    let is_active  = locker.is_active;
    let holder     = locker.holder.map(encode_uuid);
    let expired_at = locker.expired_at.map(encode_naive);

    let raw: Option<RawLocker> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE lockers
           SET locker_number = ?1, location = ?2, is_active = ?3, user_id = ?4, expired_at = ?5
           WHERE locker_id = ?6",
          rusqlite::params![number, location, is_active, holder, expired_at, id_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM lockers WHERE locker_id = ?1", RawLocker::COLUMNS),
              rusqlite::params![id_str],
              RawLocker::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLocker::into_locker).transpose()
  }

  async fn commit_transition(&self, transition: LockerTransition) -> Result<TransitionOutcome> {
    let LockerTransition { target, expected_holder, release, logs } = transition;

    let target_id  = encode_uuid(target.locker_id);
    let holder     = target.holder.map(encode_uuid);
    let expired_at = target.expired_at.map(encode_naive);
    let is_active  = target.is_active;
    let expected   = expected_holder.map(encode_uuid);
    let release    = release
      .map(|r| (encode_uuid(r.locker.locker_id), encode_uuid(r.holder)));
    let log_rows: Vec<LogRow> = logs.into_iter().map(LogRow::new).collect();

    let committed = self
      .conn
      .call(move |conn| {
        // Dropping `tx` without committing rolls back every write below.
        let tx = conn.transaction()?;

        if let Some((release_id, release_holder)) = &release {
          let freed = tx.execute(
            "UPDATE lockers SET user_id = NULL, expired_at = NULL
             WHERE locker_id = ?1 AND user_id = ?2",
            rusqlite::params![release_id, release_holder],
          )?;
          if freed == 0 {
            return Ok(Committed::Contended);
          }
        }

        // A newly assigned holder additionally requires the locker to still
        // be active.
        let updated = tx.execute(
          "UPDATE lockers SET user_id = ?1, expired_at = ?2, is_active = ?3
           WHERE locker_id = ?4
             AND user_id IS ?5
             AND (?1 IS NULL OR ?1 IS ?5 OR is_active = 1)",
          rusqlite::params![holder, expired_at, is_active, target_id, expected],
        );
        let updated = match updated {
          Ok(n) => n,
          Err(e) if is_constraint_violation(&e) => return Ok(Committed::Contended),
          Err(e) => return Err(e.into()),
        };
        if updated == 0 {
          let exists = tx
            .query_row(
              "SELECT 1 FROM lockers WHERE locker_id = ?1",
              rusqlite::params![target_id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
          return Ok(if exists { Committed::Contended } else { Committed::Missing });
        }

        for row in &log_rows {
          row.insert(&tx)?;
        }

        tx.commit()?;
        Ok(Committed::Applied)
      })
      .await?;

    Ok(match committed {
      Committed::Applied => TransitionOutcome::Applied(target),
      Committed::Missing => TransitionOutcome::Missing,
      Committed::Contended => {
        tracing::debug!(locker_id = %target.locker_id, "locker transition lost a race");
        TransitionOutcome::Contended
      }
    })
  }
}

impl LockerLogPort for SqliteStore {
  async fn when_register(&self, user_id: Uuid) -> Result<Option<DateTime<Utc>>> {
    let user_id_str = encode_uuid(user_id);

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT created_at FROM locker_logs
               WHERE user_id = ?1 AND action = 'REGISTER'
               ORDER BY created_at DESC, rowid DESC
               LIMIT 1",
              rusqlite::params![user_id_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.as_deref().map(decode_dt).transpose()
  }

  async fn create_locker_log(&self, log: NewLockerLog) -> Result<LockerLog> {
    let row = LogRow::new(log);

    let row = self
      .conn
      .call(move |conn| {
        row.insert(conn)?;
        Ok(row)
      })
      .await?;

    Ok(row.log)
  }

  async fn find_locker_logs<'a>(
    &'a self,
    locker_number: u32,
    location_name: &'a str,
  ) -> Result<Vec<LockerLog>> {
    let number   = i64::from(locker_number);
    let location = location_name.to_owned();

    let raws: Vec<RawLockerLog> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM locker_logs
           WHERE locker_number = ?1 AND location_name = ?2
           ORDER BY created_at, rowid",
          RawLockerLog::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![number, location], RawLockerLog::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLockerLog::into_log).collect()
  }
}

impl FlagPort for SqliteStore {
  async fn find_flag<'a>(&'a self, key: &'a str) -> Result<Option<bool>> {
    let key = key.to_owned();

    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT value FROM flags WHERE key = ?1",
                rusqlite::params![key],
                |r| r.get(0),
              )
              .optional()?,
          )
        })
        .await?,
    )
  }
}

impl TextFieldPort for SqliteStore {
  async fn find_text_field<'a>(&'a self, key: &'a str) -> Result<Option<String>> {
    let key = key.to_owned();

    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT value FROM text_fields WHERE key = ?1",
                rusqlite::params![key],
                |r| r.get(0),
              )
              .optional()?,
          )
        })
        .await?,
    )
  }
}
