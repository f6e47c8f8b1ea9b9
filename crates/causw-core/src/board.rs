//! Boards, posts, comments and the read models built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::Role;

// ─── Stored records ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
  pub board_id:     Uuid,
  pub name:         String,
  pub description:  Option<String>,
  pub category:     String,
  /// Roles allowed to create posts on this board.
  pub create_roles: Vec<Role>,
  /// Shown on the default home page.
  pub is_home:      bool,
  pub is_deleted:   bool,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub post_id:     Uuid,
  pub board_id:    Uuid,
  pub title:       String,
  pub content:     String,
  pub writer_id:   Uuid,
  pub writer_name: String,
  pub is_deleted:  bool,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub post_id:    Uuid,
  pub writer_id:  Uuid,
  pub content:    String,
  pub is_deleted: bool,
  pub created_at: DateTime<Utc>,
}

/// Links a user to a board they chose to follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteBoard {
  pub favorite_board_id: Uuid,
  pub user_id:           Uuid,
  pub board:             Board,
}

// ─── Pagination ──────────────────────────────────────────────────────────────

/// One zero-indexed page of a larger result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
  pub content:        Vec<T>,
  pub page:           u32,
  pub size:           u32,
  pub total_elements: u64,
}

impl<T> Page<T> {
  pub fn has_next(&self) -> bool {
    (u64::from(self.page) + 1) * u64::from(self.size) < self.total_elements
  }

  /// Keep the paging metadata but swap the items.
  pub fn with_content<U>(self, content: Vec<U>) -> Page<U> {
    Page {
      content,
      page: self.page,
      size: self.size,
      total_elements: self.total_elements,
    }
  }
}

// ─── Home page read model ────────────────────────────────────────────────────

/// A board as seen by a user of a particular role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
  pub board_id:     Uuid,
  pub name:         String,
  pub description:  Option<String>,
  pub category:     String,
  pub create_roles: Vec<Role>,
  /// Whether the viewer may create posts here.
  pub writable:     bool,
  /// Whether the viewer may edit or delete the board itself.
  pub editable:     bool,
}

impl BoardView {
  pub fn scoped(board: &Board, role: Role) -> Self {
    Self {
      board_id:     board.board_id,
      name:         board.name.clone(),
      description:  board.description.clone(),
      category:     board.category.clone(),
      create_roles: board.create_roles.clone(),
      writable:     role.is_manager() || board.create_roles.contains(&role),
      editable:     role.is_manager(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
  pub post_id:       Uuid,
  pub title:         String,
  pub writer_name:   String,
  pub comment_count: u64,
  pub created_at:    DateTime<Utc>,
}

impl PostSummary {
  pub fn new(post: &Post, comment_count: u64) -> Self {
    Self {
      post_id: post.post_id,
      title: post.title.clone(),
      writer_name: post.writer_name.clone(),
      comment_count,
      created_at: post.created_at,
    }
  }
}

/// One board section of a user's landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomePage {
  pub board: BoardView,
  pub posts: Page<PostSummary>,
}
