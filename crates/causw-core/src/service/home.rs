//! The personalised landing page.

use uuid::Uuid;

use crate::{
  Error, Result,
  board::{Board, BoardView, HomePage, PostSummary},
  settings::HOME_POST_PAGE_SIZE,
  store::{BoardPort, CommentPort, FavoriteBoardPort, PostPort, UserPort},
  user::Role,
};

use super::load_active_user;

/// Read-only composition of boards, their latest posts and comment counts.
pub struct HomePageService<'a, S> {
  store: &'a S,
}

impl<'a, S> HomePageService<'a, S>
where
  S: UserPort + BoardPort + PostPort + CommentPort + FavoriteBoardPort,
{
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// The landing page built from the platform's home boards.
  pub async fn home_page_default(&self, user_id: Uuid) -> Result<Vec<HomePage>> {
    let user = load_active_user(self.store, user_id).await?;

    let boards = self.store.find_home_boards().await.map_err(Error::store)?;

    let mut sections = Vec::with_capacity(boards.len());
    for board in &boards {
      sections.push(self.section(board, user.role).await?);
    }
    Ok(sections)
  }

  /// The landing page built from the user's favourite boards.
  pub async fn home_page(&self, user_id: Uuid) -> Result<Vec<HomePage>> {
    let user = load_active_user(self.store, user_id).await?;

    let favorites = self
      .store
      .find_favorite_boards(user_id)
      .await
      .map_err(Error::store)?;

    let mut sections = Vec::with_capacity(favorites.len());
    for favorite in &favorites {
      sections.push(self.section(&favorite.board, user.role).await?);
    }
    Ok(sections)
  }

  async fn section(&self, board: &Board, role: Role) -> Result<HomePage> {
    let posts = self
      .store
      .find_posts(board.board_id, 0, HOME_POST_PAGE_SIZE)
      .await
      .map_err(Error::store)?;

    let mut summaries = Vec::with_capacity(posts.content.len());
    for post in &posts.content {
      let comments = self
        .store
        .count_comments_by_post_id(post.post_id)
        .await
        .map_err(Error::store)?;
      summaries.push(PostSummary::new(post, comments));
    }

    Ok(HomePage {
      board: BoardView::scoped(board, role),
      posts: posts.with_content(summaries),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    ErrorKind,
    service::testing::{MemoryStore, board, post, user},
    user::UserState,
  };

  #[tokio::test]
  async fn default_page_lists_home_boards_with_comment_counts() {
    let store = MemoryStore::default();
    let u = user(Role::Student, UserState::Active);
    store.put_user(u.clone());

    let notices = board("Notices", true);
    let free = board("Free", false);
    store.put_board(notices.clone());
    store.put_board(free.clone());

    let p = post(&notices, "Welcome");
    store.put_post(p.clone());
    store.put_comments(p.post_id, 2);

    let page = HomePageService::new(&store)
      .home_page_default(u.user_id)
      .await
      .unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].board.board_id, notices.board_id);
    assert_eq!(page[0].posts.content.len(), 1);
    assert_eq!(page[0].posts.content[0].comment_count, 2);
    assert_eq!(page[0].posts.size, HOME_POST_PAGE_SIZE);
  }

  #[tokio::test]
  async fn favorite_page_follows_favorite_order() {
    let store = MemoryStore::default();
    let u = user(Role::Student, UserState::Active);
    store.put_user(u.clone());

    let a = board("A", false);
    let b = board("B", false);
    store.put_board(a.clone());
    store.put_board(b.clone());
    store.put_favorite(u.user_id, b.clone());
    store.put_favorite(u.user_id, a.clone());

    let page = HomePageService::new(&store).home_page(u.user_id).await.unwrap();
    let names: Vec<_> = page.iter().map(|s| s.board.name.as_str()).collect();
    assert_eq!(names, ["B", "A"]);
  }

  #[tokio::test]
  async fn unknown_user_is_not_found() {
    let store = MemoryStore::default();
    let service = HomePageService::new(&store);

    let err = service.home_page(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = service.home_page_default(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
  }

  #[tokio::test]
  async fn inactive_or_roleless_user_fails_before_reading_boards() {
    let store = MemoryStore::default();
    store.put_board(board("Notices", true));

    let waiting = user(Role::Student, UserState::Await);
    let roleless = user(Role::None, UserState::Active);
    store.put_user(waiting.clone());
    store.put_user(roleless.clone());

    let svc = HomePageService::new(&store);
    for id in [waiting.user_id, roleless.user_id] {
      let err = svc.home_page_default(id).await.unwrap_err();
      assert_eq!(err.kind(), ErrorKind::ValidationFailed);
      let err = svc.home_page(id).await.unwrap_err();
      assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }
    assert_eq!(store.board_reads(), 0);
  }
}
