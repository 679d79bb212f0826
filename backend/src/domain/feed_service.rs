//! Activity feed: a user's own posts plus posts by everyone they follow.

use std::sync::Arc;

use tracing::debug;

use super::persistence_errors::{map_micropost_persistence_error, map_user_persistence_error};
use super::ports::{MicropostRepository, UserRepository};
use super::{Error, Feed, FeedPage, UserId};

/// Read-only feed service.
#[derive(Clone)]
pub struct FeedService<U, M> {
    users: Arc<U>,
    posts: Arc<M>,
}

impl<U, M> FeedService<U, M> {
    /// Create a new service.
    pub fn new(users: Arc<U>, posts: Arc<M>) -> Self {
        Self { users, posts }
    }
}

impl<U, M> FeedService<U, M>
where
    U: UserRepository,
    M: MicropostRepository,
{
    /// One page of `user`'s feed, newest first.
    ///
    /// The relationship table is read at query time, so unfollowing removes
    /// that author's posts from subsequent pages immediately.
    ///
    /// # Errors
    ///
    /// `not_found` when `user` does not exist.
    pub async fn feed(&self, user: &UserId, page: FeedPage) -> Result<Feed, Error> {
        self.users
            .find_by_id(user)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("user {user} not found")))?;

        let posts = self
            .posts
            .feed(user, &page.with_lookahead())
            .await
            .map_err(map_micropost_persistence_error)?;
        let feed = Feed::from_lookahead(posts, &page);
        debug!(user_id = %user, posts = feed.posts.len(), has_more = feed.next.is_some(), "feed page built");
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureUserRepository, MockMicropostRepository, MockUserRepository};
    use crate::domain::{
        EmailAddress, ErrorCode, Micropost, MicropostContent, MicropostId, User, UserName,
    };
    use crate::test_support::fixture_timestamp;
    use chrono::Duration;

    fn existing_users() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            Ok(Some(User::new(
                *id,
                UserName::new("Reader").expect("valid name"),
                EmailAddress::new("reader@example.com").expect("valid email"),
                fixture_timestamp(),
            )))
        });
        users
    }

    fn posts(count: i64) -> Vec<Micropost> {
        (0..count)
            .map(|age| {
                Micropost::new(
                    MicropostId::random(),
                    UserId::random(),
                    MicropostContent::new("post").expect("valid content"),
                    fixture_timestamp() - Duration::minutes(age),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn feed_requests_one_extra_row_and_returns_a_cursor() {
        let rows = posts(3);
        let expected_next = rows.get(1).map(Micropost::cursor);
        let mut repo = MockMicropostRepository::new();
        repo.expect_feed()
            .times(1)
            .withf(|_, page| page.limit() == 3 && page.cursor().is_none())
            .return_once(move |_, _| Ok(rows));

        let service = FeedService::new(Arc::new(existing_users()), Arc::new(repo));
        let feed = service
            .feed(&UserId::random(), FeedPage::new(Some(2)))
            .await
            .expect("feed succeeds");

        assert_eq!(feed.posts.len(), 2);
        assert_eq!(feed.next, expected_next);
    }

    #[tokio::test]
    async fn feed_forwards_the_cursor() {
        let cursor = posts(1)
            .first()
            .map(Micropost::cursor)
            .expect("one post");
        let mut repo = MockMicropostRepository::new();
        repo.expect_feed()
            .withf(move |_, page| page.cursor() == Some(cursor))
            .return_once(|_, _| Ok(Vec::new()));

        let service = FeedService::new(Arc::new(existing_users()), Arc::new(repo));
        let feed = service
            .feed(&UserId::random(), FeedPage::default().before(cursor))
            .await
            .expect("feed succeeds");
        assert!(feed.posts.is_empty());
        assert!(feed.next.is_none());
    }

    #[tokio::test]
    async fn feed_of_a_missing_user_is_not_found() {
        let mut repo = MockMicropostRepository::new();
        repo.expect_feed().never();

        let service = FeedService::new(Arc::new(FixtureUserRepository), Arc::new(repo));
        let error = service
            .feed(&UserId::random(), FeedPage::default())
            .await
            .expect_err("missing user");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
