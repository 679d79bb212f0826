//! Micropost authoring and removal.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::micropost::{MicropostValidationError, fields};
use super::persistence_errors::{map_micropost_persistence_error, map_user_persistence_error};
use super::ports::{MicropostRepository, UserRepository};
use super::timestamp::stored_now;
use super::{
    Error, Feed, FeedPage, Micropost, MicropostContent, MicropostId, UserId, ValidationErrors,
};

/// Service over the micropost table.
#[derive(Clone)]
pub struct MicropostService<U, M> {
    users: Arc<U>,
    posts: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<U, M> MicropostService<U, M> {
    /// Create a new service.
    pub fn new(users: Arc<U>, posts: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            posts,
            clock,
        }
    }
}

impl<U, M> MicropostService<U, M>
where
    U: UserRepository,
    M: MicropostRepository,
{
    /// Publish a post for `author`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// `invalid_request` with `content` and/or `author_id` field errors.
    pub async fn post(
        &self,
        author: &UserId,
        content: impl Into<String>,
    ) -> Result<Micropost, Error> {
        let mut errors = ValidationErrors::new();
        let content = errors.check(fields::CONTENT, MicropostContent::new(content));
        let author_exists = self
            .users
            .find_by_id(author)
            .await
            .map_err(map_user_persistence_error)?
            .is_some();
        if !author_exists {
            errors.add(
                fields::AUTHOR_ID,
                MicropostValidationError::MissingAuthor.to_string(),
            );
        }
        let Some(content) = content else {
            return Err(Error::validation(&errors));
        };
        errors
            .into_result()
            .map_err(|errors| Error::validation(&errors))?;

        let now = stored_now(self.clock.as_ref());
        let post = Micropost::new(MicropostId::random(), *author, content, now);
        self.posts
            .insert(&post)
            .await
            .map_err(map_micropost_persistence_error)?;

        info!(micropost_id = %post.id(), author_id = %author, "micropost created");
        Ok(post)
    }

    /// Delete one of `author`'s posts.
    ///
    /// # Errors
    ///
    /// `not_found` for unknown posts, `forbidden` when the post belongs to
    /// someone else.
    pub async fn delete(&self, author: &UserId, post_id: &MicropostId) -> Result<(), Error> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await
            .map_err(map_micropost_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("micropost {post_id} not found")))?;
        if post.author_id() != *author {
            return Err(Error::forbidden("microposts can only be deleted by their author"));
        }

        let removed = self
            .posts
            .delete(post_id)
            .await
            .map_err(map_micropost_persistence_error)?;
        if !removed {
            return Err(Error::not_found(format!("micropost {post_id} not found")));
        }

        info!(micropost_id = %post_id, author_id = %author, "micropost deleted");
        Ok(())
    }

    /// `author`'s own posts, newest first.
    pub async fn list_by_author(&self, author: &UserId, page: FeedPage) -> Result<Feed, Error> {
        let posts = self
            .posts
            .list_by_author(author, &page.with_lookahead())
            .await
            .map_err(map_micropost_persistence_error)?;
        Ok(Feed::from_lookahead(posts, &page))
    }

    /// Total number of posts.
    pub async fn count(&self) -> Result<u64, Error> {
        self.posts
            .count()
            .await
            .map_err(map_micropost_persistence_error)
    }

    /// Number of posts written by `author`.
    pub async fn count_by_author(&self, author: &UserId) -> Result<u64, Error> {
        self.posts
            .count_by_author(author)
            .await
            .map_err(map_micropost_persistence_error)
    }
}
