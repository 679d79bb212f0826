//! Port for micropost persistence and the feed query.

use async_trait::async_trait;

use crate::domain::{FeedPage, Micropost, MicropostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by micropost repository adapters.
    pub enum MicropostPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "micropost repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "micropost repository query failed: {message}",
        /// The post's author does not exist.
        AuthorNotFound { author_id: String } => "micropost author not found: {author_id}",
    }
}

/// Storage for microposts.
///
/// Listings are newest first, ordered by `(created_at, id)` descending, and
/// honour [`FeedPage`] keyset bounds.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MicropostRepository: Send + Sync {
    /// Insert a post. Fails with `AuthorNotFound` for unknown authors.
    async fn insert(&self, post: &Micropost) -> Result<(), MicropostPersistenceError>;

    /// Fetch a post by identifier.
    async fn find_by_id(
        &self,
        id: &MicropostId,
    ) -> Result<Option<Micropost>, MicropostPersistenceError>;

    /// Delete a post, returning whether it existed.
    async fn delete(&self, id: &MicropostId) -> Result<bool, MicropostPersistenceError>;

    /// Posts written by `author`.
    async fn list_by_author(
        &self,
        author: &UserId,
        page: &FeedPage,
    ) -> Result<Vec<Micropost>, MicropostPersistenceError>;

    /// Posts written by `user` or by anyone `user` currently follows.
    ///
    /// Evaluated in a single query against the live relationship table.
    async fn feed(
        &self,
        user: &UserId,
        page: &FeedPage,
    ) -> Result<Vec<Micropost>, MicropostPersistenceError>;

    /// Total number of posts.
    async fn count(&self) -> Result<u64, MicropostPersistenceError>;

    /// Number of posts written by `author`.
    async fn count_by_author(&self, author: &UserId) -> Result<u64, MicropostPersistenceError>;
}
