//! Port for follow-edge persistence.

use async_trait::async_trait;

use crate::domain::{Relationship, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by relationship repository adapters.
    pub enum RelationshipPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "relationship repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "relationship repository query failed: {message}",
        /// One endpoint of the edge does not exist; `field` names which.
        UnknownUser { field: String } => "relationship references a missing user: {field}",
        /// The storage layer refused an edge from a user to themselves.
        SelfFollow => "relationship endpoints must differ",
    }
}

/// Storage for directed follow edges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Insert an edge. Returns `false` when it already existed.
    async fn insert(&self, relationship: &Relationship)
    -> Result<bool, RelationshipPersistenceError>;

    /// Remove an edge. Returns `false` when there was none.
    async fn delete(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipPersistenceError>;

    /// Whether `follower` follows `followed`.
    async fn exists(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipPersistenceError>;

    /// Users following `user`, ordered by name (byte order) then id.
    async fn followers(&self, user: &UserId) -> Result<Vec<User>, RelationshipPersistenceError>;

    /// Users `user` follows, ordered by name (byte order) then id.
    async fn following(&self, user: &UserId) -> Result<Vec<User>, RelationshipPersistenceError>;

    /// Number of users following `user`.
    async fn follower_count(&self, user: &UserId) -> Result<u64, RelationshipPersistenceError>;

    /// Number of users `user` follows.
    async fn following_count(&self, user: &UserId) -> Result<u64, RelationshipPersistenceError>;
}
