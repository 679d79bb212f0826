//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{DeletedUser, EmailAddress, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another user already holds the (case-folded) email.
        DuplicateEmail { email: String } => "email already registered: {email}",
        /// An update targeted a user that no longer exists.
        NotFound { id: String } => "user not found: {id}",
    }
}

/// Storage for user records.
///
/// Email uniqueness is case-insensitive and must hold even when callers race
/// past their own pre-checks; adapters report it as
/// [`UserPersistenceError::DuplicateEmail`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Overwrite the mutable fields of an existing user.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by canonical email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Remove a user together with their microposts and follow edges.
    ///
    /// Returns `None` when no such user exists. The cascade is atomic.
    async fn delete(&self, id: &UserId) -> Result<Option<DeletedUser>, UserPersistenceError>;

    /// Total number of users.
    async fn count(&self) -> Result<u64, UserPersistenceError>;
}

/// Fixture implementation for tests that never touch user storage.
///
/// Lookups miss, writes are discarded and counts are zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn insert(&self, _user: &User) -> Result<(), UserPersistenceError> {
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        Err(UserPersistenceError::not_found(user.id().to_string()))
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn find_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn delete(&self, _id: &UserId) -> Result<Option<DeletedUser>, UserPersistenceError> {
        Ok(None)
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        Ok(0)
    }
}
