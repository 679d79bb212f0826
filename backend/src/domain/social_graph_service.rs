//! Follow graph service.
//!
//! Edges are directed and unique per `(follower, followed)`. Following is
//! idempotent: repeating a follow reports [`FollowOutcome::AlreadyFollowing`]
//! instead of failing.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::persistence_errors::{map_relationship_persistence_error, map_user_persistence_error};
use super::ports::{RelationshipRepository, UserRepository};
use super::timestamp::stored_now;
use super::relationship::{RelationshipValidationError, fields};
use super::{
    Error, FollowOutcome, Relationship, UnfollowOutcome, User, UserId, ValidationErrors,
};

/// Service over the relationship table.
#[derive(Clone)]
pub struct SocialGraphService<U, R> {
    users: Arc<U>,
    relationships: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<U, R> SocialGraphService<U, R> {
    /// Create a new service.
    pub fn new(users: Arc<U>, relationships: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            relationships,
            clock,
        }
    }
}

impl<U, R> SocialGraphService<U, R>
where
    U: UserRepository,
    R: RelationshipRepository,
{
    async fn exists(&self, id: &UserId) -> Result<bool, Error> {
        self.users
            .find_by_id(id)
            .await
            .map(|user| user.is_some())
            .map_err(map_user_persistence_error)
    }

    async fn require(&self, id: &UserId) -> Result<(), Error> {
        if self.exists(id).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!("user {id} not found")))
        }
    }

    /// Make `follower` follow `target`.
    ///
    /// # Errors
    ///
    /// `invalid_request` with a `followed_id` field error for self-follows,
    /// and with `follower_id` / `followed_id` errors for missing users.
    pub async fn follow(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<FollowOutcome, Error> {
        let now = stored_now(self.clock.as_ref());
        let relationship = Relationship::new(*follower, *target, now).map_err(
            |err| Error::validation(&ValidationErrors::single(fields::FOLLOWED_ID, err.to_string())),
        )?;

        let mut errors = ValidationErrors::new();
        if !self.exists(follower).await? {
            errors.add(
                fields::FOLLOWER_ID,
                RelationshipValidationError::UnknownUser.to_string(),
            );
        }
        if !self.exists(target).await? {
            errors.add(
                fields::FOLLOWED_ID,
                RelationshipValidationError::UnknownUser.to_string(),
            );
        }
        errors
            .into_result()
            .map_err(|errors| Error::validation(&errors))?;

        let created = self
            .relationships
            .insert(&relationship)
            .await
            .map_err(map_relationship_persistence_error)?;
        if !created {
            return Ok(FollowOutcome::AlreadyFollowing);
        }

        info!(follower_id = %follower, followed_id = %target, "user followed");
        Ok(FollowOutcome::Followed)
    }

    /// Remove the edge from `follower` to `target` if present.
    pub async fn unfollow(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<UnfollowOutcome, Error> {
        let removed = self
            .relationships
            .delete(follower, target)
            .await
            .map_err(map_relationship_persistence_error)?;
        if !removed {
            return Ok(UnfollowOutcome::NotFollowing);
        }

        info!(follower_id = %follower, followed_id = %target, "user unfollowed");
        Ok(UnfollowOutcome::Unfollowed)
    }

    /// Whether `follower` currently follows `target`.
    pub async fn is_following(&self, follower: &UserId, target: &UserId) -> Result<bool, Error> {
        self.relationships
            .exists(follower, target)
            .await
            .map_err(map_relationship_persistence_error)
    }

    /// Users following `user`, ordered by name then id.
    ///
    /// # Errors
    ///
    /// `not_found` when `user` does not exist.
    pub async fn followers(&self, user: &UserId) -> Result<Vec<User>, Error> {
        self.require(user).await?;
        self.relationships
            .followers(user)
            .await
            .map_err(map_relationship_persistence_error)
    }

    /// Users `user` follows, ordered by name then id.
    ///
    /// # Errors
    ///
    /// `not_found` when `user` does not exist.
    pub async fn following(&self, user: &UserId) -> Result<Vec<User>, Error> {
        self.require(user).await?;
        self.relationships
            .following(user)
            .await
            .map_err(map_relationship_persistence_error)
    }

    /// Number of followers of `user`.
    pub async fn follower_count(&self, user: &UserId) -> Result<u64, Error> {
        self.relationships
            .follower_count(user)
            .await
            .map_err(map_relationship_persistence_error)
    }

    /// Number of users `user` follows.
    pub async fn following_count(&self, user: &UserId) -> Result<u64, Error> {
        self.relationships
            .following_count(user)
            .await
            .map_err(map_relationship_persistence_error)
    }
}
