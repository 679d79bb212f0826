//! Directed follow edges between users.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::user::UserId;

/// Field keys used in validation errors for relationships.
pub mod fields {
    pub const FOLLOWER_ID: &str = "follower_id";
    pub const FOLLOWED_ID: &str = "followed_id";
}

/// Validation errors raised when building a [`Relationship`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipValidationError {
    SelfFollow,
    UnknownUser,
}

impl fmt::Display for RelationshipValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfFollow => write!(f, "can't follow yourself"),
            Self::UnknownUser => write!(f, "must reference an existing user"),
        }
    }
}

impl std::error::Error for RelationshipValidationError {}

/// `follower_id` follows `followed_id`. No reciprocity is implied.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use microblog::domain::{Relationship, RelationshipValidationError, UserId};
///
/// let ada = UserId::random();
/// let bob = UserId::random();
/// assert!(Relationship::new(ada, bob, Utc::now()).is_ok());
/// assert_eq!(
///     Relationship::new(ada, ada, Utc::now()).err(),
///     Some(RelationshipValidationError::SelfFollow)
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    follower_id: UserId,
    followed_id: UserId,
    created_at: DateTime<Utc>,
}

impl Relationship {
    /// Build an edge, rejecting self-follows.
    pub fn new(
        follower_id: UserId,
        followed_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, RelationshipValidationError> {
        if follower_id == followed_id {
            return Err(RelationshipValidationError::SelfFollow);
        }
        Ok(Self {
            follower_id,
            followed_id,
            created_at,
        })
    }

    /// The following user.
    pub fn follower_id(&self) -> UserId {
        self.follower_id
    }

    /// The followed user.
    pub fn followed_id(&self) -> UserId {
        self.followed_id
    }

    /// When the edge was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Result of a follow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowing,
}

/// Result of an unfollow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnfollowOutcome {
    Unfollowed,
    NotFollowing,
}
