//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities for the social graph (users,
//! microposts, follow edges) and the services that drive them through the
//! ports in [`ports`]. Types validate on construction; services own the
//! cross-record rules such as email uniqueness and feed composition.
//!
//! Public surface:
//! - Error / ErrorCode: transport agnostic failure payload.
//! - User, Micropost, Relationship: aggregates.
//! - UserAccountsService, SocialGraphService, MicropostService, FeedService:
//!   driving services.

pub mod accounts_service;
pub mod error;
pub mod feed;
pub mod feed_service;
pub mod micropost;
pub mod micropost_service;
pub mod password;
pub mod ports;
pub mod relationship;
pub mod social_graph_service;
pub mod user;
pub mod validation;

mod persistence_errors;
mod timestamp;

pub use self::accounts_service::{SignupRequest, UpdateUserRequest, UserAccountsService};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::feed::{DEFAULT_FEED_LIMIT, Feed, FeedCursor, FeedPage, MAX_FEED_LIMIT};
pub use self::feed_service::FeedService;
pub use self::micropost::{
    CONTENT_MAX, Micropost, MicropostContent, MicropostId, MicropostValidationError,
};
pub use self::micropost_service::MicropostService;
pub use self::password::{PASSWORD_MIN, Password, PasswordDigest, PasswordValidationError};
pub use self::relationship::{
    FollowOutcome, Relationship, RelationshipValidationError, UnfollowOutcome,
};
pub use self::social_graph_service::SocialGraphService;
pub use self::user::{
    DeletedUser, EMAIL_MAX, EmailAddress, NAME_MAX, User, UserId, UserName, UserValidationError,
};
pub use self::validation::ValidationErrors;

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use microblog::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<u32> {
///     Err(Error::not_found("nope"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
