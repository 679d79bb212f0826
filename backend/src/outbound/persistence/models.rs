//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions back into domain types
//! re-validate every field so a hand-edited row cannot smuggle an invalid
//! value past the domain constructors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{
    EmailAddress, Micropost, MicropostContent, MicropostId, PasswordDigest, User, UserId,
    UserName,
};

use super::schema::{microposts, relationships, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_digest: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_digest: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for updating existing user records.
///
/// `treat_none_as_null` is left off so an absent digest keeps the stored one.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_digest: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewUserRow<'a> {
    pub(crate) fn from_user(user: &'a User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_digest: user.password_digest().map(PasswordDigest::as_str),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

impl<'a> UserUpdate<'a> {
    pub(crate) fn from_user(user: &'a User) -> Self {
        Self {
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_digest: user.password_digest().map(PasswordDigest::as_str),
            updated_at: user.updated_at(),
        }
    }
}

impl UserRow {
    /// Rebuild the domain user, or `Err(message)` when a column no longer
    /// satisfies the domain rules.
    pub(crate) fn into_domain(self) -> Result<User, String> {
        let name = UserName::new(self.name).map_err(|err| format!("name {err}"))?;
        let email = EmailAddress::new(self.email).map_err(|err| format!("email {err}"))?;
        let user = User::new(UserId::from_uuid(self.id), name, email, self.created_at)
            .with_updated_at(self.updated_at);
        match self.password_digest.map(PasswordDigest::new) {
            None => Ok(user),
            Some(Ok(digest)) => Ok(user.with_password_digest(digest)),
            Some(Err(_)) => {
                warn!(user_id = %self.id, "ignoring blank password digest");
                Ok(user)
            }
        }
    }
}

/// Row struct for reading from the microposts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = microposts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MicropostRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new micropost records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = microposts)]
pub(crate) struct NewMicropostRow<'a> {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewMicropostRow<'a> {
    pub(crate) fn from_post(post: &'a Micropost) -> Self {
        Self {
            id: *post.id().as_uuid(),
            author_id: *post.author_id().as_uuid(),
            content: post.content().as_ref(),
            created_at: post.created_at(),
        }
    }
}

impl MicropostRow {
    pub(crate) fn into_domain(self) -> Result<Micropost, String> {
        let content = MicropostContent::new(self.content).map_err(|err| format!("content {err}"))?;
        Ok(Micropost::new(
            MicropostId::from_uuid(self.id),
            UserId::from_uuid(self.author_id),
            content,
            self.created_at,
        ))
    }
}

/// Insertable struct for follow edges.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = relationships)]
pub(crate) struct NewRelationshipRow {
    pub follower_id: Uuid,
    pub followed_id: Uuid,
    pub created_at: DateTime<Utc>,
}
