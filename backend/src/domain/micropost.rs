//! Microposts: short text posts owned by a single user.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::feed::FeedCursor;
use super::user::UserId;

/// Maximum length of a post body.
pub const CONTENT_MAX: usize = 140;

/// Field keys used in validation errors for microposts.
pub mod fields {
    pub const CONTENT: &str = "content";
    pub const AUTHOR_ID: &str = "author_id";
}

/// Validation errors returned by [`MicropostContent::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MicropostValidationError {
    BlankContent,
    ContentTooLong { max: usize },
    MissingAuthor,
}

impl fmt::Display for MicropostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankContent => write!(f, "can't be blank"),
            Self::ContentTooLong { max } => {
                write!(f, "is too long (maximum is {max} characters)")
            }
            Self::MissingAuthor => write!(f, "must reference an existing user"),
        }
    }
}

impl std::error::Error for MicropostValidationError {}

/// Micropost identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MicropostId(Uuid);

impl MicropostId {
    /// Wrap an already parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MicropostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Post body: non-blank and at most [`CONTENT_MAX`] characters.
///
/// # Examples
/// ```
/// use microblog::domain::{MicropostContent, MicropostValidationError};
///
/// assert!(MicropostContent::new("Lorem ipsum").is_ok());
/// assert_eq!(
///     MicropostContent::new("a".repeat(141)).err(),
///     Some(MicropostValidationError::ContentTooLong { max: 140 })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MicropostContent(String);

impl MicropostContent {
    /// Validate post content.
    pub fn new(content: impl Into<String>) -> Result<Self, MicropostValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(MicropostValidationError::BlankContent);
        }
        if content.chars().count() > CONTENT_MAX {
            return Err(MicropostValidationError::ContentTooLong { max: CONTENT_MAX });
        }
        Ok(Self(content))
    }
}

impl AsRef<str> for MicropostContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<MicropostContent> for String {
    fn from(value: MicropostContent) -> Self {
        value.0
    }
}

impl TryFrom<String> for MicropostContent {
    type Error = MicropostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A post owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Micropost {
    id: MicropostId,
    author_id: UserId,
    content: MicropostContent,
    created_at: DateTime<Utc>,
}

impl Micropost {
    /// Build a post from validated parts.
    pub fn new(
        id: MicropostId,
        author_id: UserId,
        content: MicropostContent,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author_id,
            content,
            created_at,
        }
    }

    /// Post identifier.
    pub fn id(&self) -> MicropostId {
        self.id
    }

    /// Owning user.
    pub fn author_id(&self) -> UserId {
        self.author_id
    }

    /// Post body.
    pub fn content(&self) -> &MicropostContent {
        &self.content
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Keyset position of this post in a newest-first listing.
    pub fn cursor(&self) -> FeedCursor {
        FeedCursor::new(self.created_at, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn rejects_blank_content(#[case] content: &str) {
        assert_eq!(
            MicropostContent::new(content).err(),
            Some(MicropostValidationError::BlankContent)
        );
    }

    #[rstest]
    fn accepts_content_at_the_limit() {
        let content = "é".repeat(CONTENT_MAX);
        assert!(MicropostContent::new(content).is_ok());
    }

    #[rstest]
    fn serialises_with_camel_case_keys() {
        let post = Micropost::new(
            MicropostId::random(),
            UserId::random(),
            MicropostContent::new("hello").expect("valid content"),
            Utc::now(),
        );
        let value = serde_json::to_value(&post).expect("post serialises");
        assert!(value.get("authorId").is_some());
        assert_eq!(value.get("content").and_then(|v| v.as_str()), Some("hello"));
    }
}
