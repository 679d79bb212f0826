//! User data model.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::password::PasswordDigest;
use super::ports::PasswordHasher;
use super::validation::ValidationErrors;

/// Maximum length of a user name once trimmed.
pub const NAME_MAX: usize = 50;
/// Maximum length of an email address once trimmed.
pub const EMAIL_MAX: usize = 255;

/// Field keys used in [`ValidationErrors`] for user records.
pub mod fields {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const PASSWORD_CONFIRMATION: &str = "password_confirmation";
}

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    BlankName,
    NameTooLong { max: usize },
    BlankEmail,
    EmailTooLong { max: usize },
    InvalidEmail,
    EmailTaken,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::BlankName | Self::BlankEmail => write!(f, "can't be blank"),
            Self::NameTooLong { max } | Self::EmailTooLong { max } => {
                write!(f, "is too long (maximum is {max} characters)")
            }
            Self::InvalidEmail => write!(f, "is invalid"),
            Self::EmailTaken => write!(f, "has already been taken"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its canonical string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name of a user, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    ///
    /// # Examples
    /// ```
    /// use microblog::domain::{UserName, UserValidationError};
    ///
    /// assert_eq!(UserName::new("  Ada  ").expect("valid").as_ref(), "Ada");
    /// assert_eq!(UserName::new(" ").err(), Some(UserValidationError::BlankName));
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::BlankName);
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Length is enforced separately; this only constrains the shape.
        let pattern = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address in lowercase canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate, trim and downcase an email address.
    ///
    /// # Examples
    /// ```
    /// use microblog::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("Foo@EXample.com").expect("valid");
    /// assert_eq!(email.as_ref(), "foo@example.com");
    /// assert!(EmailAddress::new("user@example,com").is_err());
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::BlankEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validate a name/email pair, collecting every failing field.
pub fn validate_profile(
    name: &str,
    email: &str,
) -> Result<(UserName, EmailAddress), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let name = errors.check(fields::NAME, UserName::new(name));
    let email = errors.check(fields::EMAIL, EmailAddress::new(email));
    match (name, email) {
        (Some(name), Some(email)) => Ok((name, email)),
        _ => Err(errors),
    }
}

/// Application user.
///
/// ## Invariants
/// - `name` and `email` are validated value types.
/// - `password_digest` is `None` only for records that have not had a
///   password set yet; such users never authenticate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    name: UserName,
    email: EmailAddress,
    #[serde(skip)]
    password_digest: Option<PasswordDigest>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Build a new [`User`] without a password digest.
    pub fn new(id: UserId, name: UserName, email: EmailAddress, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            email,
            password_digest: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// Attach a password digest.
    #[must_use]
    pub fn with_password_digest(mut self, digest: PasswordDigest) -> Self {
        self.password_digest = Some(digest);
        self
    }

    /// Override the last-modified timestamp.
    #[must_use]
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    /// Replace the profile fields and stamp the modification time.
    #[must_use]
    pub fn with_profile(mut self, name: UserName, email: EmailAddress, at: DateTime<Utc>) -> Self {
        self.name = name;
        self.email = email;
        self.updated_at = at;
        self
    }

    /// Stable user identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Trimmed display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Canonical lowercase email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Stored password digest, when one has been set.
    pub fn password_digest(&self) -> Option<&PasswordDigest> {
        self.password_digest.as_ref()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Check a submitted password against the stored digest.
    ///
    /// Returns `false` when no digest exists and when the hasher fails; the
    /// failure is logged rather than surfaced.
    pub fn authenticated<H>(&self, hasher: &H, submitted: &str) -> bool
    where
        H: PasswordHasher + ?Sized,
    {
        let Some(digest) = self.password_digest.as_ref() else {
            return false;
        };
        match hasher.verify(submitted, digest) {
            Ok(matches) => matches,
            Err(err) => {
                warn!(user_id = %self.id, error = %err, "password verification failed");
                false
            }
        }
    }
}

/// Summary of a user removal and its cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedUser {
    pub id: UserId,
    pub microposts_removed: u64,
    pub relationships_removed: u64,
}
