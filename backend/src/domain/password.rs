//! Write-only password input and the digest stored in its place.

use std::fmt;

use zeroize::Zeroizing;

/// Minimum number of characters accepted for a new password.
pub const PASSWORD_MIN: usize = 6;

/// Validation errors returned by [`Password::new`] and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordValidationError {
    Blank,
    TooShort { min: usize },
    ConfirmationMismatch,
    EmptyDigest,
}

impl fmt::Display for PasswordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => write!(f, "can't be blank"),
            Self::TooShort { min } => {
                write!(f, "is too short (minimum is {min} characters)")
            }
            Self::ConfirmationMismatch => write!(f, "doesn't match password"),
            Self::EmptyDigest => write!(f, "password digest must not be empty"),
        }
    }
}

impl std::error::Error for PasswordValidationError {}

/// Plaintext password accepted for hashing.
///
/// The buffer is wiped on drop and never printed by `Debug`.
///
/// # Examples
/// ```
/// use microblog::domain::{Password, PasswordValidationError};
///
/// assert!(Password::new("foobar").is_ok());
/// assert_eq!(Password::new("      ").err(), Some(PasswordValidationError::Blank));
/// assert_eq!(
///     Password::new("fooba").err(),
///     Some(PasswordValidationError::TooShort { min: 6 })
/// );
/// ```
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a candidate password.
    pub fn new(plaintext: impl Into<String>) -> Result<Self, PasswordValidationError> {
        let plaintext = Zeroizing::new(plaintext.into());
        if plaintext.trim().is_empty() {
            return Err(PasswordValidationError::Blank);
        }
        if plaintext.chars().count() < PASSWORD_MIN {
            return Err(PasswordValidationError::TooShort { min: PASSWORD_MIN });
        }
        Ok(Self(plaintext))
    }

    /// Validate a candidate password together with an optional confirmation.
    pub fn with_confirmation(
        plaintext: impl Into<String>,
        confirmation: Option<&str>,
    ) -> Result<Self, PasswordValidationError> {
        let password = Self::new(plaintext)?;
        match confirmation {
            Some(confirmation) if confirmation != password.expose() => {
                Err(PasswordValidationError::ConfirmationMismatch)
            }
            _ => Ok(password),
        }
    }

    /// Borrow the plaintext for hashing.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(\"***\")")
    }
}

/// Opaque one-way password digest as produced by a
/// [`PasswordHasher`](super::ports::PasswordHasher).
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest string.
    pub fn new(digest: impl Into<String>) -> Result<Self, PasswordValidationError> {
        let digest = digest.into();
        if digest.trim().is_empty() {
            return Err(PasswordValidationError::EmptyDigest);
        }
        Ok(Self(digest))
    }

    /// Borrow the encoded digest.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(\"***\")")
    }
}
