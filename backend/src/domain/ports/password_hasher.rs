//! Port for one-way password hashing.
//!
//! Hashing is CPU bound and synchronous; adapters must be cheap to share
//! across tasks.

use crate::domain::{Password, PasswordDigest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// The hashing primitive rejected its input or parameters.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored digest could not be parsed.
        MalformedDigest { message: String } => "stored password digest is malformed: {message}",
    }
}

/// Derives and checks password digests.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Derive a salted digest for `password`.
    fn hash(&self, password: &Password) -> Result<PasswordDigest, PasswordHashError>;

    /// Check `candidate` against a previously derived digest.
    ///
    /// A mismatch is `Ok(false)`; errors are reserved for unusable digests or
    /// hasher faults.
    fn verify(&self, candidate: &str, digest: &PasswordDigest) -> Result<bool, PasswordHashError>;
}

const FIXTURE_PREFIX: &str = "fixture$";

/// Reversible stand-in hasher for tests and local tooling.
///
/// Digests are the plaintext behind a marker prefix, so this must never back
/// real accounts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePasswordHasher;

impl PasswordHasher for FixturePasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordDigest, PasswordHashError> {
        PasswordDigest::new(format!("{FIXTURE_PREFIX}{}", password.expose()))
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, candidate: &str, digest: &PasswordDigest) -> Result<bool, PasswordHashError> {
        let stored = digest
            .as_str()
            .strip_prefix(FIXTURE_PREFIX)
            .ok_or_else(|| PasswordHashError::malformed_digest("missing fixture prefix"))?;
        Ok(stored == candidate)
    }
}
