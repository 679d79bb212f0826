//! Error types for sample network specifications.

use thiserror::Error;

/// Errors raised when a [`crate::SampleNetworkSpec`] is out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleSpecError {
    /// At least one user is required to anchor the network.
    #[error("sample network must contain at least one user")]
    NoUsers,

    /// The requested user count exceeds the supported maximum.
    #[error("sample network supports at most {max} users, requested {requested}")]
    TooManyUsers {
        /// Maximum supported user count.
        max: usize,
        /// Requested user count.
        requested: usize,
    },

    /// The requested per-user post count exceeds the supported maximum.
    #[error("sample network supports at most {max} posts per user, requested {requested}")]
    TooManyPosts {
        /// Maximum supported posts per user.
        max: usize,
        /// Requested posts per user.
        requested: usize,
    },
}
