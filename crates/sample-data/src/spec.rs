//! Parameters controlling sample network generation.

use crate::error::SampleSpecError;

/// Display name of the fixed demo account.
pub const DEMO_NAME: &str = "Example User";
/// Email address of the fixed demo account.
pub const DEMO_EMAIL: &str = "example@example.org";
/// Password of the fixed demo account.
pub const DEMO_PASSWORD: &str = "foobar";

/// Largest network the generator will build.
pub const MAX_USERS: usize = 1_000;
/// Largest number of posts generated for a single author.
pub const MAX_POSTS_PER_USER: usize = 200;

const DEFAULT_POSTS_PER_USER: usize = 50;
const DEFAULT_POSTING_USERS: usize = 6;

/// Validated generation parameters.
///
/// # Examples
///
/// ```
/// use sample_data::{SampleNetworkSpec, SampleSpecError};
///
/// assert_eq!(SampleNetworkSpec::new(1, 0), Err(SampleSpecError::NoUsers));
/// let spec = SampleNetworkSpec::new(1, 5).expect("valid spec");
/// assert_eq!(spec.user_count(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleNetworkSpec {
    seed: u64,
    user_count: usize,
    posts_per_user: usize,
    posting_users: usize,
}

impl SampleNetworkSpec {
    /// Create a specification for `user_count` users seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`SampleSpecError`] when `user_count` is zero or larger than
    /// [`MAX_USERS`].
    pub const fn new(seed: u64, user_count: usize) -> Result<Self, SampleSpecError> {
        if user_count == 0 {
            return Err(SampleSpecError::NoUsers);
        }
        if user_count > MAX_USERS {
            return Err(SampleSpecError::TooManyUsers {
                max: MAX_USERS,
                requested: user_count,
            });
        }
        Ok(Self {
            seed,
            user_count,
            posts_per_user: DEFAULT_POSTS_PER_USER,
            posting_users: DEFAULT_POSTING_USERS,
        })
    }

    /// Override the number of posts generated for each posting user.
    ///
    /// Values above [`MAX_POSTS_PER_USER`] are clamped.
    #[must_use]
    pub fn with_posts_per_user(mut self, posts_per_user: usize) -> Self {
        self.posts_per_user = posts_per_user.min(MAX_POSTS_PER_USER);
        self
    }

    /// Override how many of the leading users author posts.
    #[must_use]
    pub const fn with_posting_users(mut self, posting_users: usize) -> Self {
        self.posting_users = posting_users;
        self
    }

    /// Fallible variant of [`Self::with_posts_per_user`] rejecting large values.
    ///
    /// # Errors
    ///
    /// Returns [`SampleSpecError::TooManyPosts`] when `posts_per_user` exceeds
    /// [`MAX_POSTS_PER_USER`].
    pub const fn try_with_posts_per_user(
        mut self,
        posts_per_user: usize,
    ) -> Result<Self, SampleSpecError> {
        if posts_per_user > MAX_POSTS_PER_USER {
            return Err(SampleSpecError::TooManyPosts {
                max: MAX_POSTS_PER_USER,
                requested: posts_per_user,
            });
        }
        self.posts_per_user = posts_per_user;
        Ok(self)
    }

    /// RNG seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of users to generate, including the demo account.
    #[must_use]
    pub const fn user_count(&self) -> usize {
        self.user_count
    }

    /// Number of posts generated for each posting user.
    #[must_use]
    pub const fn posts_per_user(&self) -> usize {
        self.posts_per_user
    }

    /// Number of leading users that author posts, capped by the user count.
    #[must_use]
    pub fn posting_users(&self) -> usize {
        self.posting_users.min(self.user_count)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn rejects_oversized_networks() {
        assert_eq!(
            SampleNetworkSpec::new(7, MAX_USERS + 1),
            Err(SampleSpecError::TooManyUsers {
                max: MAX_USERS,
                requested: MAX_USERS + 1,
            })
        );
    }

    #[rstest]
    #[case(3, 3)]
    #[case(10, 6)]
    fn posting_users_never_exceed_user_count(#[case] users: usize, #[case] expected: usize) {
        let spec = SampleNetworkSpec::new(1, users).expect("valid spec");
        assert_eq!(spec.posting_users(), expected);
    }

    #[rstest]
    fn posts_per_user_is_clamped() {
        let spec = SampleNetworkSpec::new(1, 2)
            .expect("valid spec")
            .with_posts_per_user(MAX_POSTS_PER_USER * 2);
        assert_eq!(spec.posts_per_user(), MAX_POSTS_PER_USER);
    }

    #[rstest]
    fn fallible_override_rejects_large_post_counts() {
        let spec = SampleNetworkSpec::new(1, 2).expect("valid spec");
        assert!(matches!(
            spec.try_with_posts_per_user(MAX_POSTS_PER_USER + 1),
            Err(SampleSpecError::TooManyPosts { .. })
        ));
    }
}
