//! Persist a generated sample network through the domain services.
//!
//! Every record goes through the same validation as user-initiated writes.
//! Re-running with the same network is safe: users whose email already
//! exists are reused and their posts are not duplicated, and follows are
//! idempotent.

use sample_data::SampleNetwork;
use thiserror::Error;
use tracing::info;

use crate::domain::ports::{
    MicropostRepository, PasswordHasher, RelationshipRepository, UserRepository,
};
use crate::domain::{
    Error, FollowOutcome, MicropostService, SignupRequest, SocialGraphService, UserAccountsService,
    UserId,
};

/// Failures while persisting a sample network.
#[derive(Debug, Error)]
pub enum SeedingError {
    /// A sample user could not be looked up or created.
    #[error("sample user {index} ({email}) was rejected: {source}")]
    User {
        index: usize,
        email: String,
        #[source]
        source: Error,
    },
    /// A sample post could not be stored.
    #[error("sample post by user {author} was rejected: {source}")]
    Post {
        author: usize,
        #[source]
        source: Error,
    },
    /// A follow edge could not be stored.
    #[error("sample follow {follower} -> {followed} was rejected: {source}")]
    Follow {
        follower: usize,
        followed: usize,
        #[source]
        source: Error,
    },
    /// A post or follow referenced a user index outside the network.
    #[error("sample network references unknown user index {index}")]
    UnknownIndex { index: usize },
}

/// Counts of records written by [`seed_network`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub users_existing: usize,
    pub posts_created: usize,
    pub follows_created: usize,
}

/// The services a seeding run writes through.
pub struct SeedServices<'a, U, H, R, M> {
    pub accounts: &'a UserAccountsService<U, H>,
    pub graph: &'a SocialGraphService<U, R>,
    pub posts: &'a MicropostService<U, M>,
}

/// Write `network` through the services and report what was created.
///
/// # Errors
///
/// Stops at the first record the services reject.
pub async fn seed_network<U, H, R, M>(
    services: SeedServices<'_, U, H, R, M>,
    network: &SampleNetwork,
) -> Result<SeedReport, SeedingError>
where
    U: UserRepository,
    H: PasswordHasher,
    R: RelationshipRepository,
    M: MicropostRepository,
{
    let mut report = SeedReport::default();
    let mut ids: Vec<UserId> = Vec::with_capacity(network.users.len());
    let mut fresh: Vec<bool> = Vec::with_capacity(network.users.len());

    for (index, sample) in network.users.iter().enumerate() {
        let user_error = |source| SeedingError::User {
            index,
            email: sample.email.clone(),
            source,
        };
        let existing = services
            .accounts
            .find_by_email(&sample.email)
            .await
            .map_err(user_error)?;
        if let Some(user) = existing {
            ids.push(user.id());
            fresh.push(false);
            report.users_existing += 1;
            continue;
        }
        let request = SignupRequest::new(
            sample.name.as_str(),
            sample.email.as_str(),
            sample.password.as_str(),
        );
        let user = services.accounts.sign_up(request).await.map_err(user_error)?;
        ids.push(user.id());
        fresh.push(true);
        report.users_created += 1;
    }

    let lookup = |index: usize| {
        ids.get(index)
            .copied()
            .ok_or(SeedingError::UnknownIndex { index })
    };

    for post in &network.posts {
        let author = lookup(post.author)?;
        if !fresh.get(post.author).copied().unwrap_or(false) {
            continue;
        }
        services
            .posts
            .post(&author, post.content.as_str())
            .await
            .map_err(|source| SeedingError::Post {
                author: post.author,
                source,
            })?;
        report.posts_created += 1;
    }

    for follow in &network.follows {
        let follower = lookup(follow.follower)?;
        let followed = lookup(follow.followed)?;
        let outcome = services
            .graph
            .follow(&follower, &followed)
            .await
            .map_err(|source| SeedingError::Follow {
                follower: follow.follower,
                followed: follow.followed,
                source,
            })?;
        if outcome == FollowOutcome::Followed {
            report.follows_created += 1;
        }
    }

    info!(
        users_created = report.users_created,
        users_existing = report.users_existing,
        posts_created = report.posts_created,
        follows_created = report.follows_created,
        "sample network seeded"
    );
    Ok(report)
}
