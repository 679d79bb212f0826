//! Deterministic network generation.
//!
//! The same [`SampleNetworkSpec`] always yields an identical
//! [`SampleNetwork`]: every random choice is drawn from a ChaCha RNG seeded
//! from the spec.

use fake::Fake;
use fake::faker::lorem::raw::Sentence;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::sample::{SampleFollow, SampleNetwork, SamplePost, SampleUser};
use crate::spec::{DEMO_EMAIL, DEMO_NAME, DEMO_PASSWORD, SampleNetworkSpec};

/// Maximum name length accepted by the backend.
const NAME_MAX: usize = 50;

/// Maximum post length accepted by the backend.
const CONTENT_MAX: usize = 140;

/// Password shared by every generated account except the demo one.
const GENERATED_PASSWORD: &str = "password";

/// First index (inclusive) of users the demo account follows.
const FOLLOWING_FIRST: usize = 2;
/// Last index (inclusive) of users the demo account follows.
const FOLLOWING_LAST: usize = 50;
/// First index (inclusive) of users following the demo account.
const FOLLOWERS_FIRST: usize = 3;
/// Last index (inclusive) of users following the demo account.
const FOLLOWERS_LAST: usize = 40;

/// Generates a sample network from a specification.
///
/// # Example
///
/// ```
/// use sample_data::{DEMO_EMAIL, SampleNetworkSpec, generate_sample_network};
///
/// let spec = SampleNetworkSpec::new(7, 4).expect("valid spec");
/// let network = generate_sample_network(&spec);
///
/// assert_eq!(network.users.first().map(|u| u.email.as_str()), Some(DEMO_EMAIL));
/// assert!(network.follows.iter().all(|f| f.follower != f.followed));
/// ```
#[must_use]
pub fn generate_sample_network(spec: &SampleNetworkSpec) -> SampleNetwork {
    let mut rng = ChaCha8Rng::seed_from_u64(spec.seed());

    let users = generate_users(&mut rng, spec.user_count());
    let posts = generate_posts(&mut rng, spec.posting_users(), spec.posts_per_user());
    let follows = demo_follows(spec.user_count());

    SampleNetwork {
        users,
        posts,
        follows,
    }
}

fn generate_users(rng: &mut ChaCha8Rng, count: usize) -> Vec<SampleUser> {
    let mut users = Vec::with_capacity(count);
    users.push(SampleUser {
        name: DEMO_NAME.to_owned(),
        email: DEMO_EMAIL.to_owned(),
        password: DEMO_PASSWORD.to_owned(),
    });

    for index in 1..count {
        users.push(SampleUser {
            name: generate_name(rng),
            email: format!("example-{index}@example.org"),
            password: GENERATED_PASSWORD.to_owned(),
        });
    }

    users
}

fn generate_name(rng: &mut ChaCha8Rng) -> String {
    let first: String = FirstName(EN).fake_with_rng(rng);
    let last: String = LastName(EN).fake_with_rng(rng);
    let candidate = format!("{first} {last}");
    let truncated: String = candidate.trim().chars().take(NAME_MAX).collect();
    if truncated.trim().is_empty() {
        // Locales never produce blank names, but keep the output valid anyway.
        return DEMO_NAME.to_owned();
    }
    truncated
}

fn generate_posts(rng: &mut ChaCha8Rng, authors: usize, per_author: usize) -> Vec<SamplePost> {
    let mut posts = Vec::with_capacity(authors.saturating_mul(per_author));
    // Interleave authors so every author's posts are spread across the timeline.
    for _ in 0..per_author {
        for author in 0..authors {
            posts.push(SamplePost {
                author,
                content: generate_content(rng),
            });
        }
    }
    posts
}

fn generate_content(rng: &mut ChaCha8Rng) -> String {
    let sentence: String = Sentence(EN, 4..9).fake_with_rng(rng);
    let truncated: String = sentence.trim().chars().take(CONTENT_MAX).collect();
    if truncated.trim().is_empty() {
        return "Lorem ipsum".to_owned();
    }
    truncated
}

fn demo_follows(count: usize) -> Vec<SampleFollow> {
    let Some(last_index) = count.checked_sub(1) else {
        return Vec::new();
    };

    let following = (FOLLOWING_FIRST..=FOLLOWING_LAST.min(last_index)).map(|followed| {
        SampleFollow {
            follower: 0,
            followed,
        }
    });
    let followers = (FOLLOWERS_FIRST..=FOLLOWERS_LAST.min(last_index)).map(|follower| {
        SampleFollow {
            follower,
            followed: 0,
        }
    });

    following.chain(followers).collect()
}
