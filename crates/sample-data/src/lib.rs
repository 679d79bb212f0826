//! Deterministic sample social network generation for demonstration purposes.
//!
//! This crate produces a believable, reproducible network of users, posts and
//! follow edges from a numeric seed. It is deliberately independent of the
//! backend domain types; the backend converts the plain records below into
//! validated domain values at the point of use.
//!
//! # Overview
//!
//! - The first user is a fixed demo account so operators can sign in after
//!   seeding.
//! - Remaining users receive generated names and sequential email addresses.
//! - The first few users author posts of generated sentences.
//! - The demo account follows a band of users and is followed by another,
//!   overlapping band, giving it a non-trivial feed.
//!
//! # Example
//!
//! ```
//! use sample_data::{SampleNetworkSpec, generate_sample_network};
//!
//! let spec = SampleNetworkSpec::new(42, 10)
//!     .expect("valid spec")
//!     .with_posts_per_user(3);
//! let network = generate_sample_network(&spec);
//!
//! assert_eq!(network.users.len(), 10);
//! assert_eq!(network, generate_sample_network(&spec));
//! ```

mod error;
mod generator;
mod sample;
mod spec;

pub use error::SampleSpecError;
pub use generator::generate_sample_network;
pub use sample::{SampleFollow, SampleNetwork, SamplePost, SampleUser};
pub use spec::{
    DEMO_EMAIL, DEMO_NAME, DEMO_PASSWORD, MAX_POSTS_PER_USER, MAX_USERS, SampleNetworkSpec,
};
