//! Generated network records.
//!
//! Users are referenced by their index in [`SampleNetwork::users`] so the
//! records carry no storage identifiers.

use serde::{Deserialize, Serialize};

/// A generated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleUser {
    /// Human-readable name, at most 50 characters.
    pub name: String,
    /// Unique lowercase email address.
    pub email: String,
    /// Plaintext password to hash when persisting.
    pub password: String,
}

/// A generated post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplePost {
    /// Index of the authoring user.
    pub author: usize,
    /// Post body, at most 140 characters.
    pub content: String,
}

/// A generated follow edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleFollow {
    /// Index of the following user.
    pub follower: usize,
    /// Index of the followed user.
    pub followed: usize,
}

/// Complete generated network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleNetwork {
    /// Users, demo account first.
    pub users: Vec<SampleUser>,
    /// Posts in authoring order.
    pub posts: Vec<SamplePost>,
    /// Follow edges, never self-referential and never duplicated.
    pub follows: Vec<SampleFollow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_follow_serializes_to_camel_case() {
        let follow = SampleFollow {
            follower: 0,
            followed: 2,
        };
        let json = serde_json::to_string(&follow).expect("serialize");
        assert_eq!(json, r#"{"follower":0,"followed":2}"#);
    }
}
