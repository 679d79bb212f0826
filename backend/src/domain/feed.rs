//! Keyset paging for newest-first post listings.
//!
//! Posts are ordered by `(created_at, id)` descending. A [`FeedCursor`] marks
//! the last post a caller has seen; the next page holds strictly older
//! positions, so concurrent inserts never cause repeats or gaps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::micropost::{Micropost, MicropostId};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_FEED_LIMIT: usize = 30;
/// Largest page a caller may request.
pub const MAX_FEED_LIMIT: usize = 100;

/// Position of a post in a newest-first listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCursor {
    created_at: DateTime<Utc>,
    id: MicropostId,
}

impl FeedCursor {
    /// Build a cursor from a post's ordering key.
    pub fn new(created_at: DateTime<Utc>, id: MicropostId) -> Self {
        Self { created_at, id }
    }

    /// Timestamp component.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Identifier tie-breaker.
    pub fn id(&self) -> MicropostId {
        self.id
    }

    /// Whether `post` sorts strictly after this cursor in newest-first order.
    pub fn precedes(&self, post: &Micropost) -> bool {
        (post.created_at(), post.id()) < (self.created_at, self.id)
    }
}

/// Page request for a feed or other newest-first listing.
///
/// # Examples
/// ```
/// use microblog::domain::FeedPage;
///
/// assert_eq!(FeedPage::default().limit(), 30);
/// assert_eq!(FeedPage::new(Some(0)).limit(), 1);
/// assert_eq!(FeedPage::new(Some(500)).limit(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedPage {
    limit: usize,
    before: Option<FeedCursor>,
}

impl FeedPage {
    /// First page with `limit` clamped to `1..=MAX_FEED_LIMIT`.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit: limit
                .unwrap_or(DEFAULT_FEED_LIMIT)
                .clamp(1, MAX_FEED_LIMIT),
            before: None,
        }
    }

    /// Continue after `cursor`.
    #[must_use]
    pub fn before(mut self, cursor: FeedCursor) -> Self {
        self.before = Some(cursor);
        self
    }

    /// Maximum number of posts to return.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Cursor of the last post already seen, if any.
    pub fn cursor(&self) -> Option<FeedCursor> {
        self.before
    }

    /// Same cursor, one extra row, to detect whether another page exists.
    pub fn with_lookahead(&self) -> Self {
        Self {
            limit: self.limit.saturating_add(1),
            before: self.before,
        }
    }
}

impl Default for FeedPage {
    fn default() -> Self {
        Self::new(None)
    }
}

/// One page of posts plus the cursor of the following page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub posts: Vec<Micropost>,
    pub next: Option<FeedCursor>,
}

impl Feed {
    /// Trim a lookahead result (fetched with [`FeedPage::with_lookahead`]) to `page`.
    pub fn from_lookahead(mut posts: Vec<Micropost>, page: &FeedPage) -> Self {
        let has_more = posts.len() > page.limit();
        posts.truncate(page.limit());
        let next = if has_more {
            posts.last().map(Micropost::cursor)
        } else {
            None
        };
        Self { posts, next }
    }
}
