//! Stored record types.

use chrono::{DateTime, Duration, Utc};

use crate::builder::Feed;

/// A feed as persisted: the assembled feed plus ownership and expiry.
#[derive(Debug, Clone)]
pub struct FeedRecord {
    pub feed: Feed,
    /// Owner, the equality key of the user index.
    pub user_id: String,
    /// Ordering key of the user index.
    pub created_at: DateTime<Utc>,
    /// Once passed, the store may purge the record.
    pub expiration_time: DateTime<Utc>,
}

impl FeedRecord {
    /// Wrap a freshly built feed, expiring `ttl` from now.
    pub fn new(feed: Feed, user_id: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            feed,
            user_id: user_id.into(),
            created_at: now,
            expiration_time: now + ttl,
        }
    }

    /// Set the creation time.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Set the expiration time.
    pub fn with_expiration_time(mut self, expiration_time: DateTime<Utc>) -> Self {
        self.expiration_time = expiration_time;
        self
    }

    pub fn id(&self) -> &str {
        &self.feed.id
    }
}

/// A user's entitlement to elevated feed quality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pledge {
    pub id: i64,
    pub user_id: String,
    /// `None` for an open-ended pledge.
    pub expires_at: Option<DateTime<Utc>>,
    pub tier: i32,
}

impl Pledge {
    /// Create an open-ended pledge.
    pub fn new(id: i64, user_id: impl Into<String>, tier: i32) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            expires_at: None,
            tier,
        }
    }

    /// Set the expiry time.
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true if the pledge has lapsed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
