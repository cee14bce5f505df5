//! Store capability.
//!
//! The operations the rest of the system needs from a feed/pledge store.
//! `Database` implements it on SQLite; the maintenance sweep and the
//! binary only depend on the trait.

use async_trait::async_trait;

use super::types::{FeedRecord, Pledge};
use super::{Database, FeedRepository, PledgeRepository};
use crate::config::Quality;
use crate::Result;

/// Feed and pledge store.
///
/// All writes replace the whole record; concurrent writes to one key are
/// resolved last-write-wins. `list_feeds_for_user` may lag very recent
/// writes.
#[async_trait]
pub trait Store: Send + Sync {
    async fn put_feed(&self, record: &FeedRecord) -> Result<()>;

    async fn get_feed(&self, id: &str) -> Result<Option<FeedRecord>>;

    async fn delete_feed(&self, id: &str) -> Result<bool>;

    async fn put_pledge(&self, pledge: &Pledge) -> Result<()>;

    async fn get_pledge(&self, id: i64) -> Result<Option<Pledge>>;

    async fn delete_pledge(&self, id: i64) -> Result<bool>;

    /// Feed IDs of a user, ordered by creation time ascending.
    async fn list_feeds_for_user(&self, user_id: &str) -> Result<Vec<String>>;

    /// Rewrite the quality of every feed of a user whose pledge lapsed.
    async fn downgrade(&self, user_id: &str, quality: Quality) -> Result<u64>;
}

#[async_trait]
impl Store for Database {
    async fn put_feed(&self, record: &FeedRecord) -> Result<()> {
        FeedRepository::new(self.pool()).put(record).await
    }

    async fn get_feed(&self, id: &str) -> Result<Option<FeedRecord>> {
        FeedRepository::new(self.pool()).get(id).await
    }

    async fn delete_feed(&self, id: &str) -> Result<bool> {
        FeedRepository::new(self.pool()).delete(id).await
    }

    async fn put_pledge(&self, pledge: &Pledge) -> Result<()> {
        PledgeRepository::new(self.pool()).put(pledge).await
    }

    async fn get_pledge(&self, id: i64) -> Result<Option<Pledge>> {
        PledgeRepository::new(self.pool()).get(id).await
    }

    async fn delete_pledge(&self, id: i64) -> Result<bool> {
        PledgeRepository::new(self.pool()).delete(id).await
    }

    async fn list_feeds_for_user(&self, user_id: &str) -> Result<Vec<String>> {
        FeedRepository::new(self.pool()).list_for_user(user_id).await
    }

    async fn downgrade(&self, user_id: &str, quality: Quality) -> Result<u64> {
        FeedRepository::new(self.pool())
            .downgrade(user_id, quality)
            .await
    }
}
