//! Feed repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::types::FeedRecord;
use crate::builder::{Feed, Item};
use crate::config::Quality;
use crate::platform::SourceType;
use crate::{Result, VidfeedError};

/// Row type for a feed from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedRow {
    id: String,
    user_id: String,
    created_at: i64,
    expiration_time: i64,
    item_id: String,
    source_type: String,
    title: String,
    item_url: String,
    description: String,
    cover_art: String,
    author: String,
    pub_date: String,
    updated_at: String,
    quality: String,
    episodes: String,
}

impl TryFrom<FeedRow> for FeedRecord {
    type Error = VidfeedError;

    fn try_from(row: FeedRow) -> Result<Self> {
        let source_type = SourceType::from_str_opt(&row.source_type).ok_or_else(|| {
            VidfeedError::Database(format!(
                "feed {} has unknown source type {:?}",
                row.id, row.source_type
            ))
        })?;
        let quality = row
            .quality
            .parse::<Quality>()
            .map_err(|e| VidfeedError::Database(format!("feed {}: {}", row.id, e)))?;
        let episodes: Vec<Item> = serde_json::from_str(&row.episodes)?;

        let feed = Feed {
            id: row.id,
            item_id: row.item_id,
            source_type,
            title: row.title,
            item_url: row.item_url,
            description: row.description,
            cover_art: row.cover_art,
            author: row.author,
            pub_date: parse_datetime(&row.pub_date)?,
            updated_at: parse_datetime(&row.updated_at)?,
            quality,
            episodes,
        };

        Ok(FeedRecord {
            feed,
            user_id: row.user_id,
            created_at: from_unix(row.created_at)?,
            expiration_time: from_unix(row.expiration_time)?,
        })
    }
}

/// Repository for feed records.
pub struct FeedRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FeedRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Write a feed, replacing any existing record with the same ID.
    pub async fn put(&self, record: &FeedRecord) -> Result<()> {
        let feed = &record.feed;
        let episodes = serde_json::to_string(&feed.episodes)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO feeds
                (id, user_id, created_at, expiration_time, item_id, source_type, title,
                 item_url, description, cover_art, author, pub_date, updated_at, quality,
                 episodes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&feed.id)
        .bind(&record.user_id)
        .bind(record.created_at.timestamp())
        .bind(record.expiration_time.timestamp())
        .bind(&feed.item_id)
        .bind(feed.source_type.as_str())
        .bind(&feed.title)
        .bind(&feed.item_url)
        .bind(&feed.description)
        .bind(&feed.cover_art)
        .bind(&feed.author)
        .bind(feed.pub_date.to_rfc3339())
        .bind(feed.updated_at.to_rfc3339())
        .bind(feed.quality.as_str())
        .bind(episodes)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Get a feed by ID.
    ///
    /// Expired records are returned until the sweeper removes them.
    pub async fn get(&self, id: &str) -> Result<Option<FeedRecord>> {
        let row = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT id, user_id, created_at, expiration_time, item_id, source_type, title,
                   item_url, description, cover_art, author, pub_date, updated_at, quality,
                   episodes
            FROM feeds
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(FeedRecord::try_from).transpose()
    }

    /// Delete a feed by ID.
    ///
    /// Returns true if a record was removed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM feeds WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List a user's feed IDs, oldest first.
    ///
    /// Served from the user index alone; the feed rows are not read.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT id
            FROM feeds INDEXED BY idx_feeds_user_created
            WHERE user_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }

    /// Set the quality of every feed owned by a user.
    ///
    /// Returns the number of feeds updated.
    pub async fn downgrade(&self, user_id: &str, quality: Quality) -> Result<u64> {
        let result = sqlx::query("UPDATE feeds SET quality = ? WHERE user_id = ? AND quality <> ?")
            .bind(quality.as_str())
            .bind(user_id)
            .bind(quality.as_str())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete feeds whose expiration time has passed.
    ///
    /// Expiry is stored in whole seconds, so a feed is only removed once the
    /// second after its stored expiry has begun; it is never removed early.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM feeds WHERE expiration_time < ?")
            .bind(now.timestamp())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Count all feeds.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feeds")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Parse a stored RFC3339 datetime.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| VidfeedError::Database(format!("invalid datetime {:?}: {}", s, e)))
}

pub(super) fn from_unix(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| VidfeedError::Database(format!("timestamp out of range: {}", secs)))
}
