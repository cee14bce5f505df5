//! Feed and pledge store.
//!
//! SQLite through sqlx. Records are replaced whole on every write; the user
//! index and TTL attributes described in `schema` are maintained by the
//! database and by the expiry sweeper in `ttl`.

mod feed_repository;
mod pledge_repository;
pub mod schema;
mod traits;
pub mod ttl;
mod types;

pub use feed_repository::FeedRepository;
pub use pledge_repository::PledgeRepository;
pub use schema::{FEEDS, FEED_USER_INDEX, MIGRATIONS, PLEDGES};
pub use traits::Store;
pub use ttl::{start_ttl_sweeper, TtlSweeper, DEFAULT_SWEEP_INTERVAL_SECS};
pub use types::{FeedRecord, Pledge};

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::Result;

/// Counts of records removed by one expiry pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeStats {
    pub feeds: u64,
    pub pledges: u64,
}

/// Database handle owning the connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a database at the specified path.
    ///
    /// The file and its parent directories are created if missing, and
    /// pending migrations are applied.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening database at {:?}", path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Open an in-memory database for testing.
    ///
    /// Every connection to `:memory:` is a separate database, so the pool
    /// is limited to one connection.
    pub async fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory database");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the current schema version.
    pub async fn schema_version(&self) -> Result<i64> {
        let table_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        )
        .fetch_one(&self.pool)
        .await?;

        if !table_exists {
            return Ok(0);
        }

        let version: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
                .fetch_one(&self.pool)
                .await?;
        Ok(version)
    }

    /// Apply pending migrations.
    ///
    /// Safe to call repeatedly; applied versions are skipped.
    pub async fn migrate(&self) -> Result<()> {
        let current_version = self.schema_version().await?;

        if current_version as usize >= MIGRATIONS.len() {
            debug!("Database is up to date (version {})", current_version);
            return Ok(());
        }

        info!(
            "Migrating database from version {} to {}",
            current_version,
            MIGRATIONS.len()
        );

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version     INTEGER PRIMARY KEY,
                applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&self.pool)
        .await?;

        for (i, migration) in MIGRATIONS.iter().enumerate().skip(current_version as usize) {
            let version = (i + 1) as i64;
            let mut tx = self.pool.begin().await?;

            sqlx::raw_sql(migration).execute(&mut *tx).await?;
            sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                .bind(version)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            debug!("Migration v{} applied", version);
        }

        Ok(())
    }

    /// Check if a table exists.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
        )
        .bind(table_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Check if an index exists.
    pub async fn index_exists(&self, index_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='index' AND name=?)",
        )
        .bind(index_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Remove every record whose TTL attribute has passed as of `now`.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<PurgeStats> {
        let feeds = FeedRepository::new(&self.pool).delete_expired(now).await?;
        let pledges = PledgeRepository::new(&self.pool)
            .delete_expired(now)
            .await?;
        Ok(PurgeStats { feeds, pledges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(db.schema_version().await.unwrap() as usize, MIGRATIONS.len());
    }

    #[tokio::test]
    async fn test_tables_and_index_exist() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(db.table_exists(FEEDS.name).await.unwrap());
        assert!(db.table_exists(PLEDGES.name).await.unwrap());
        assert!(db.index_exists(FEED_USER_INDEX.name).await.unwrap());
        assert!(!db.table_exists("nonexistent").await.unwrap());
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();
        assert_eq!(db.schema_version().await.unwrap() as usize, MIGRATIONS.len());
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_live_records() {
        use crate::builder::Feed;
        use crate::config::Quality;
        use crate::platform::SourceType;

        let db = Database::open_in_memory().await.unwrap();
        let now = Utc::now();
        let feed = |id: &str| Feed {
            id: id.to_string(),
            item_id: "shorts".to_string(),
            source_type: SourceType::Channel,
            title: "Shorts".to_string(),
            item_url: "https://vimeo.com/channels/shorts".to_string(),
            description: String::new(),
            cover_art: String::new(),
            author: String::new(),
            pub_date: now,
            updated_at: now,
            quality: Quality::High,
            episodes: Vec::new(),
        };
        let store = FeedRepository::new(db.pool());
        store
            .put(
                &FeedRecord::new(feed("old"), "u", chrono::Duration::days(1))
                    .with_expiration_time(now - chrono::Duration::seconds(5)),
            )
            .await
            .unwrap();
        store
            .put(&FeedRecord::new(feed("live"), "u", chrono::Duration::days(1)))
            .await
            .unwrap();

        let stats = db.purge_expired(now).await.unwrap();
        assert_eq!(stats, PurgeStats { feeds: 1, pledges: 0 });
        assert!(store.get("old").await.unwrap().is_none());
        assert!(store.get("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_purge_expired_on_empty_store() {
        let db = Database::open_in_memory().await.unwrap();
        let stats = db.purge_expired(Utc::now()).await.unwrap();
        assert_eq!(stats, PurgeStats::default());
    }
}
