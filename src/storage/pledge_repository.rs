//! Pledge repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::feed_repository::from_unix;
use super::types::Pledge;
use crate::Result;

#[derive(Debug, Clone, sqlx::FromRow)]
struct PledgeRow {
    id: i64,
    user_id: String,
    expires_at: Option<i64>,
    tier: i32,
}

impl TryFrom<PledgeRow> for Pledge {
    type Error = crate::VidfeedError;

    fn try_from(row: PledgeRow) -> Result<Self> {
        Ok(Pledge {
            id: row.id,
            user_id: row.user_id,
            expires_at: row.expires_at.map(from_unix).transpose()?,
            tier: row.tier,
        })
    }
}

/// Repository for pledge records.
///
/// Pledges are written by the payment lifecycle; feed assembly only reads
/// them.
pub struct PledgeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PledgeRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Write a pledge, replacing any existing pledge with the same ID.
    pub async fn put(&self, pledge: &Pledge) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO pledges (id, user_id, expires_at, tier) VALUES (?, ?, ?, ?)",
        )
        .bind(pledge.id)
        .bind(&pledge.user_id)
        .bind(pledge.expires_at.map(|at| at.timestamp()))
        .bind(pledge.tier)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Get a pledge by ID.
    pub async fn get(&self, id: i64) -> Result<Option<Pledge>> {
        let row = sqlx::query_as::<_, PledgeRow>(
            "SELECT id, user_id, expires_at, tier FROM pledges WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Pledge::try_from).transpose()
    }

    /// Delete a pledge by ID.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pledges WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete pledges that have lapsed.
    ///
    /// `expires_at` is stored in whole seconds; a pledge is only removed
    /// once the second after it has begun, so a live pledge is never purged.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM pledges WHERE expires_at IS NOT NULL AND expires_at < ?")
                .bind(now.timestamp())
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}
