//! Background expiry of feeds and pledges.
//!
//! Records carry their own expiry attribute; this task deletes the ones that
//! have passed it. Removal is periodic, so a record stays readable for up to
//! one sweep interval after it expires.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{Database, PurgeStats};

/// Default sweep interval in seconds (10 minutes).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 600;

/// Periodic purger of expired records.
pub struct TtlSweeper {
    db: Arc<Database>,
    sweep_interval: Duration,
}

impl TtlSweeper {
    /// Create a sweeper with the default interval.
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_interval(db, Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS))
    }

    /// Create a sweeper with a custom interval.
    pub fn with_interval(db: Arc<Database>, sweep_interval: Duration) -> Self {
        Self { db, sweep_interval }
    }

    /// Run forever, sweeping once per interval.
    pub async fn run(&self) {
        info!(
            "TTL sweeper started (interval: {} ms)",
            self.sweep_interval.as_millis()
        );

        let mut timer = interval(self.sweep_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            self.sweep().await;
        }
    }

    /// Run a single pass. Failures are logged and retried on the next tick.
    pub async fn sweep(&self) -> Option<PurgeStats> {
        match self.db.purge_expired(Utc::now()).await {
            Ok(stats) => {
                if stats.feeds > 0 || stats.pledges > 0 {
                    info!(
                        "Purged {} expired feed(s) and {} expired pledge(s)",
                        stats.feeds, stats.pledges
                    );
                } else {
                    debug!("No expired records");
                }
                Some(stats)
            }
            Err(e) => {
                warn!("Failed to purge expired records: {}", e);
                None
            }
        }
    }
}

/// Start the sweeper as a background task.
pub fn start_ttl_sweeper(db: Arc<Database>, sweep_interval: Duration) -> JoinHandle<()> {
    let sweeper = TtlSweeper::with_interval(db, sweep_interval);
    tokio::spawn(async move {
        sweeper.run().await;
    })
}
