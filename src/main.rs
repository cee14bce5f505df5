use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use vidfeed::{Config, Database, FeedBuilder, FeedRecord, Store, VimeoClient};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = vidfeed::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        vidfeed::logging::init_console_only(&config.logging.level);
    }

    info!("vidfeed starting ({} feed(s) configured)", config.feeds.len());

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> vidfeed::Result<()> {
    let db = Database::open(&config.database.path).await?;

    // One-shot run: a single expiry pass instead of the background sweeper.
    let purged = db.purge_expired(Utc::now()).await?;
    info!(
        "Purged {} expired feed(s) and {} expired pledge(s)",
        purged.feeds, purged.pledges
    );

    let client = VimeoClient::new(&config.vimeo)?;
    let builder = FeedBuilder::new(Arc::new(client));
    let ttl = chrono::Duration::seconds(config.storage.feed_ttl_secs);

    let mut failed = 0;
    for feed_config in &config.feeds {
        let feed = match builder.build(feed_config).await {
            Ok(feed) => feed,
            Err(e) => {
                warn!("Failed to build feed {}: {}", feed_config.id, e);
                failed += 1;
                continue;
            }
        };

        let mut record = FeedRecord::new(feed, config.storage.user_id.clone(), ttl);
        if let Some(existing) = db.get_feed(record.id()).await? {
            record = record.with_created_at(existing.created_at);
        }

        db.put_feed(&record).await?;
        info!(
            "Stored feed {} ({} episode(s))",
            record.id(),
            record.feed.episodes.len()
        );
    }

    let stored = db.list_feeds_for_user(&config.storage.user_id).await?;
    info!(
        "{} feed(s) stored for user {}, {} failed",
        stored.len(),
        config.storage.user_id,
        failed
    );

    Ok(())
}
