//! Store tests against an on-disk database.

mod common;

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use common::{sample_feed, DEFAULT_TIMEOUT};
use vidfeed::storage::MIGRATIONS;
use vidfeed::{start_ttl_sweeper, Database, FeedRecord, Pledge, Quality, Store};

async fn open_temp() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("data").join("vidfeed.db"))
        .await
        .unwrap();
    (dir, db)
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vidfeed.db");

    {
        let db = Database::open(&path).await.unwrap();
        db.put_feed(&FeedRecord::new(sample_feed("f1"), "u1", Duration::days(1)))
            .await
            .unwrap();
        db.put_pledge(&Pledge::new(3, "u1", 2)).await.unwrap();
        db.pool().close().await;
    }

    let db = Database::open(&path).await.unwrap();
    assert_eq!(db.schema_version().await.unwrap() as usize, MIGRATIONS.len());

    let record = db.get_feed("f1").await.unwrap().unwrap();
    assert_eq!(record.user_id, "u1");
    assert_eq!(record.feed.title, "Staff Picks");
    assert_eq!(record.feed.episodes.len(), 1);
    assert_eq!(db.get_pledge(3).await.unwrap().unwrap().tier, 2);
}

#[tokio::test]
async fn test_user_index_orders_by_creation_time() {
    let (_dir, db) = open_temp().await;
    let base = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();

    for (id, user, offset) in [
        ("c", "alice", 300),
        ("a", "alice", 100),
        ("x", "bob", 50),
        ("b", "alice", 200),
    ] {
        let record = FeedRecord::new(sample_feed(id), user, Duration::days(1))
            .with_created_at(base + Duration::seconds(offset));
        db.put_feed(&record).await.unwrap();
    }

    assert_eq!(
        db.list_feeds_for_user("alice").await.unwrap(),
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
    assert_eq!(db.list_feeds_for_user("bob").await.unwrap(), vec!["x".to_string()]);
    assert!(db.list_feeds_for_user("carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_put_replaces_whole_record() {
    let (_dir, db) = open_temp().await;

    db.put_feed(&FeedRecord::new(sample_feed("f"), "alice", Duration::days(1)))
        .await
        .unwrap();

    let mut feed = sample_feed("f");
    feed.title = "Renamed".to_string();
    feed.episodes.clear();
    db.put_feed(&FeedRecord::new(feed, "bob", Duration::days(1)))
        .await
        .unwrap();

    let stored = db.get_feed("f").await.unwrap().unwrap();
    assert_eq!(stored.feed.title, "Renamed");
    assert!(stored.feed.episodes.is_empty());
    assert!(db.list_feeds_for_user("alice").await.unwrap().is_empty());
    assert_eq!(db.list_feeds_for_user("bob").await.unwrap(), vec!["f".to_string()]);
}

#[tokio::test]
async fn test_downgrade_after_pledge_lapse() {
    let (_dir, db) = open_temp().await;

    db.put_feed(&FeedRecord::new(sample_feed("f1"), "patron", Duration::days(1)))
        .await
        .unwrap();
    db.put_feed(&FeedRecord::new(sample_feed("f2"), "patron", Duration::days(1)))
        .await
        .unwrap();
    db.put_feed(&FeedRecord::new(sample_feed("f3"), "other", Duration::days(1)))
        .await
        .unwrap();

    assert_eq!(db.downgrade("patron", Quality::Low).await.unwrap(), 2);
    assert_eq!(db.downgrade("patron", Quality::Low).await.unwrap(), 0);

    assert_eq!(db.get_feed("f1").await.unwrap().unwrap().feed.quality, Quality::Low);
    assert_eq!(db.get_feed("f3").await.unwrap().unwrap().feed.quality, Quality::High);
}

#[tokio::test]
async fn test_concurrent_writers() {
    let (_dir, db) = open_temp().await;
    let db = Arc::new(db);

    let mut handles = Vec::new();
    for i in 0..10 {
        let db = Arc::clone(&db);
        handles.push(tokio::spawn(async move {
            let record = FeedRecord::new(sample_feed(&format!("f{}", i)), "u", Duration::days(1));
            db.put_feed(&record).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(db.list_feeds_for_user("u").await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_expired_records_are_eventually_purged() {
    let (_dir, db) = open_temp().await;
    let db = Arc::new(db);
    let past = Utc::now() - Duration::seconds(1);

    db.put_feed(&FeedRecord::new(sample_feed("old"), "u", Duration::days(1)).with_expiration_time(past))
        .await
        .unwrap();
    db.put_feed(&FeedRecord::new(sample_feed("fresh"), "u", Duration::days(1)))
        .await
        .unwrap();
    db.put_pledge(&Pledge::new(1, "u", 1).with_expires_at(past))
        .await
        .unwrap();

    // Expired records stay readable until a sweep runs.
    assert!(db.get_feed("old").await.unwrap().is_some());
    assert!(db.get_pledge(1).await.unwrap().is_some());

    let handle = start_ttl_sweeper(db.clone(), std::time::Duration::from_millis(25));
    let purged = tokio::time::timeout(DEFAULT_TIMEOUT, async {
        loop {
            let feed = db.get_feed("old").await.unwrap();
            let pledge = db.get_pledge(1).await.unwrap();
            if feed.is_none() && pledge.is_none() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(25)).await;
        }
    })
    .await;
    handle.abort();

    assert!(purged.is_ok());
    assert!(db.get_feed("fresh").await.unwrap().is_some());
}
