//! Store schema and migrations.
//!
//! The constants below describe the store layout: collection names, primary
//! keys, the user index and the TTL attribute of each collection. The
//! migrations create exactly that layout and are applied once, in order,
//! when the database is opened.

/// Type of a primary key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    String,
    Number,
}

/// Description of one collection.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub key_type: KeyType,
    /// Attribute holding the unix time after which the row may be purged.
    pub ttl_attribute: Option<&'static str>,
}

/// Description of a secondary index.
#[derive(Debug, Clone, Copy)]
pub struct IndexSchema {
    pub name: &'static str,
    pub table: &'static str,
    /// Equality key.
    pub hash_key: &'static str,
    /// Ordering key.
    pub range_key: &'static str,
}

/// Feed collection.
pub const FEEDS: TableSchema = TableSchema {
    name: "feeds",
    primary_key: "id",
    key_type: KeyType::String,
    ttl_attribute: Some("expiration_time"),
};

/// Pledge collection.
pub const PLEDGES: TableSchema = TableSchema {
    name: "pledges",
    primary_key: "id",
    key_type: KeyType::Number,
    ttl_attribute: Some("expires_at"),
};

/// Feeds of a user ordered by creation time.
///
/// Also covers the feed id, so listing never reads the feed rows.
pub const FEED_USER_INDEX: IndexSchema = IndexSchema {
    name: "idx_feeds_user_created",
    table: "feeds",
    hash_key: "user_id",
    range_key: "created_at",
};

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: feeds with the user index and expiry index
    r#"
CREATE TABLE feeds (
    id              TEXT PRIMARY KEY NOT NULL,
    user_id         TEXT NOT NULL,
    created_at      INTEGER NOT NULL,       -- unix seconds
    expiration_time INTEGER NOT NULL,       -- unix seconds, TTL attribute
    item_id         TEXT NOT NULL,
    source_type     TEXT NOT NULL,          -- 'channel', 'group', 'user'
    title           TEXT NOT NULL DEFAULT '',
    item_url        TEXT NOT NULL DEFAULT '',
    description     TEXT NOT NULL DEFAULT '',
    cover_art       TEXT NOT NULL DEFAULT '',
    author          TEXT NOT NULL DEFAULT '',
    pub_date        TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    quality         TEXT NOT NULL,          -- 'low', 'high'
    episodes        TEXT NOT NULL DEFAULT '[]'  -- JSON array
);

CREATE INDEX idx_feeds_user_created ON feeds(user_id, created_at, id);
CREATE INDEX idx_feeds_expiration_time ON feeds(expiration_time);
"#,
    // v2: pledges
    r#"
CREATE TABLE pledges (
    id          INTEGER PRIMARY KEY NOT NULL,
    user_id     TEXT NOT NULL,
    expires_at  INTEGER,                    -- unix seconds, NULL = open ended
    tier        INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX idx_pledges_user_id ON pledges(user_id);
CREATE INDEX idx_pledges_expires_at ON pledges(expires_at);
"#,
];
