//! Feed types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Quality;
use crate::platform::SourceType;

/// Approximate bytes per (second × pixel) of a video.
pub const SIZE_FACTOR: f64 = 0.38848958333;

/// A source rendered as a podcast feed.
#[derive(Debug, Clone)]
pub struct Feed {
    /// Feed ID (store primary key).
    pub id: String,
    /// Platform identifier of the source.
    pub item_id: String,
    /// Kind of source.
    pub source_type: SourceType,
    pub title: String,
    /// Source page link.
    pub item_url: String,
    pub description: String,
    pub cover_art: String,
    pub author: String,
    /// When the source was created on the platform.
    pub pub_date: DateTime<Utc>,
    /// When this feed was assembled.
    pub updated_at: DateTime<Utc>,
    /// Quality tier the feed was assembled with.
    pub quality: Quality,
    /// Episodes in platform listing order.
    pub episodes: Vec<Item>,
}

/// A single episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Duration in seconds.
    pub duration: i64,
    /// Approximate size in bytes.
    pub size: i64,
    pub pub_date: DateTime<Utc>,
    pub thumbnail: String,
    pub video_url: String,
}

/// Approximate file size of a video in bytes.
///
/// The per-second rate is rounded once so the size stays exactly linear in
/// duration for fixed dimensions. Never exact.
pub fn video_size(duration: i64, width: i64, height: i64) -> i64 {
    let per_second = ((width * height) as f64 * SIZE_FACTOR).round() as i64;
    duration * per_second
}
