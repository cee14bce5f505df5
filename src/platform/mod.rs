//! Video platform access.
//!
//! `VideoPlatform` is the capability the feed builder consumes: header
//! metadata for a channel, group or user, and paginated video listings.

pub mod vimeo;

pub use vimeo::VimeoClient;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::Quality;
use crate::{Result, VidfeedError};

/// Number of videos requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Kind of source a feed is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Channel,
    Group,
    User,
}

impl SourceType {
    /// Convert to string for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Channel => "channel",
            SourceType::Group => "group",
            SourceType::User => "user",
        }
    }

    /// Parse from database string.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "channel" => Some(SourceType::Channel),
            "group" => Some(SourceType::Group),
            "user" => Some(SourceType::User),
            _ => None,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendition of a picture, ordered smallest first by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub width: u32,
    pub height: u32,
    pub link: String,
}

/// Source header metadata.
#[derive(Debug, Clone)]
pub struct Header {
    pub name: String,
    pub link: String,
    pub description: String,
    pub pictures: Vec<Picture>,
    pub author: String,
    pub created_time: DateTime<Utc>,
}

/// A video as listed by the platform.
#[derive(Debug, Clone)]
pub struct Video {
    pub id: String,
    pub name: String,
    pub description: String,
    pub link: String,
    /// Duration in seconds.
    pub duration: i64,
    pub width: i64,
    pub height: i64,
    pub created_time: DateTime<Utc>,
    pub pictures: Vec<Picture>,
}

/// One page of a video listing.
#[derive(Debug, Clone, Default)]
pub struct VideoPage {
    pub videos: Vec<Video>,
    /// Token of the next page, `None` on the last page.
    pub next_page: Option<String>,
}

impl VideoPage {
    /// Returns true if the platform reported another page.
    pub fn has_next(&self) -> bool {
        self.next_page.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// Video platform query capability.
///
/// Implementations must tolerate concurrent use from independent builds.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Fetch header metadata for a channel, group or user.
    async fn query_metadata(&self, source: SourceType, id: &str) -> Result<Header>;

    /// Fetch one page (1-based) of the source's videos.
    async fn list_videos(
        &self,
        source: SourceType,
        id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<VideoPage>;
}

/// Map an upstream failure to an error kind.
///
/// A 404 means the resource is missing; every other failure, with or
/// without a response, is transient.
pub fn classify(status: Option<u16>, message: impl Into<String>) -> VidfeedError {
    match status {
        Some(404) => VidfeedError::NotFound(message.into()),
        status => VidfeedError::Transient {
            status,
            message: message.into(),
        },
    }
}

/// Pick the picture link matching the quality tier.
pub fn select_image(pictures: &[Picture], quality: Quality) -> String {
    let picture = match quality {
        Quality::Low => pictures.first(),
        _ => pictures.last(),
    };
    picture.map(|p| p.link.clone()).unwrap_or_default()
}
