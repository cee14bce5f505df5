//! Feed assembly.
//!
//! `FeedBuilder` turns a feed configuration into a `Feed`: it classifies the
//! link, queries the source header and then pages through the source's
//! videos until the configured page size is reached.

pub mod types;

pub use types::{video_size, Feed, Item, SIZE_FACTOR};

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::FeedConfig;
use crate::link::{self, LinkType, Provider};
use crate::platform::{
    select_image, Header, SourceType, VideoPage, VideoPlatform, DEFAULT_PAGE_SIZE,
};
use crate::{Result, VidfeedError};

/// Builds feeds from a video platform.
///
/// Holds no per-build state; one builder can serve concurrent builds.
#[derive(Clone)]
pub struct FeedBuilder {
    platform: Arc<dyn VideoPlatform>,
}

impl FeedBuilder {
    /// Create a builder on top of a platform client.
    pub fn new(platform: Arc<dyn VideoPlatform>) -> Self {
        Self { platform }
    }

    /// Build a feed.
    ///
    /// Either the whole feed is returned or a single error; a failure on any
    /// page discards everything assembled so far.
    pub async fn build(&self, cfg: &FeedConfig) -> Result<Feed> {
        let info = link::parse(&cfg.url)?;
        if info.provider != Provider::Vimeo {
            return Err(VidfeedError::Unsupported(format!(
                "{:?} links are not supported: {}",
                info.provider, cfg.url
            )));
        }
        let source = match info.link_type {
            LinkType::Channel => SourceType::Channel,
            LinkType::Group => SourceType::Group,
            LinkType::User => SourceType::User,
            LinkType::Playlist => {
                return Err(VidfeedError::Unsupported(format!(
                    "unsupported feed type: {}",
                    cfg.url
                )))
            }
        };

        let header = self.query_header(source, &info.item_id).await?;

        let mut feed = Feed {
            id: cfg.id.clone(),
            item_id: info.item_id,
            source_type: source,
            cover_art: select_image(&header.pictures, cfg.quality),
            title: header.name,
            item_url: header.link,
            description: header.description,
            author: header.author,
            pub_date: header.created_time,
            updated_at: Utc::now(),
            quality: cfg.quality,
            episodes: Vec::new(),
        };

        self.query_videos(&mut feed, cfg.page_size).await?;

        info!(
            "Built feed {} from {} {:?} with {} episode(s)",
            feed.id,
            feed.source_type,
            feed.item_id,
            feed.episodes.len()
        );
        Ok(feed)
    }

    async fn query_header(&self, source: SourceType, id: &str) -> Result<Header> {
        self.platform
            .query_metadata(source, id)
            .await
            .map_err(|e| match e {
                VidfeedError::NotFound(_) => {
                    VidfeedError::NotFound(format!("{} {:?}", source, id))
                }
                other => other.context(format!("failed to query {} with id {:?}", source, id)),
            })
    }

    /// Page through videos until `page_size` episodes are collected or the
    /// listing ends.
    ///
    /// The limit is only checked between pages, so the last page is always
    /// taken whole and at least one page is always fetched.
    async fn query_videos(&self, feed: &mut Feed, page_size: usize) -> Result<()> {
        let mut page = 1;

        loop {
            let listing = self.fetch_page(feed, page).await?;
            let has_next = listing.has_next();
            debug!(
                "Feed {}: page {} returned {} video(s)",
                feed.id,
                page,
                listing.videos.len()
            );

            append_episodes(feed, listing);

            if feed.episodes.len() >= page_size || !has_next {
                return Ok(());
            }
            page += 1;
        }
    }

    async fn fetch_page(&self, feed: &Feed, page: u32) -> Result<VideoPage> {
        self.platform
            .list_videos(feed.source_type, &feed.item_id, page, DEFAULT_PAGE_SIZE)
            .await
            .map_err(|e| {
                let e = match e {
                    // A source that vanishes mid-listing is not a missing source.
                    VidfeedError::NotFound(what) => VidfeedError::Transient {
                        status: Some(404),
                        message: format!("{} not found", what),
                    },
                    other => other,
                };
                e.context(format!("failed to query videos (page {})", page))
            })
    }
}

fn append_episodes(feed: &mut Feed, listing: VideoPage) {
    let quality = feed.quality;
    feed.episodes
        .extend(listing.videos.into_iter().map(|video| Item {
            size: video_size(video.duration, video.width, video.height),
            thumbnail: select_image(&video.pictures, quality),
            id: video.id,
            title: video.name,
            description: video.description,
            duration: video.duration,
            pub_date: video.created_time,
            video_url: video.link,
        }));
}
