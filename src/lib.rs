//! vidfeed - video platform to podcast feed builder.
//!
//! Turns a Vimeo channel, group or user into a podcast-style feed and keeps
//! the resulting feeds, together with patron pledges, in a SQLite store with
//! a per-user index and record expiry.

pub mod builder;
pub mod config;
pub mod error;
pub mod link;
pub mod logging;
pub mod platform;
pub mod storage;

pub use builder::{video_size, Feed, FeedBuilder, Item};
pub use config::{Config, FeedConfig, Quality};
pub use error::{Result, VidfeedError};
pub use link::{LinkInfo, LinkType, Provider};
pub use platform::{Header, SourceType, Video, VideoPage, VideoPlatform, VimeoClient};
pub use storage::{
    start_ttl_sweeper, Database, FeedRecord, FeedRepository, Pledge, PledgeRepository, PurgeStats,
    Store, TtlSweeper,
};
