//! Configuration module for vidfeed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::{Result, VidfeedError};

/// Feed quality tier.
///
/// Selects cover art and thumbnails: `Low` takes the smallest picture,
/// `High` the largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    #[default]
    High,
}

impl Quality {
    /// Convert to string for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Low => "low",
            Quality::High => "high",
        }
    }
}

impl FromStr for Quality {
    type Err = VidfeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Quality::Low),
            "high" => Ok(Quality::High),
            other => Err(VidfeedError::Config(format!("unknown quality: {}", other))),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single feed to build.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Feed identifier, used as the store primary key.
    pub id: String,
    /// Source link (channel, group or user page).
    pub url: String,
    /// Quality tier.
    #[serde(default)]
    pub quality: Quality,
    /// Maximum number of episodes to collect.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    50
}

impl FeedConfig {
    /// Create a feed config with default quality and page size.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            quality: Quality::default(),
            page_size: default_page_size(),
        }
    }

    /// Set the quality.
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Vimeo API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VimeoConfig {
    /// API base URL.
    #[serde(default = "default_vimeo_base_url")]
    pub base_url: String,
    /// Pre-issued OAuth access token.
    #[serde(default)]
    pub token: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
}

fn default_vimeo_base_url() -> String {
    "https://api.vimeo.com".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_total_timeout() -> u64 {
    30
}

impl Default for VimeoConfig {
    fn default() -> Self {
        Self {
            base_url: default_vimeo_base_url(),
            token: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            total_timeout_secs: default_total_timeout(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/vidfeed.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Store expiry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// How often expired records are purged, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Lifetime of a stored feed, in seconds.
    #[serde(default = "default_feed_ttl")]
    pub feed_ttl_secs: i64,
    /// Owner recorded on feeds written by the binary.
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_sweep_interval() -> u64 {
    600 // 10 minutes
}

fn default_feed_ttl() -> i64 {
    90 * 24 * 3600 // 90 days
}

fn default_user_id() -> String {
    "local".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            feed_ttl_secs: default_feed_ttl(),
            user_id: default_user_id(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/vidfeed.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Vimeo API configuration.
    #[serde(default)]
    pub vimeo: VimeoConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Store expiry configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Feeds to build.
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| VidfeedError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        for feed in &self.feeds {
            if feed.id.is_empty() {
                return Err(VidfeedError::Config(format!(
                    "feed with url {} has an empty id",
                    feed.url
                )));
            }
            if feed.page_size == 0 {
                return Err(VidfeedError::Config(format!(
                    "feed {}: page_size must be greater than 0",
                    feed.id
                )));
            }
        }
        if self.storage.sweep_interval_secs == 0 {
            return Err(VidfeedError::Config(
                "storage.sweep_interval_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
