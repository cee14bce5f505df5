//! Vimeo REST API client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{classify, Header, Picture, SourceType, Video, VideoPage, VideoPlatform};
use crate::config::VimeoConfig;
use crate::{Result, VidfeedError};

/// API version pinned through the Accept header.
const ACCEPT_VERSION: &str = "application/vnd.vimeo.*+json;version=3.4";

/// User agent string for API requests.
const USER_AGENT: &str = "vidfeed/0.1 (feed builder)";

/// Characters of an error response body kept for diagnostics.
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Deserialize)]
struct PictureSize {
    width: u32,
    height: u32,
    link: String,
}

#[derive(Debug, Default, Deserialize)]
struct Pictures {
    #[serde(default)]
    sizes: Vec<PictureSize>,
}

impl Pictures {
    fn into_pictures(pictures: Option<Pictures>) -> Vec<Picture> {
        pictures
            .unwrap_or_default()
            .sizes
            .into_iter()
            .map(|s| Picture {
                width: s.width,
                height: s.height,
                link: s.link,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct Owner {
    #[serde(default)]
    name: String,
}

/// Channel, group or user resource. Only the fields we read.
#[derive(Debug, Deserialize)]
struct Resource {
    name: String,
    link: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    created_time: DateTime<Utc>,
    #[serde(default)]
    pictures: Option<Pictures>,
    #[serde(default)]
    user: Option<Owner>,
}

impl Resource {
    fn into_header(self, source: SourceType) -> Header {
        let (description, author) = match source {
            SourceType::User => (self.bio.unwrap_or_default(), self.name.clone()),
            SourceType::Channel | SourceType::Group => (
                self.description.unwrap_or_default(),
                self.user.map(|u| u.name).unwrap_or_default(),
            ),
        };

        Header {
            name: self.name,
            link: self.link,
            description,
            pictures: Pictures::into_pictures(self.pictures),
            author,
            created_time: self.created_time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VimeoVideo {
    uri: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    link: String,
    #[serde(default)]
    duration: i64,
    #[serde(default)]
    width: i64,
    #[serde(default)]
    height: i64,
    created_time: DateTime<Utc>,
    #[serde(default)]
    pictures: Option<Pictures>,
}

impl From<VimeoVideo> for Video {
    fn from(v: VimeoVideo) -> Self {
        Video {
            id: video_id(&v.uri).to_string(),
            name: v.name,
            description: v.description.unwrap_or_default(),
            link: v.link,
            duration: v.duration,
            width: v.width,
            height: v.height,
            created_time: v.created_time,
            pictures: Pictures::into_pictures(v.pictures),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Paging {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoList {
    #[serde(default)]
    paging: Paging,
    #[serde(default)]
    data: Vec<VimeoVideo>,
}

/// Numeric video id from an API uri such as `/videos/12345`.
fn video_id(uri: &str) -> &str {
    uri.trim_end_matches('/').rsplit('/').next().unwrap_or(uri)
}

fn collection(source: SourceType) -> &'static str {
    match source {
        SourceType::Channel => "channels",
        SourceType::Group => "groups",
        SourceType::User => "users",
    }
}

/// Vimeo API client.
///
/// Cheap to share: the underlying `reqwest::Client` pools connections and
/// is safe to use from concurrent builds.
#[derive(Debug, Clone)]
pub struct VimeoClient {
    client: Client,
    base_url: String,
}

impl VimeoClient {
    /// Create a client from configuration.
    pub fn new(config: &VimeoConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VERSION));
        if !config.token.is_empty() {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", config.token))
                .map_err(|e| VidfeedError::Config(format!("invalid vimeo token: {}", e)))?;
            headers.insert(AUTHORIZATION, bearer);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| VidfeedError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, u32)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| classify(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            let body = response.text().await.unwrap_or_default();
            let body: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
            let message = if body.is_empty() {
                format!("{}: {}", path, reason)
            } else {
                format!("{}: {}: {}", path, reason, body)
            };
            return Err(classify(Some(status.as_u16()), message));
        }

        // Decode failures carry no upstream status.
        response.json::<T>().await.map_err(|e| VidfeedError::Transient {
            status: None,
            message: format!("invalid response from {}: {}", path, e),
        })
    }
}

#[async_trait]
impl VideoPlatform for VimeoClient {
    async fn query_metadata(&self, source: SourceType, id: &str) -> Result<Header> {
        let path = format!("/{}/{}", collection(source), id);
        let resource: Resource = self.get_json(&path, &[]).await?;
        Ok(resource.into_header(source))
    }

    async fn list_videos(
        &self,
        source: SourceType,
        id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<VideoPage> {
        let path = format!("/{}/{}/videos", collection(source), id);
        let list: VideoList = self
            .get_json(&path, &[("page", page), ("per_page", per_page)])
            .await?;

        Ok(VideoPage {
            videos: list.data.into_iter().map(Video::from).collect(),
            next_page: list.paging.next.filter(|n| !n.is_empty()),
        })
    }
}
