//! Link classification.
//!
//! Turns a user supplied page URL into a provider, a link type and the
//! identifier the platform API expects.

use url::Url;

use crate::{Result, VidfeedError};

/// Video hosting provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Vimeo,
    YouTube,
}

/// Kind of page a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Channel,
    Group,
    User,
    Playlist,
}

/// Result of classifying a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub provider: Provider,
    pub link_type: LinkType,
    pub item_id: String,
}

/// Classify a link.
///
/// Fails with `Unsupported` for anything that is not a recognizable
/// Vimeo or YouTube page.
pub fn parse(link: &str) -> Result<LinkInfo> {
    let link = link.trim();
    let with_scheme = if link.contains("://") {
        link.to_string()
    } else {
        format!("https://{}", link)
    };

    let parsed = Url::parse(&with_scheme)
        .map_err(|e| VidfeedError::Unsupported(format!("invalid link {:?}: {}", link, e)))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| VidfeedError::Unsupported(format!("link {:?} has no host", link)))?
        .to_lowercase();

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    match host.trim_start_matches("www.") {
        "vimeo.com" => parse_vimeo(link, &segments),
        "youtube.com" | "m.youtube.com" => parse_youtube(link, &parsed, &segments),
        _ => Err(VidfeedError::Unsupported(format!(
            "link {:?} is not a supported video platform",
            link
        ))),
    }
}

fn parse_vimeo(link: &str, segments: &[&str]) -> Result<LinkInfo> {
    let (link_type, item_id) = match segments {
        ["channels", id, ..] => (LinkType::Channel, *id),
        ["groups", id, ..] => (LinkType::Group, *id),
        [user, ..] if !is_reserved_vimeo_path(user) => (LinkType::User, *user),
        _ => {
            return Err(VidfeedError::Unsupported(format!(
                "unrecognized vimeo link {:?}",
                link
            )))
        }
    };

    Ok(LinkInfo {
        provider: Provider::Vimeo,
        link_type,
        item_id: item_id.to_string(),
    })
}

/// Top level vimeo paths that are not user pages.
fn is_reserved_vimeo_path(segment: &str) -> bool {
    matches!(segment, "channels" | "groups" | "album" | "showcase" | "ondemand")
        || segment.chars().all(|c| c.is_ascii_digit())
}

fn parse_youtube(link: &str, parsed: &Url, segments: &[&str]) -> Result<LinkInfo> {
    let (link_type, item_id) = match segments {
        ["playlist"] => {
            let id = parsed
                .query_pairs()
                .find(|(k, _)| k == "list")
                .map(|(_, v)| v.into_owned());
            match id {
                Some(id) if !id.is_empty() => (LinkType::Playlist, id),
                _ => {
                    return Err(VidfeedError::Unsupported(format!(
                        "playlist link {:?} has no list id",
                        link
                    )))
                }
            }
        }
        ["channel", id, ..] => (LinkType::Channel, id.to_string()),
        ["user", id, ..] => (LinkType::User, id.to_string()),
        _ => {
            return Err(VidfeedError::Unsupported(format!(
                "unrecognized youtube link {:?}",
                link
            )))
        }
    };

    Ok(LinkInfo {
        provider: Provider::YouTube,
        link_type,
        item_id,
    })
}
