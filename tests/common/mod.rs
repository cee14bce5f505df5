//! Test helpers for integration tests.
//!
//! Provides a fake Vimeo API server and feed fixtures.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use vidfeed::config::VimeoConfig;
use vidfeed::{Feed, Item, Quality, SourceType, VimeoClient};

/// Default timeout for test operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Videos the fake server lists for every channel.
pub const VIDEOS_PER_CHANNEL: u32 = 7;

fn pictures() -> Value {
    json!({
        "sizes": [
            {"width": 100, "height": 75, "link": "https://i.vimeocdn.com/small.jpg"},
            {"width": 640, "height": 360, "link": "https://i.vimeocdn.com/medium.jpg"},
            {"width": 1920, "height": 1080, "link": "https://i.vimeocdn.com/large.jpg"}
        ]
    })
}

async fn channel(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    match id.as_str() {
        "missing" => (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))),
        "throttled" => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": "slow down"})),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({
                "uri": format!("/channels/{}", id),
                "name": format!("Channel {}", id),
                "link": format!("https://vimeo.com/channels/{}", id),
                "description": "Curated shorts",
                "created_time": "2015-03-01T12:00:00+00:00",
                "pictures": pictures(),
                "user": {"name": "Curator"}
            })),
        ),
    }
}

/// Lists `VIDEOS_PER_CHANNEL` videos, honoring `page` and `per_page`.
async fn channel_videos(
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if id == "flaky" {
        return (
            StatusCode::BAD_GATEWAY,
            Json(json!({"error": "upstream"})),
        );
    }

    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let per_page: u32 = params
        .get("per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(25);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(VIDEOS_PER_CHANNEL);
    let data: Vec<Value> = (start..end)
        .map(|n| {
            json!({
                "uri": format!("/videos/{}", 500 + n),
                "name": format!("Episode {}", n + 1),
                "description": format!("Episode {} description", n + 1),
                "link": format!("https://vimeo.com/{}", 500 + n),
                "duration": 60 * (n as i64 + 1),
                "width": 640,
                "height": 360,
                "created_time": "2020-01-01T00:00:00+00:00",
                "pictures": pictures()
            })
        })
        .collect();

    let next = if end < VIDEOS_PER_CHANNEL {
        json!(format!(
            "/channels/{}/videos?page={}&per_page={}",
            id,
            page + 1,
            per_page
        ))
    } else {
        Value::Null
    };

    (
        StatusCode::OK,
        Json(json!({"paging": {"next": next}, "data": data})),
    )
}

/// Start a fake Vimeo API on an ephemeral port and return a client for it.
pub async fn spawn_fake_vimeo() -> VimeoClient {
    let app = Router::new()
        .route("/channels/:id", get(channel))
        .route("/channels/:id/videos", get(channel_videos));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = VimeoConfig {
        base_url: format!("http://{}", addr),
        token: String::new(),
        ..Default::default()
    };
    VimeoClient::new(&config).unwrap()
}

/// A small feed fixture with one episode.
pub fn sample_feed(id: &str) -> Feed {
    let published = Utc.with_ymd_and_hms(2021, 6, 1, 8, 30, 0).unwrap();
    Feed {
        id: id.to_string(),
        item_id: "staffpicks".to_string(),
        source_type: SourceType::Channel,
        title: "Staff Picks".to_string(),
        item_url: "https://vimeo.com/channels/staffpicks".to_string(),
        description: "The best of Vimeo".to_string(),
        cover_art: "https://i.vimeocdn.com/large.jpg".to_string(),
        author: "Vimeo Curation".to_string(),
        pub_date: published,
        updated_at: published,
        quality: Quality::High,
        episodes: vec![Item {
            id: "42".to_string(),
            title: "Pilot".to_string(),
            description: "First one".to_string(),
            duration: 300,
            size: vidfeed::video_size(300, 1280, 720),
            pub_date: published,
            thumbnail: "https://i.vimeocdn.com/t.jpg".to_string(),
            video_url: "https://vimeo.com/42".to_string(),
        }],
    }
}
