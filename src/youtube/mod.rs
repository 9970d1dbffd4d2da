/// YouTube Data API v3 client
pub mod categories;

pub use categories::CategoryTable;

use crate::config::YouTubeConfig;
use crate::error::{Result, SeoError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_CATEGORY_ID: &str = "N/A";

/// Metadata of one video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub views: u64,
    pub comments: u64,
    /// ISO-8601 duration as returned by the API, e.g. `PT12M5S`
    pub duration: String,
    pub published_at: Option<DateTime<Utc>>,
    pub channel_title: String,
    pub category_id: String,
    pub url: String,
}

impl VideoDetails {
    pub fn duration_seconds(&self) -> Option<u64> {
        parse_iso8601_duration(&self.duration)
    }
}

/// Video search and metadata service
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Ids of the top videos for a keyword, in ranking order
    async fn search(&self, keyword: &str, language: &str, max_results: usize) -> Result<Vec<String>>;

    async fn video_details(&self, video_id: &str) -> Result<VideoDetails>;
}

#[derive(Clone)]
pub struct YouTubeDataClient {
    client: Client,
    api_key: String,
    api_base_url: String,
    watch_base_url: String,
}

impl YouTubeDataClient {
    pub fn new(config: &YouTubeConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SeoError::Configuration("YouTube API key is required".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            watch_base_url: config.watch_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url> {
        let base = format!("{}/{}", self.api_base_url, resource);
        let mut all: Vec<(&str, &str)> = params.to_vec();
        all.push(("key", self.api_key.as_str()));
        Url::parse_with_params(&base, &all)
            .map_err(|e| SeoError::Configuration(format!("invalid YouTube API URL: {}", e)))
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SeoError::VideoFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SeoError::VideoFetch(format!("HTTP {}: {}", status, body)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SeoError::VideoFetch(e.to_string()))
    }
}

#[async_trait]
impl VideoSource for YouTubeDataClient {
    async fn search(&self, keyword: &str, language: &str, max_results: usize) -> Result<Vec<String>> {
        let max_results = max_results.to_string();
        let url = self.endpoint(
            "search",
            &[
                ("part", "snippet"),
                ("q", keyword),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
                ("relevanceLanguage", language),
            ],
        )?;

        debug!("Searching videos for '{}' ({})", keyword, language);
        let body = self.get_json(url).await?;
        let ids = parse_search_response(&body);
        info!("🔎 Found {} videos for '{}'", ids.len(), keyword);
        Ok(ids)
    }

    async fn video_details(&self, video_id: &str) -> Result<VideoDetails> {
        let url = self.endpoint(
            "videos",
            &[("part", "snippet,contentDetails,statistics"), ("id", video_id)],
        )?;

        let body = self.get_json(url).await?;
        parse_video_response(&body, video_id, &self.watch_base_url)
    }
}

/// Video ids of a `search` response, in order
pub fn parse_search_response(body: &Value) -> Vec<String> {
    body.get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.pointer("/id/videoId").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Details from a `videos` response
pub fn parse_video_response(body: &Value, video_id: &str, watch_base_url: &str) -> Result<VideoDetails> {
    let item = body
        .get("items")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .ok_or_else(|| SeoError::VideoFetch(format!("video {} not found", video_id)))?;

    let snippet = item.get("snippet").cloned().unwrap_or(Value::Null);
    let statistics = item.get("statistics").cloned().unwrap_or(Value::Null);
    let text = |value: &Value, key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let published_at = snippet
        .get("publishedAt")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Ok(VideoDetails {
        video_id: video_id.to_string(),
        title: text(&snippet, "title"),
        description: text(&snippet, "description"),
        views: count(&statistics, "viewCount"),
        comments: count(&statistics, "commentCount"),
        duration: item
            .pointer("/contentDetails/duration")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        published_at,
        channel_title: text(&snippet, "channelTitle"),
        category_id: snippet
            .get("categoryId")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_CATEGORY_ID)
            .to_string(),
        url: watch_url(watch_base_url, video_id),
    })
}

/// Statistics are string-encoded counters
fn count(statistics: &Value, key: &str) -> u64 {
    match statistics.get(key) {
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}

pub fn watch_url(watch_base_url: &str, video_id: &str) -> String {
    format!("{}/watch?v={}", watch_base_url.trim_end_matches('/'), video_id)
}

/// Video id from a watch, short or shorts URL, or a bare 11-character id
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    let bare = Regex::new(r"^[A-Za-z0-9_-]{11}$").ok()?;
    if bare.is_match(input) {
        return Some(input.to_string());
    }

    // Pasted links often lack a scheme
    let url = Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{}", input)))
        .ok()?;
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    let candidate = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" => {
            let mut segments = url.path_segments()?;
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                Some("shorts") | Some("embed") | Some("live") => segments.next().map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    }?;

    bare.is_match(&candidate).then_some(candidate)
}

/// Seconds in an ISO-8601 duration such as `PT1H2M3S` or `P1DT5M`
pub fn parse_iso8601_duration(duration: &str) -> Option<u64> {
    let re = Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").ok()?;
    let caps = re.captures(duration.trim())?;
    if caps.iter().skip(1).all(|c| c.is_none()) {
        return None;
    }

    let part = |index: usize| -> u64 {
        caps.get(index)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    part(1)
        .checked_mul(86_400)?
        .checked_add(part(2).checked_mul(3_600)?)?
        .checked_add(part(3).checked_mul(60)?)?
        .checked_add(part(4))
}
