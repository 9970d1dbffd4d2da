/// YouTube caption client
///
/// Tracks are discovered through the player endpoint, whose API key is scraped
/// from the watch page. Entries come from the timedtext XML of each track.
use super::{TranscriptCatalog, TranscriptEntry, TranscriptService, TranscriptTrack};
use crate::config::YouTubeConfig;
use crate::error::{Result, SeoError};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

const ANDROID_CLIENT_VERSION: &str = "20.10.38";

#[derive(Clone)]
pub struct YouTubeTranscriptClient {
    client: Client,
    watch_base_url: String,
}

impl YouTubeTranscriptClient {
    pub fn new(config: &YouTubeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()?;

        Ok(Self {
            client,
            watch_base_url: config.watch_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn innertube_api_key(&self, video_id: &str) -> std::result::Result<String, String> {
        let html = self
            .client
            .get(format!("{}/watch", self.watch_base_url))
            .query(&[("v", video_id)])
            .header("Accept-Language", "en-US")
            .send()
            .await
            .map_err(|e| e.to_string())?
            .text()
            .await
            .map_err(|e| e.to_string())?;

        extract_innertube_api_key(&html).ok_or_else(|| "watch page has no player API key".to_string())
    }

    async fn player_response(&self, video_id: &str) -> std::result::Result<Value, String> {
        let api_key = self.innertube_api_key(video_id).await?;

        let body = json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": ANDROID_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = self
            .client
            .post(format!("{}/youtubei/v1/player", self.watch_base_url))
            .query(&[("key", api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("player endpoint returned HTTP {}", response.status()));
        }

        response.json::<Value>().await.map_err(|e| e.to_string())
    }

    async fn fetch_entries(&self, url: &str) -> Result<Vec<TranscriptEntry>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SeoError::TranscriptFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SeoError::TranscriptFetch(format!(
                "timedtext returned HTTP {}",
                response.status()
            )));
        }

        let xml = response
            .text()
            .await
            .map_err(|e| SeoError::TranscriptFetch(e.to_string()))?;

        let entries = parse_timedtext(&xml);
        if entries.is_empty() {
            return Err(SeoError::TranscriptFetch("track has no entries".to_string()));
        }
        Ok(entries)
    }
}

#[async_trait]
impl TranscriptService for YouTubeTranscriptClient {
    async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptCatalog> {
        debug!("Listing caption tracks for {}", video_id);

        let player = self
            .player_response(video_id)
            .await
            .map_err(|reason| SeoError::TranscriptList {
                video_id: video_id.to_string(),
                reason,
            })?;

        let catalog = parse_caption_catalog(video_id, &player)?;
        info!("🎞️ {} caption tracks listed for {}", catalog.tracks.len(), video_id);
        Ok(catalog)
    }

    async fn fetch_transcript(&self, track: &TranscriptTrack) -> Result<Vec<TranscriptEntry>> {
        if track.base_url.is_empty() {
            return Err(SeoError::TranscriptFetch(format!(
                "track {} has no URL",
                track.language_code
            )));
        }
        self.fetch_entries(&track.base_url).await
    }

    async fn translate_transcript(
        &self,
        track: &TranscriptTrack,
        target_language: &str,
    ) -> Result<Vec<TranscriptEntry>> {
        if !track.is_translatable {
            return Err(SeoError::TranscriptFetch(format!(
                "track {} is not translatable",
                track.language_code
            )));
        }
        if track.base_url.is_empty() {
            return Err(SeoError::TranscriptFetch(format!(
                "track {} has no URL",
                track.language_code
            )));
        }

        let url = format!(
            "{}&tlang={}",
            track.base_url,
            urlencoding::encode(target_language)
        );
        self.fetch_entries(&url).await
    }
}

/// Find `"INNERTUBE_API_KEY":"..."` in a watch page
pub fn extract_innertube_api_key(html: &str) -> Option<String> {
    let re = Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([A-Za-z0-9_\-]+)""#).ok()?;
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Build a catalog from a player response
pub fn parse_caption_catalog(video_id: &str, player: &Value) -> Result<TranscriptCatalog> {
    let list_error = |reason: String| SeoError::TranscriptList {
        video_id: video_id.to_string(),
        reason,
    };

    if let Some(status) = player.pointer("/playabilityStatus/status").and_then(Value::as_str) {
        if status != "OK" {
            let reason = player
                .pointer("/playabilityStatus/reason")
                .and_then(Value::as_str)
                .unwrap_or(status);
            return Err(list_error(format!("video unplayable: {}", reason)));
        }
    }

    let renderer = player
        .pointer("/captions/playerCaptionsTracklistRenderer")
        .ok_or_else(|| list_error("transcripts are disabled for this video".to_string()))?;

    let tracks = renderer
        .get("captionTracks")
        .and_then(Value::as_array)
        .map(|tracks| tracks.iter().filter_map(parse_caption_track).collect())
        .unwrap_or_default();

    let translation_languages = renderer
        .get("translationLanguages")
        .and_then(Value::as_array)
        .map(|langs| {
            langs
                .iter()
                .filter_map(|l| l.get("languageCode").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(TranscriptCatalog {
        video_id: video_id.to_string(),
        tracks,
        translation_languages,
    })
}

fn parse_caption_track(track: &Value) -> Option<TranscriptTrack> {
    let language_code = track.get("languageCode")?.as_str()?.to_string();
    let base_url = track
        .get("baseUrl")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .replace("&fmt=srv3", "");

    Some(TranscriptTrack {
        language_name: text_of(track.get("name")).unwrap_or_else(|| language_code.clone()),
        language_code,
        is_generated: track.get("kind").and_then(Value::as_str) == Some("asr"),
        is_translatable: track
            .get("isTranslatable")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        base_url,
    })
}

/// `simpleText` or concatenated `runs[].text`
fn text_of(value: Option<&Value>) -> Option<String> {
    let value = value?;
    if let Some(text) = value.get("simpleText").and_then(Value::as_str) {
        return Some(text.to_string());
    }
    let runs = value.get("runs")?.as_array()?;
    let text: String = runs
        .iter()
        .filter_map(|r| r.get("text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then_some(text)
}

/// Parse `<text start=".." dur="..">` entries from a timedtext document
pub fn parse_timedtext(xml: &str) -> Vec<TranscriptEntry> {
    let document = Html::parse_fragment(xml);
    let selector = match Selector::parse("text") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let start = element.value().attr("start")?.parse::<f64>().ok()?;
            let duration = element
                .value()
                .attr("dur")
                .and_then(|d| d.parse::<f64>().ok())
                .unwrap_or(0.0);
            let raw: String = element.text().collect();
            let text = clean_caption_text(&raw);
            (!text.is_empty()).then_some(TranscriptEntry { text, start, duration })
        })
        .collect()
}

/// Caption text arrives escaped twice; the parser removes one layer
fn clean_caption_text(raw: &str) -> String {
    let unescaped = unescape_entities(raw);
    let without_tags = match Regex::new(r"<[^>]*>") {
        Ok(re) => re.replace_all(&unescaped, "").into_owned(),
        Err(_) => unescaped,
    };
    without_tags.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn unescape_entities(text: &str) -> String {
    let numeric = match Regex::new(r"&#(x?)([0-9a-fA-F]+);") {
        Ok(re) => re
            .replace_all(text, |caps: &regex::Captures| {
                let radix = if &caps[1] == "x" { 16 } else { 10 };
                u32::from_str_radix(&caps[2], radix)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned(),
        Err(_) => text.to_string(),
    };

    numeric
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
