/// Keyword search volume lookups (Keywords Everywhere)
use crate::config::KeywordVolumeConfig;
use crate::error::{Result, SeoError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Cost per click
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Cpc {
    #[serde(default)]
    pub currency: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub value: f64,
}

/// Volume row for one keyword
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct KeywordVolume {
    pub keyword: String,
    #[serde(default, deserialize_with = "integer_or_string")]
    pub vol: u64,
    #[serde(default)]
    pub cpc: Cpc,
    #[serde(default, deserialize_with = "number_or_string")]
    pub competition: f64,
}

#[derive(Debug, Deserialize)]
struct VolumeResponse {
    #[serde(default)]
    data: Vec<KeywordVolume>,
}

fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn integer_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Search volume service
#[async_trait]
pub trait KeywordVolumeSource: Send + Sync {
    async fn keyword_volumes(&self, keywords: &[String]) -> Result<Vec<KeywordVolume>>;
}

#[derive(Clone)]
pub struct KeywordsEverywhereClient {
    client: Client,
    config: KeywordVolumeConfig,
    api_key: String,
}

impl KeywordsEverywhereClient {
    pub fn new(config: &KeywordVolumeConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                SeoError::Configuration("Keywords Everywhere API key is required".to_string())
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    /// Form fields of a lookup; `kw[]` repeats once per keyword
    pub fn form_fields<'a>(&'a self, keywords: &'a [String]) -> Vec<(&'a str, &'a str)> {
        build_form(&self.config, keywords)
    }
}

pub(crate) fn build_form<'a>(config: &'a KeywordVolumeConfig, keywords: &'a [String]) -> Vec<(&'a str, &'a str)> {
    let mut form = vec![
        ("country", config.country.as_str()),
        ("currency", config.currency.as_str()),
        ("dataSource", config.data_source.as_str()),
    ];
    form.extend(keywords.iter().map(|kw| ("kw[]", kw.as_str())));
    form
}

#[async_trait]
impl KeywordVolumeSource for KeywordsEverywhereClient {
    async fn keyword_volumes(&self, keywords: &[String]) -> Result<Vec<KeywordVolume>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Requesting volumes for {} keywords", keywords.len());

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Accept", "application/json")
            .bearer_auth(&self.api_key)
            .form(&self.form_fields(keywords))
            .send()
            .await
            .map_err(|e| SeoError::KeywordVolume(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(SeoError::KeywordVolume(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SeoError::KeywordVolume(e.to_string()))?;
        let volumes = parse_volume_response(&body)?;

        info!("📈 Received volumes for {} keywords", volumes.len());
        Ok(volumes)
    }
}

pub fn parse_volume_response(body: &str) -> Result<Vec<KeywordVolume>> {
    let response: VolumeResponse = serde_json::from_str(body)
        .map_err(|e| SeoError::KeywordVolume(format!("malformed response: {}", e)))?;
    Ok(response.data)
}
