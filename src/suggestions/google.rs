/// YouTube autocomplete client backed by the public suggest endpoint
use super::SuggestionSource;
use crate::config::SuggestionConfig;
use crate::error::{Result, SeoError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct GoogleSuggestClient {
    client: Client,
    endpoint: String,
}

impl GoogleSuggestClient {
    pub fn new(config: &SuggestionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl SuggestionSource for GoogleSuggestClient {
    async fn fetch_suggestions(&self, query: &str, language: &str) -> Result<Vec<String>> {
        let fetch_error = |reason: String| SeoError::SuggestionFetch {
            query: query.to_string(),
            reason,
        };

        debug!("Fetching suggestions for '{}' ({})", query, language);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("client", "firefox"), ("ds", "yt"), ("hl", language), ("q", query)])
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }

        let body = response.text().await.map_err(|e| fetch_error(e.to_string()))?;
        parse_suggest_response(&body).map_err(fetch_error)
    }
}

/// Extract the suggestion list from a `[query, [suggestions...], ...]` body
pub fn parse_suggest_response(body: &str) -> std::result::Result<Vec<String>, String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| format!("malformed body: {}", e))?;

    let suggestions = value
        .get(1)
        .and_then(|v| v.as_array())
        .ok_or_else(|| "missing suggestion list".to_string())?;

    Ok(suggestions
        .iter()
        .filter_map(|s| s.as_str())
        .map(|s| s.to_string())
        .collect())
}
