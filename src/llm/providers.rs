use super::{status_error, ChatMessage, LLMConfig, LLMProvider, LLMResponse, LLM};
use crate::error::{Result, SeoError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Request body shared by OpenAI-compatible chat endpoints
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
    usage: Option<ChatCompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionUsage {
    total_tokens: u32,
}

fn build_client(config: &LLMConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()?)
}

fn request_error(provider: &LLMProvider, e: reqwest::Error) -> SeoError {
    SeoError::GenerationRequest(format!("{:?} request failed: {}", provider, e))
}

/// Parse the body of an OpenAI-compatible chat completion
pub(crate) fn parse_chat_completion(provider: &LLMProvider, body: &str) -> Result<LLMResponse> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        SeoError::GenerationRequest(format!("Invalid {:?} response: {}", provider, e))
    })?;

    let content = parsed
        .choices
        .first()
        .ok_or_else(|| SeoError::GenerationRequest(format!("No response from {:?}", provider)))?
        .message
        .content
        .clone();

    Ok(LLMResponse {
        content,
        tokens_used: parsed.usage.map(|u| u.total_tokens),
    })
}

/// POST a chat completion and decode it, mapping failures to generation errors
async fn send_chat_completion(
    client: &reqwest::Client,
    config: &LLMConfig,
    url: &str,
    api_key: Option<&str>,
    messages: Vec<ChatMessage>,
) -> Result<LLMResponse> {
    let request = ChatCompletionRequest {
        model: config.model.clone(),
        messages,
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    };

    let mut builder = client.post(url).json(&request);
    if let Some(key) = api_key {
        builder = builder.header("Authorization", format!("Bearer {}", key));
    }

    let response = builder
        .send()
        .await
        .map_err(|e| request_error(&config.provider, e))?;

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(status_error(config.provider.clone(), status, &text));
    }

    parse_chat_completion(&config.provider, &text)
}

/// OpenAI provider implementation
pub struct OpenAIProvider {
    config: LLMConfig,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(SeoError::Configuration("OpenAI API key required".to_string()));
        }

        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> &str {
        self.config.endpoint.as_deref().unwrap_or(OPENAI_CHAT_URL)
    }
}

#[async_trait]
impl LLM for OpenAIProvider {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse> {
        debug!("Sending request to OpenAI API");
        send_chat_completion(
            &self.client,
            &self.config,
            self.endpoint(),
            self.config.api_key.as_deref(),
            messages,
        )
        .await
    }

    async fn is_available(&self) -> bool {
        let Some(api_key) = &self.config.api_key else {
            return false;
        };
        let models_url = self.endpoint().replace("/chat/completions", "/models");

        match self
            .client
            .get(&models_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::OpenAI
    }
}

/// LMStudio provider implementation
pub struct LMStudioProvider {
    config: LLMConfig,
    client: reqwest::Client,
}

impl LMStudioProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        if config.endpoint.is_none() {
            return Err(SeoError::Configuration("LMStudio endpoint not configured".to_string()));
        }

        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl LLM for LMStudioProvider {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .ok_or_else(|| SeoError::Configuration("LMStudio endpoint not configured".to_string()))?;

        debug!("Sending request to LMStudio at {}", endpoint);
        send_chat_completion(
            &self.client,
            &self.config,
            endpoint,
            self.config.api_key.as_deref(),
            messages,
        )
        .await
    }

    async fn is_available(&self) -> bool {
        let Some(endpoint) = &self.config.endpoint else {
            return false;
        };
        let health_endpoint = endpoint.replace("/v1/chat/completions", "/health");

        match self.client.get(&health_endpoint).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::LMStudio
    }
}

/// Gemini provider implementation
pub struct GeminiProvider {
    config: LLMConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "totalTokenCount")]
    total_token_count: u32,
}

impl GeminiProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(SeoError::Configuration("Gemini API key required".to_string()));
        }

        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    fn build_request(&self, messages: Vec<ChatMessage>) -> GeminiRequest {
        let (system, rest): (Vec<_>, Vec<_>) =
            messages.into_iter().partition(|m| m.role == "system");

        let system_instruction = if system.is_empty() {
            None
        } else {
            Some(GeminiContent {
                parts: system.into_iter().map(|m| GeminiPart { text: m.content }).collect(),
            })
        };

        GeminiRequest {
            system_instruction,
            contents: vec![GeminiContent {
                parts: rest.into_iter().map(|m| GeminiPart { text: m.content }).collect(),
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        }
    }
}

#[async_trait]
impl LLM for GeminiProvider {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| SeoError::Configuration("Gemini API key not configured".to_string()))?;

        let request = self.build_request(messages);
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.config.model, api_key
        );

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(&LLMProvider::Gemini, e))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(status_error(LLMProvider::Gemini, status, &text));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&text)
            .map_err(|e| SeoError::GenerationRequest(format!("Invalid Gemini response: {}", e)))?;

        let content = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| SeoError::GenerationRequest("No response from Gemini".to_string()))?;

        Ok(LLMResponse {
            content,
            tokens_used: gemini_response.usage_metadata.map(|u| u.total_token_count),
        })
    }

    async fn is_available(&self) -> bool {
        let Some(api_key) = &self.config.api_key else {
            return false;
        };
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models?key={}",
            api_key
        );

        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::Gemini
    }
}
