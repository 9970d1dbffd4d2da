use crate::llm::LLMProvider;

/// Result type for assistant operations
pub type Result<T> = std::result::Result<T, SeoError>;

/// Error types for assistant operations
#[derive(thiserror::Error, Debug)]
pub enum SeoError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Suggestion fetch failed for '{query}': {reason}")]
    SuggestionFetch { query: String, reason: String },

    #[error("Could not list transcripts for {video_id}: {reason}")]
    TranscriptList { video_id: String, reason: String },

    #[error("Transcript track fetch failed: {0}")]
    TranscriptFetch(String),

    #[error("No transcript available for {video_id}")]
    NoTranscriptAvailable { video_id: String },

    #[error("Unauthorized access to {provider:?} API, check the API key")]
    GenerationAuth { provider: LLMProvider },

    #[error("Generation request failed: {0}")]
    GenerationRequest(String),

    #[error("Video fetch failed: {0}")]
    VideoFetch(String),

    #[error("Keyword volume lookup failed: {0}")]
    KeywordVolume(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SeoError {
    /// Whether the error should abort a whole batch rather than a single item
    pub fn is_fatal_for_batch(&self) -> bool {
        matches!(
            self,
            SeoError::GenerationAuth { .. } | SeoError::Configuration(_)
        )
    }
}
