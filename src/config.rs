use crate::error::{Result, SeoError};
use crate::llm::{LLMConfig, LLMProvider};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the SEO assistant
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// YouTube Data API settings
    pub youtube: YouTubeConfig,

    /// Autocomplete and suggestion tree settings
    pub suggestions: SuggestionConfig,

    /// Transcript selection settings
    pub transcripts: TranscriptConfig,

    /// Text generation settings
    pub llm: LLMConfig,

    /// System prompt files
    pub prompts: PromptConfig,

    /// Keyword volume lookup settings
    pub keywords: KeywordVolumeConfig,

    /// Output and logging settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// API key for the YouTube Data API v3
    pub api_key: Option<String>,

    /// Base URL of the Data API
    pub api_base_url: String,

    /// Base URL of the watch pages (caption track discovery)
    pub watch_base_url: String,

    /// HTTP request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Language used when none is given on the command line
    pub default_language: String,

    /// Number of videos fetched when none is requested
    pub default_max_results: usize,

    /// Upper bound for the number of videos per search
    pub max_results_limit: usize,

    /// JSON file with `{"categories": [{"id", "name"}]}`; built-in table when unset
    pub categories_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Autocomplete endpoint
    pub endpoint: String,

    /// Fan-out used when none is requested
    pub default_fanout: usize,

    /// Upper bound applied to requested fan-out
    pub max_fanout: usize,

    /// Maximum number of child fetches in flight
    pub max_concurrent_requests: usize,

    /// Per-call timeout in seconds
    pub request_timeout_seconds: u64,

    /// Number of suggestions shown by the flat listing
    pub flat_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Preferred languages for which translation fallback is attempted
    pub translation_eligible_languages: Vec<String>,

    /// Words shown before the rendered transcript is truncated
    pub display_word_limit: usize,
}

/// Configuration for all LLM prompts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Base directory for prompt files
    pub prompt_dir: PathBuf,

    /// Title optimization prompt file
    pub title_file: String,

    /// Description optimization prompt file
    pub description_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordVolumeConfig {
    /// Keywords Everywhere API key
    pub api_key: Option<String>,

    /// Keyword data endpoint
    pub endpoint: String,

    /// Country used for volumes
    pub country: String,

    /// Currency used for CPC
    pub currency: String,

    /// Data source identifier
    pub data_source: String,

    /// HTTP request timeout in seconds
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Log level
    pub log_level: String,

    /// Format of command results
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            watch_base_url: "https://www.youtube.com".to_string(),
            request_timeout_seconds: 30,
            default_language: "fr".to_string(),
            default_max_results: 5,
            max_results_limit: 10,
            categories_file: None,
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://suggestqueries.google.com/complete/search".to_string(),
            default_fanout: 2,
            max_fanout: 10,
            max_concurrent_requests: num_cpus::get().clamp(1, 4),
            request_timeout_seconds: 10,
            flat_limit: 10,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            translation_eligible_languages: vec!["fr".to_string(), "en".to_string()],
            display_word_limit: 300,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            prompt_dir: PathBuf::from("config/prompts"),
            title_file: "title.txt".to_string(),
            description_file: "description.txt".to_string(),
        }
    }
}

impl Default for KeywordVolumeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.keywordseverywhere.com/v1/get_keyword_data".to_string(),
            country: "fr".to_string(),
            currency: "EUR".to_string(),
            data_source: "gkp".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: OutputFormat::Text,
        }
    }
}

impl PromptConfig {
    /// Load prompt content from a specific file
    pub async fn load_prompt(&self, filename: &str) -> Result<String> {
        let path = self.prompt_dir.join(filename);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content.trim().to_string()),
            Err(e) => Err(SeoError::Configuration(format!(
                "Failed to load prompt from {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Load title optimization prompt
    pub async fn load_title_prompt(&self) -> Result<String> {
        self.load_prompt(&self.title_file).await
    }

    /// Load description optimization prompt
    pub async fn load_description_prompt(&self) -> Result<String> {
        self.load_prompt(&self.description_file).await
    }
}

impl Config {
    /// Load configuration from the first config file found, then apply environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from_dir(std::path::Path::new("."))
    }

    /// Search `base` for a config file. A file that exists but does not parse is an error.
    pub fn load_from_dir(base: &std::path::Path) -> Result<Self> {
        let config_paths = ["seo-assistant.toml", "config/seo-assistant.toml"];

        for path in config_paths.iter().map(|p| base.join(p)) {
            if let Ok(config_str) = std::fs::read_to_string(&path) {
                let config = toml::from_str::<Config>(&config_str).map_err(|e| {
                    SeoError::Configuration(format!(
                        "Failed to parse config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                tracing::info!("📄 Loaded configuration from: {}", path.display());
                return Ok(config.with_env_overrides());
            }
        }

        Ok(Self::from_env())
    }

    /// Load configuration from an explicit file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config.with_env_overrides())
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Override secrets and log level from environment variables
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(api_key) = std::env::var("YOUTUBE_API_KEY") {
            self.youtube.api_key = Some(api_key);
        }

        let llm_key_var = match self.llm.provider {
            LLMProvider::OpenAI => Some("OPENAI_API_KEY"),
            LLMProvider::Gemini => Some("GEMINI_API_KEY"),
            LLMProvider::LMStudio => None,
        };
        if let Some(api_key) = llm_key_var.and_then(|var| std::env::var(var).ok()) {
            self.llm.api_key = Some(api_key);
        }

        if let Ok(api_key) = std::env::var("KEYWORDS_EVERYWHERE_API_KEY") {
            self.keywords.api_key = Some(api_key);
        }

        if let Ok(log_level) = std::env::var("SEO_ASSISTANT_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| SeoError::Configuration(format!("Cannot serialize config: {}", e)))?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.suggestions.max_fanout == 0 {
            return Err(SeoError::Configuration("max_fanout must be greater than 0".to_string()));
        }

        if self.suggestions.default_fanout == 0
            || self.suggestions.default_fanout > self.suggestions.max_fanout
        {
            return Err(SeoError::Configuration(
                "default_fanout must be between 1 and max_fanout".to_string(),
            ));
        }

        if self.suggestions.max_concurrent_requests == 0 {
            return Err(SeoError::Configuration(
                "max_concurrent_requests must be greater than 0".to_string(),
            ));
        }

        if self.youtube.max_results_limit == 0 {
            return Err(SeoError::Configuration(
                "max_results_limit must be greater than 0".to_string(),
            ));
        }

        if self
            .transcripts
            .translation_eligible_languages
            .iter()
            .any(|lang| lang.trim().is_empty())
        {
            return Err(SeoError::Configuration(
                "translation_eligible_languages must not contain empty codes".to_string(),
            ));
        }

        if self.llm.provider == LLMProvider::LMStudio && self.llm.endpoint.is_none() {
            return Err(SeoError::Configuration(
                "API endpoint required for LMStudio provider".to_string(),
            ));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// YouTube API key or a configuration error naming the variable to set
    pub fn require_youtube_api_key(&self) -> Result<&str> {
        self.youtube.api_key.as_deref().ok_or_else(|| {
            SeoError::Configuration("YouTube API key missing, set YOUTUBE_API_KEY".to_string())
        })
    }

    /// Requested fan-out bounded to `1..=max_fanout`
    pub fn clamp_fanout(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.suggestions.default_fanout)
            .clamp(1, self.suggestions.max_fanout.max(1))
    }

    /// Requested video count bounded to `1..=max_results_limit`
    pub fn clamp_max_results(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.youtube.default_max_results)
            .clamp(1, self.youtube.max_results_limit.max(1))
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "SEO Assistant Configuration:\n\
            - YouTube API key: {}\n\
            - Default language: {}\n\
            - Suggestion fan-out: {} (max {}, {} concurrent)\n\
            - Translation eligible languages: {}\n\
            - LLM provider: {:?} ({})\n\
            - LLM API key: {}\n\
            - Keyword volumes: {}",
            if self.youtube.api_key.is_some() { "set" } else { "missing" },
            self.youtube.default_language,
            self.suggestions.default_fanout,
            self.suggestions.max_fanout,
            self.suggestions.max_concurrent_requests,
            self.transcripts.translation_eligible_languages.join(", "),
            self.llm.provider,
            self.llm.model,
            if self.llm.api_key.is_some() { "set" } else { "missing" },
            if self.keywords.api_key.is_some() { "enabled" } else { "disabled" },
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_youtube_api_key(mut self, api_key: String) -> Self {
        self.config.youtube.api_key = Some(api_key);
        self
    }

    pub fn with_llm_api_key(mut self, api_key: String) -> Self {
        self.config.llm.api_key = Some(api_key);
        self
    }

    pub fn with_default_language(mut self, language: &str) -> Self {
        self.config.youtube.default_language = language.to_string();
        self
    }

    pub fn with_fanout(mut self, default_fanout: usize, max_fanout: usize) -> Self {
        self.config.suggestions.default_fanout = default_fanout;
        self.config.suggestions.max_fanout = max_fanout;
        self
    }

    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.config.suggestions.max_concurrent_requests = max;
        self
    }

    pub fn with_translation_languages(mut self, languages: &[&str]) -> Self {
        self.config.transcripts.translation_eligible_languages =
            languages.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
