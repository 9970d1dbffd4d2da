use super::LLM;
use crate::config::PromptConfig;
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Returned instead of calling the model when a video has no description
pub const NO_ORIGINAL_DESCRIPTION: &str = "No Original Description";

/// Transcript words passed to the model as context
const MAX_TRANSCRIPT_CONTEXT_WORDS: usize = 1500;

/// What the optimizer knows about a video
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizationInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub transcript: Option<&'a str>,
}

/// Rewrites titles and descriptions for search discoverability
pub struct ContentOptimizer {
    llm: Arc<dyn LLM>,
    title_prompt: String,
    description_prompt: String,
}

impl ContentOptimizer {
    /// Create an optimizer with the built-in system prompts
    pub fn new(llm: Arc<dyn LLM>) -> Self {
        Self {
            llm,
            title_prompt: Self::default_title_prompt().to_string(),
            description_prompt: Self::default_description_prompt().to_string(),
        }
    }

    /// Create an optimizer, loading system prompts from the prompt directory when present
    pub async fn with_prompts(llm: Arc<dyn LLM>, prompts: &PromptConfig) -> Self {
        let mut optimizer = Self::new(llm);

        match prompts.load_title_prompt().await {
            Ok(prompt) if !prompt.is_empty() => optimizer.title_prompt = prompt,
            Ok(_) => warn!("Title prompt file is empty, using default prompt"),
            Err(e) => debug!("Using default title prompt: {}", e),
        }
        match prompts.load_description_prompt().await {
            Ok(prompt) if !prompt.is_empty() => optimizer.description_prompt = prompt,
            Ok(_) => warn!("Description prompt file is empty, using default prompt"),
            Err(e) => debug!("Using default description prompt: {}", e),
        }

        info!(
            "✍️ Content optimizer initialized with {:?} provider",
            optimizer.llm.provider_type()
        );
        optimizer
    }

    /// Generate an SEO-optimized title
    pub async fn optimize_title(&self, input: OptimizationInput<'_>) -> Result<String> {
        let user_prompt = match input.transcript {
            Some(transcript) => format!(
                "Analyze the title: {}, the description: {} and the content: {} of this YouTube video and write an SEO-optimized title, taking keywords, engagement and SEO best practices into account.",
                input.title,
                input.description,
                limit_words(transcript, MAX_TRANSCRIPT_CONTEXT_WORDS)
            ),
            None => format!(
                "Analyze the following YouTube video title and write an SEO-optimized version, taking keywords, engagement and SEO best practices into account: {}",
                input.title
            ),
        };

        debug!("Optimizing title ({} chars)", input.title.len());
        let generated = self.llm.generate(&self.title_prompt, &user_prompt).await?;
        Ok(clean_generated(&generated))
    }

    /// Generate an SEO-optimized description
    pub async fn optimize_description(&self, input: OptimizationInput<'_>) -> Result<String> {
        if input.description.trim().is_empty() {
            return Ok(NO_ORIGINAL_DESCRIPTION.to_string());
        }

        let user_prompt = match input.transcript {
            Some(transcript) => format!(
                "Analyze the description: {}, the content: {} and the title: {} of this YouTube video and write an SEO-optimized description.",
                input.description,
                limit_words(transcript, MAX_TRANSCRIPT_CONTEXT_WORDS),
                input.title
            ),
            None => format!(
                "Analyze the following YouTube video description and write an SEO-optimized version, taking keywords, engagement and SEO best practices into account: {}",
                input.description
            ),
        };

        debug!("Optimizing description ({} chars)", input.description.len());
        let generated = self.llm.generate(&self.description_prompt, &user_prompt).await?;
        Ok(clean_generated(&generated))
    }

    fn default_title_prompt() -> &'static str {
        r#"You are an experienced copywriter specialised in YouTube SEO.
Write one engaging, informative title for the video.
- Put the main keyword first, then a secondary keyword or descriptive complement.
- Keep it between 50 and 60 characters.
- Use at most two relevant emojis, never next to each other.
- Reply ONLY with the title, without any label or quotes."#
    }

    fn default_description_prompt() -> &'static str {
        r#"You are an experienced copywriter specialised in YouTube SEO.
Write one optimized description for the video.
- Open with a short, impactful question about the main keyword followed by 👇.
- Summarise the content clearly using primary and secondary keywords.
- Keep it between 400 and 500 characters, add a call to action.
- End with 8 to 10 relevant hashtags.
- Reply ONLY with the description, without any label."#
    }
}

/// Keep the first `max_words` words of a text
fn limit_words(text: &str, max_words: usize) -> String {
    text.split_whitespace().take(max_words).collect::<Vec<_>>().join(" ")
}

/// Strip labels and wrapping quotes that models tend to add
fn clean_generated(text: &str) -> String {
    let mut cleaned = text.trim();

    for label in [
        "Optimized title:",
        "Optimized description:",
        "Titre optimisé:",
        "Description optimisée:",
        "Title:",
        "Description:",
    ] {
        if let Some(rest) = cleaned.strip_prefix(label) {
            cleaned = rest.trim_start();
            break;
        }
    }

    if cleaned.len() >= 2 && cleaned.starts_with('"') && cleaned.ends_with('"') {
        cleaned = &cleaned[1..cleaned.len() - 1];
    }

    cleaned.trim().to_string()
}
