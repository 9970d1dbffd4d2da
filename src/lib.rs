/// YouTube SEO Assistant
///
/// Keyword research for video creators: autocomplete suggestion trees,
/// top-video research with LLM-optimized titles and descriptions, best
/// transcript selection and keyword search volumes.

pub mod config;
pub mod error;
pub mod format;
pub mod keywords;
pub mod llm;
pub mod research;
pub mod suggestions;
pub mod transcripts;
pub mod youtube;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder, OutputFormat};
pub use crate::error::{Result, SeoError};
pub use crate::keywords::{KeywordVolume, KeywordVolumeSource, KeywordsEverywhereClient};
pub use crate::llm::optimizer::{ContentOptimizer, OptimizationInput, NO_ORIGINAL_DESCRIPTION};
pub use crate::llm::{create_llm, LLMConfig, LLMProvider, LLM};
pub use crate::research::{VideoOptimization, VideoReport, VideoResearch};
pub use crate::suggestions::{GoogleSuggestClient, SuggestionNode, SuggestionSource, SuggestionTreeBuilder};
pub use crate::transcripts::{
    SelectedTranscript, SourceType, TranscriptCatalog, TranscriptSelector, TranscriptService,
    TranscriptTrack, YouTubeTranscriptClient,
};
pub use crate::youtube::{CategoryTable, VideoDetails, VideoSource, YouTubeDataClient};
