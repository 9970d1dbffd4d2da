use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::fs;

use yt_seo_assistant::config::PromptConfig;
use yt_seo_assistant::format::{render_transcript, render_tree};
use yt_seo_assistant::llm::{ChatMessage, LLMResponse};
use yt_seo_assistant::transcripts::{SelectionRule, TranscriptEntry};
use yt_seo_assistant::{
    CategoryTable, Config, ConfigBuilder, ContentOptimizer, LLMProvider, OptimizationInput, Result,
    SeoError, SourceType, SuggestionSource, SuggestionTreeBuilder, TranscriptCatalog,
    TranscriptSelector, TranscriptService, TranscriptTrack, VideoDetails, VideoResearch, VideoSource,
    LLM, NO_ORIGINAL_DESCRIPTION,
};

/// Autocomplete backed by a map; unknown queries get no suggestions
struct MapSuggestions {
    responses: HashMap<String, Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl MapSuggestions {
    fn new(entries: Vec<(&str, Vec<&str>)>) -> Self {
        Self {
            responses: entries
                .into_iter()
                .map(|(q, s)| (q.to_string(), s.into_iter().map(str::to_string).collect()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SuggestionSource for MapSuggestions {
    async fn fetch_suggestions(&self, query: &str, _language: &str) -> Result<Vec<String>> {
        self.calls.lock().unwrap().push(query.to_string());
        if query == "broken" {
            return Err(SeoError::SuggestionFetch {
                query: query.to_string(),
                reason: "HTTP 503".to_string(),
            });
        }
        Ok(self.responses.get(query).cloned().unwrap_or_default())
    }
}

struct CatalogService {
    tracks: Vec<TranscriptTrack>,
}

#[async_trait]
impl TranscriptService for CatalogService {
    async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptCatalog> {
        Ok(TranscriptCatalog::new(video_id, self.tracks.clone()))
    }

    async fn fetch_transcript(&self, track: &TranscriptTrack) -> Result<Vec<TranscriptEntry>> {
        Ok(vec![TranscriptEntry {
            text: format!("native {}", track.language_code),
            start: 0.0,
            duration: 90.0,
        }])
    }

    async fn translate_transcript(&self, track: &TranscriptTrack, target: &str) -> Result<Vec<TranscriptEntry>> {
        Ok(vec![TranscriptEntry {
            text: format!("{} from {}", target, track.language_code),
            start: 0.0,
            duration: 90.0,
        }])
    }
}

fn track(code: &str, generated: bool, translatable: bool) -> TranscriptTrack {
    TranscriptTrack {
        language_code: code.to_string(),
        language_name: code.to_string(),
        is_generated: generated,
        is_translatable: translatable,
        base_url: String::new(),
    }
}

struct EchoLLM;

#[async_trait]
impl LLM for EchoLLM {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse> {
        let user = messages.last().map(|m| m.content.len()).unwrap_or(0);
        Ok(LLMResponse {
            content: format!("Title: optimized ({} chars of prompt)", user),
            tokens_used: None,
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::LMStudio
    }
}

struct OneVideo;

#[async_trait]
impl VideoSource for OneVideo {
    async fn search(&self, _keyword: &str, _language: &str, max_results: usize) -> Result<Vec<String>> {
        Ok(vec!["dQw4w9WgXcQ".to_string(); max_results.min(1)])
    }

    async fn video_details(&self, video_id: &str) -> Result<VideoDetails> {
        Ok(VideoDetails {
            video_id: video_id.to_string(),
            title: "Rust async explained".to_string(),
            description: "Everything about futures".to_string(),
            views: 4200,
            comments: 12,
            duration: "PT15M".to_string(),
            published_at: None,
            channel_title: "Rustacean".to_string(),
            category_id: "28".to_string(),
            url: format!("https://www.youtube.com/watch?v={}", video_id),
        })
    }
}

#[tokio::test]
async fn test_suggestion_tree_end_to_end() {
    let source = Arc::new(MapSuggestions::new(vec![
        ("seo", vec!["seo tips", "broken", "seo tools"]),
        ("seo tips", vec!["seo tips 2024", "seo tips youtube", "seo tips blog"]),
    ]));
    let builder = SuggestionTreeBuilder::new(source.clone()).with_max_concurrent(2);

    let tree = builder.build_tree("seo", "en", 2).await.unwrap();

    assert_eq!(tree.query, "seo");
    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.children[0].query, "seo tips");
    assert_eq!(tree.children[0].children.len(), 2);
    assert_eq!(tree.children[1].query, "broken");
    assert!(tree.children[1].children.is_empty());
    assert_eq!(tree.depth(), 2);
    assert_eq!(
        tree.keywords(),
        vec!["seo tips", "broken", "seo tips 2024", "seo tips youtube"]
    );

    // root + one call per kept child
    assert_eq!(source.calls.lock().unwrap().len(), 3);
    assert!(render_tree(&tree).contains("└─ seo tips 2024"));
}

#[tokio::test]
async fn test_invalid_queries_make_no_calls() {
    let source = Arc::new(MapSuggestions::new(vec![]));
    let builder = SuggestionTreeBuilder::new(source.clone());

    assert!(matches!(
        builder.build_tree("   ", "en", 2).await,
        Err(SeoError::InvalidQuery(_))
    ));
    assert!(matches!(
        builder.build_tree("seo", "en", 0).await,
        Err(SeoError::InvalidQuery(_))
    ));
    assert!(source.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_root_failure_is_fatal() {
    let builder = SuggestionTreeBuilder::new(Arc::new(MapSuggestions::new(vec![])));
    let err = builder.build_tree("broken", "en", 2).await.unwrap_err();
    assert!(matches!(err, SeoError::SuggestionFetch { query, .. } if query == "broken"));
}

#[tokio::test]
async fn test_transcript_selection_and_rendering() {
    let selector = TranscriptSelector::new(Arc::new(CatalogService {
        tracks: vec![track("es", true, true), track("de", false, false)],
    }));

    let selected = selector.select_transcript("vid", "fr").await.unwrap();
    assert_eq!(selected.source_type, SourceType::Translated);
    assert_eq!(selected.rule, SelectionRule::Translation);
    assert_eq!(selected.origin_language_code.as_deref(), Some("es"));

    let rendered = render_transcript(&selected, 300);
    assert!(rendered.starts_with("🔄 Translated to fr (Translated from es)"));
    assert!(rendered.contains("1min"));

    let german = selector.select_transcript("vid", "de").await.unwrap();
    assert_eq!(german.source_type, SourceType::Manual);
    assert_eq!(german.language_code, "de");
}

#[tokio::test]
async fn test_config_driven_translation_languages() {
    let config = ConfigBuilder::new().with_translation_languages(&["it"]).build();
    let selector = TranscriptSelector::new(Arc::new(CatalogService {
        tracks: vec![track("es", true, true)],
    }))
    .with_translation_languages(config.transcripts.translation_eligible_languages.clone());

    let italian = selector.select_transcript("vid", "it").await.unwrap();
    assert_eq!(italian.source_type, SourceType::Translated);

    let french = selector.select_transcript("vid", "fr").await.unwrap();
    assert_eq!(french.source_type, SourceType::Generated);
    assert_eq!(french.rule, SelectionRule::AnyAvailable);
}

#[tokio::test]
async fn test_optimizer_with_prompt_files() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("title.txt"), "Custom title prompt").await.unwrap();

    let prompts = PromptConfig {
        prompt_dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    };
    let optimizer = ContentOptimizer::with_prompts(Arc::new(EchoLLM), &prompts).await;

    let title = optimizer
        .optimize_title(OptimizationInput {
            title: "rust",
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(title.starts_with("optimized"));

    let description = optimizer
        .optimize_description(OptimizationInput::default())
        .await
        .unwrap();
    assert_eq!(description, NO_ORIGINAL_DESCRIPTION);
}

#[tokio::test]
async fn test_video_research_pipeline() {
    let research = VideoResearch::new(
        Arc::new(OneVideo),
        Arc::new(ContentOptimizer::new(Arc::new(EchoLLM))),
        TranscriptSelector::new(Arc::new(CatalogService {
            tracks: vec![track("en", false, true)],
        })),
    );

    let reports = research.top_videos("rust async", "en", 3).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].details.channel_title, "Rustacean");
    assert!(reports[0].optimized_title.is_some());
    assert_eq!(reports[0].transcript.as_ref().unwrap().language_code, "en");

    let categories = CategoryTable::builtin();
    assert_eq!(categories.resolve(&reports[0].details.category_id), "Science & Technology");

    let single = research.optimize_video("https://youtu.be/dQw4w9WgXcQ", "en").await.unwrap();
    assert_eq!(single.details.video_id, "dQw4w9WgXcQ");
    assert!(single.transcript.is_some());
}

#[test]
fn test_config_file_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("seo-assistant.toml");

    let config = ConfigBuilder::new().with_fanout(3, 8).with_default_language("en").build();
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.suggestions.default_fanout, 3);
    assert_eq!(loaded.suggestions.max_fanout, 8);
    assert_eq!(loaded.youtube.default_language, "en");
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_blocking_tree_build() {
    let source = Arc::new(MapSuggestions::new(vec![("rust", vec!["rust lang"])]));
    let builder = SuggestionTreeBuilder::new(source);

    let suggestions = tokio_test::block_on(builder.suggestions("rust", "en", 10)).unwrap();
    assert_eq!(suggestions, vec!["rust lang"]);
}
