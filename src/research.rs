/// Video research pipeline: top videos for a keyword, single-video optimization
use crate::error::{Result, SeoError};
use crate::llm::optimizer::{ContentOptimizer, OptimizationInput};
use crate::transcripts::{SelectedTranscript, TranscriptSelector};
use crate::youtube::{extract_video_id, VideoDetails, VideoSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// One researched video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoReport {
    /// 1-based search rank
    pub rank: usize,
    pub details: VideoDetails,
    pub optimized_title: Option<String>,
    pub optimized_description: Option<String>,
    pub transcript: Option<SelectedTranscript>,
}

/// Result of optimizing a single video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoOptimization {
    pub details: VideoDetails,
    pub transcript: Option<SelectedTranscript>,
    pub optimized_title: String,
    pub optimized_description: String,
}

pub struct VideoResearch {
    videos: Arc<dyn VideoSource>,
    optimizer: Arc<ContentOptimizer>,
    transcripts: TranscriptSelector,
}

impl VideoResearch {
    pub fn new(
        videos: Arc<dyn VideoSource>,
        optimizer: Arc<ContentOptimizer>,
        transcripts: TranscriptSelector,
    ) -> Self {
        Self {
            videos,
            optimizer,
            transcripts,
        }
    }

    /// Top videos for a keyword with optimized metadata and their best transcript
    ///
    /// A search failure or a generator authorization failure aborts the run.
    /// Other per-video failures leave the matching field empty.
    pub async fn top_videos(&self, keyword: &str, language: &str, max_results: usize) -> Result<Vec<VideoReport>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(SeoError::InvalidQuery("keyword must not be empty".to_string()));
        }

        info!("🎬 Fetching top {} videos for '{}' ({})", max_results, keyword, language);
        let ids = self.videos.search(keyword, language, max_results).await?;

        let mut reports = Vec::with_capacity(ids.len());
        for (index, video_id) in ids.iter().take(max_results).enumerate() {
            let details = match self.videos.video_details(video_id).await {
                Ok(details) => details,
                Err(e) => {
                    warn!("⚠️ Skipping video {}: {}", video_id, e);
                    continue;
                }
            };

            let input = OptimizationInput {
                title: &details.title,
                description: &details.description,
                transcript: None,
            };
            let optimized_title = degrade(self.optimizer.optimize_title(input).await, "title", video_id)?;
            let optimized_description =
                degrade(self.optimizer.optimize_description(input).await, "description", video_id)?;

            let transcript = self.best_transcript(video_id, language).await;

            reports.push(VideoReport {
                rank: index + 1,
                details,
                optimized_title,
                optimized_description,
                transcript,
            });
        }

        info!("✅ Researched {} videos for '{}'", reports.len(), keyword);
        Ok(reports)
    }

    /// Optimize one video from its URL or id, using its transcript as context
    pub async fn optimize_video(&self, url: &str, language: &str) -> Result<VideoOptimization> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| SeoError::InvalidQuery(format!("not a YouTube video URL: {}", url)))?;

        info!("🛠️ Optimizing video {}", video_id);
        let details = self.videos.video_details(&video_id).await?;
        let transcript = self.best_transcript(&video_id, language).await;
        let transcript_text = transcript.as_ref().map(SelectedTranscript::text).unwrap_or_default();

        let input = OptimizationInput {
            title: &details.title,
            description: &details.description,
            transcript: Some(&transcript_text),
        };
        let optimized_title = self.optimizer.optimize_title(input).await?;
        let optimized_description = self.optimizer.optimize_description(input).await?;

        Ok(VideoOptimization {
            details,
            transcript,
            optimized_title,
            optimized_description,
        })
    }

    async fn best_transcript(&self, video_id: &str, language: &str) -> Option<SelectedTranscript> {
        match self.transcripts.select_transcript(video_id, language).await {
            Ok(transcript) => Some(transcript),
            Err(e) => {
                warn!("⚠️ No transcript for {}: {}", video_id, e);
                None
            }
        }
    }
}

/// Keep batch-fatal errors, turn the rest into an empty field
fn degrade(result: Result<String>, field: &str, video_id: &str) -> Result<Option<String>> {
    match result {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.is_fatal_for_batch() => Err(e),
        Err(e) => {
            warn!("⚠️ Could not optimize {} of {}: {}", field, video_id, e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, LLMProvider, LLMResponse, LLM};
    use crate::transcripts::{
        SourceType, TranscriptCatalog, TranscriptEntry, TranscriptService, TranscriptTrack,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn details(id: &str, description: &str) -> VideoDetails {
        VideoDetails {
            video_id: id.to_string(),
            title: format!("title {id}"),
            description: description.to_string(),
            views: 1000,
            comments: 10,
            duration: "PT5M".to_string(),
            published_at: None,
            channel_title: "channel".to_string(),
            category_id: "27".to_string(),
            url: format!("https://www.youtube.com/watch?v={id}"),
        }
    }

    #[derive(Default)]
    struct FakeVideos {
        ids: Vec<String>,
        details: HashMap<String, VideoDetails>,
        fail_search: bool,
    }

    #[async_trait]
    impl VideoSource for FakeVideos {
        async fn search(&self, _keyword: &str, _language: &str, _max_results: usize) -> Result<Vec<String>> {
            if self.fail_search {
                return Err(SeoError::VideoFetch("quota exceeded".to_string()));
            }
            Ok(self.ids.clone())
        }

        async fn video_details(&self, video_id: &str) -> Result<VideoDetails> {
            self.details
                .get(video_id)
                .cloned()
                .ok_or_else(|| SeoError::VideoFetch(format!("video {} not found", video_id)))
        }
    }

    /// Replies with a fixed text, or fails with the configured error
    struct ScriptedLLM {
        reply: std::result::Result<String, fn() -> SeoError>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLLM {
        fn replying(text: &str) -> Self {
            Self { reply: Ok(text.to_string()), prompts: Mutex::new(Vec::new()) }
        }

        fn failing(error: fn() -> SeoError) -> Self {
            Self { reply: Err(error), prompts: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl LLM for ScriptedLLM {
        async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse> {
            if let Some(user) = messages.last() {
                self.prompts.lock().unwrap().push(user.content.clone());
            }
            match &self.reply {
                Ok(text) => Ok(LLMResponse { content: text.clone(), tokens_used: Some(42) }),
                Err(make_error) => Err(make_error()),
            }
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn provider_type(&self) -> LLMProvider {
            LLMProvider::OpenAI
        }
    }

    /// Only `with-captions` has a track
    struct FakeTranscripts;

    #[async_trait]
    impl TranscriptService for FakeTranscripts {
        async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptCatalog> {
            let tracks = if video_id == "with-captions" {
                vec![TranscriptTrack {
                    language_code: "fr".to_string(),
                    language_name: "French".to_string(),
                    is_generated: false,
                    is_translatable: true,
                    base_url: String::new(),
                }]
            } else {
                Vec::new()
            };
            Ok(TranscriptCatalog::new(video_id, tracks))
        }

        async fn fetch_transcript(&self, _track: &TranscriptTrack) -> Result<Vec<TranscriptEntry>> {
            Ok(vec![TranscriptEntry { text: "bonjour tout le monde".to_string(), start: 0.0, duration: 3.0 }])
        }

        async fn translate_transcript(&self, _track: &TranscriptTrack, _target: &str) -> Result<Vec<TranscriptEntry>> {
            Err(SeoError::TranscriptFetch("unsupported".to_string()))
        }
    }

    fn research(videos: FakeVideos, llm: Arc<ScriptedLLM>) -> VideoResearch {
        VideoResearch::new(
            Arc::new(videos),
            Arc::new(ContentOptimizer::new(llm)),
            TranscriptSelector::new(Arc::new(FakeTranscripts)),
        )
    }

    fn two_videos() -> FakeVideos {
        FakeVideos {
            ids: vec!["with-captions".to_string(), "no-captions".to_string()],
            details: HashMap::from([
                ("with-captions".to_string(), details("with-captions", "A description")),
                ("no-captions".to_string(), details("no-captions", "")),
            ]),
            fail_search: false,
        }
    }

    #[tokio::test]
    async fn top_videos_reports_in_search_order() {
        let llm = Arc::new(ScriptedLLM::replying("Better text"));
        let reports = research(two_videos(), llm).top_videos("rust", "fr", 5).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].rank, 1);
        assert_eq!(reports[0].details.video_id, "with-captions");
        assert_eq!(reports[0].optimized_title.as_deref(), Some("Better text"));
        assert_eq!(reports[0].transcript.as_ref().unwrap().source_type, SourceType::Manual);

        assert_eq!(reports[1].optimized_description.as_deref(), Some("No Original Description"));
        assert!(reports[1].transcript.is_none());
    }

    #[tokio::test]
    async fn missing_details_skip_the_video() {
        let mut videos = two_videos();
        videos.ids.insert(1, "deleted".to_string());

        let llm = Arc::new(ScriptedLLM::replying("ok"));
        let reports = research(videos, llm).top_videos("rust", "fr", 5).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].rank, 3);
    }

    #[tokio::test]
    async fn auth_failure_aborts_the_batch() {
        let llm = Arc::new(ScriptedLLM::failing(|| SeoError::GenerationAuth {
            provider: LLMProvider::OpenAI,
        }));
        let err = research(two_videos(), llm).top_videos("rust", "fr", 5).await.unwrap_err();
        assert!(matches!(err, SeoError::GenerationAuth { .. }));
    }

    #[tokio::test]
    async fn request_failure_leaves_fields_empty() {
        let llm = Arc::new(ScriptedLLM::failing(|| SeoError::GenerationRequest("HTTP 500".to_string())));
        let reports = research(two_videos(), llm).top_videos("rust", "fr", 5).await.unwrap();

        assert!(reports[0].optimized_title.is_none());
        assert!(reports[0].optimized_description.is_none());
        // empty descriptions never reach the generator
        assert_eq!(reports[1].optimized_description.as_deref(), Some("No Original Description"));
    }

    #[tokio::test]
    async fn search_failure_aborts() {
        let videos = FakeVideos { fail_search: true, ..Default::default() };
        let llm = Arc::new(ScriptedLLM::replying("ok"));
        let err = research(videos, llm).top_videos("rust", "fr", 5).await.unwrap_err();
        assert!(matches!(err, SeoError::VideoFetch(_)));
    }

    #[tokio::test]
    async fn blank_keyword_is_rejected() {
        let llm = Arc::new(ScriptedLLM::replying("ok"));
        let err = research(two_videos(), llm).top_videos("  ", "fr", 5).await.unwrap_err();
        assert!(matches!(err, SeoError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn optimize_video_uses_transcript_context() {
        let mut videos = two_videos();
        videos.details.insert("dQw4w9WgXcQ".to_string(), details("dQw4w9WgXcQ", "desc"));
        let llm = Arc::new(ScriptedLLM::replying("Optimized"));

        let research = research(videos, llm.clone());
        let result = research
            .optimize_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "fr")
            .await
            .unwrap();

        assert_eq!(result.details.video_id, "dQw4w9WgXcQ");
        assert!(result.transcript.is_none());
        assert_eq!(result.optimized_title, "Optimized");
        assert_eq!(result.optimized_description, "Optimized");
        assert_eq!(llm.prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn optimize_video_rejects_bad_urls() {
        let llm = Arc::new(ScriptedLLM::replying("ok"));
        let err = research(two_videos(), llm)
            .optimize_video("https://example.com/video", "fr")
            .await
            .unwrap_err();
        assert!(matches!(err, SeoError::InvalidQuery(_)));
    }
}
