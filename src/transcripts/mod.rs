/// Caption track discovery and transcript selection
///
/// A video's caption tracks are listed once into a [`TranscriptCatalog`]; the
/// [`TranscriptSelector`] then walks a deterministic plan over that catalog and
/// fetches the first candidate that succeeds.
pub mod selector;
pub mod youtube;

pub use selector::{language_priority, plan_selection, Candidate, SelectionPlan, SelectionRule, TranscriptSelector};
pub use youtube::YouTubeTranscriptClient;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One caption track advertised for a video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptTrack {
    pub language_code: String,
    pub language_name: String,
    pub is_generated: bool,
    pub is_translatable: bool,
    /// Where the track's entries are fetched from
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_url: String,
}

impl TranscriptTrack {
    pub fn source_type(&self) -> SourceType {
        if self.is_generated {
            SourceType::Generated
        } else {
            SourceType::Manual
        }
    }
}

/// All caption tracks of a video, in the order the service lists them
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TranscriptCatalog {
    pub video_id: String,
    pub tracks: Vec<TranscriptTrack>,
    /// Target languages accepted by the translation endpoint
    #[serde(default)]
    pub translation_languages: Vec<String>,
}

impl TranscriptCatalog {
    pub fn new(video_id: impl Into<String>, tracks: Vec<TranscriptTrack>) -> Self {
        Self {
            video_id: video_id.into(),
            tracks,
            translation_languages: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Whether a translated copy into `language` can be requested
    pub fn supports_translation_to(&self, language: &str) -> bool {
        self.translation_languages.is_empty()
            || self.translation_languages.iter().any(|l| l == language)
    }

    /// Tracks grouped for display as `code (name)`
    pub fn inventory(&self) -> TranscriptInventory {
        let mut inventory = TranscriptInventory::default();
        for track in &self.tracks {
            let label = format!("{} ({})", track.language_code, track.language_name);
            if track.is_translatable {
                inventory.translatable.push(label.clone());
            }
            if track.is_generated {
                inventory.generated.push(label);
            } else {
                inventory.manual.push(label);
            }
        }
        inventory
    }
}

/// Diagnostic listing of a video's caption tracks
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TranscriptInventory {
    pub manual: Vec<String>,
    pub generated: Vec<String>,
    pub translatable: Vec<String>,
}

/// A single timed caption line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptEntry {
    pub text: String,
    /// Start offset in seconds
    pub start: f64,
    /// Duration in seconds
    pub duration: f64,
}

/// How the selected transcript was produced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Manual,
    Generated,
    Translated,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Manual => write!(f, "manual"),
            SourceType::Generated => write!(f, "generated"),
            SourceType::Translated => write!(f, "translated"),
        }
    }
}

/// The transcript chosen for a (video, preferred language) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedTranscript {
    pub entries: Vec<TranscriptEntry>,
    pub source_type: SourceType,
    pub language_code: String,
    pub language_name: String,
    pub origin_language_code: Option<String>,
    /// Policy branch that produced this transcript
    pub rule: SelectionRule,
}

impl SelectedTranscript {
    /// Entry texts joined into one whitespace-normalised string
    pub fn text(&self) -> String {
        self.entries
            .iter()
            .flat_map(|e| e.text.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn word_count(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.text.split_whitespace().count())
            .sum()
    }

    /// End of the last entry, in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.entries
            .last()
            .map(|e| e.start + e.duration)
            .unwrap_or(0.0)
    }
}

/// Transcript listing, fetch and translation service
#[async_trait]
pub trait TranscriptService: Send + Sync {
    /// List the caption tracks of a video
    async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptCatalog>;

    /// Fetch the entries of a track in its own language
    async fn fetch_transcript(&self, track: &TranscriptTrack) -> Result<Vec<TranscriptEntry>>;

    /// Fetch a copy of a track translated into `target_language`
    async fn translate_transcript(
        &self,
        track: &TranscriptTrack,
        target_language: &str,
    ) -> Result<Vec<TranscriptEntry>>;
}
