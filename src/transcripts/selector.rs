/// Transcript selection policy
///
/// Rules, first success wins:
/// 1. manual track in a priority language
/// 2. generated track in a priority language
/// 3. translation into the preferred language (eligible languages only)
/// 4. any track that can be fetched, with its native source type
use super::{SelectedTranscript, SourceType, TranscriptCatalog, TranscriptService};
use crate::error::{Result, SeoError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Languages appended after the preferred one, in order
const FALLBACK_LANGUAGES: [&str; 2] = ["en", "fr"];

/// Policy branch that produced a transcript
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    Manual,
    Generated,
    Translation,
    AnyAvailable,
}

/// One fetch attempt of the selection plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Index into the catalog's tracks
    pub track_index: usize,
    pub rule: SelectionRule,
    /// Set for translation attempts
    pub target_language: Option<String>,
}

/// Ordered fetch attempts for a catalog and preferred language
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionPlan {
    pub candidates: Vec<Candidate>,
}

/// `[preferred, "en", "fr"]` without duplicates
pub fn language_priority(preferred_language: &str) -> Vec<String> {
    let mut priority = vec![preferred_language.to_string()];
    for fallback in FALLBACK_LANGUAGES {
        if !priority.iter().any(|l| l == fallback) {
            priority.push(fallback.to_string());
        }
    }
    priority
}

/// Compute the fetch attempts for a catalog, without any I/O
pub fn plan_selection(
    catalog: &TranscriptCatalog,
    preferred_language: &str,
    translation_languages: &[String],
) -> SelectionPlan {
    let priority = language_priority(preferred_language);
    let mut candidates = Vec::new();
    let mut tried_natively = vec![false; catalog.tracks.len()];

    for (rule, generated) in [(SelectionRule::Manual, false), (SelectionRule::Generated, true)] {
        for lang in &priority {
            for (index, track) in catalog.tracks.iter().enumerate() {
                if &track.language_code == lang && track.is_generated == generated {
                    candidates.push(Candidate {
                        track_index: index,
                        rule,
                        target_language: None,
                    });
                    tried_natively[index] = true;
                }
            }
        }
    }

    let translation_eligible = translation_languages.iter().any(|l| l == preferred_language)
        && catalog.supports_translation_to(preferred_language);
    if translation_eligible {
        for (index, track) in catalog.tracks.iter().enumerate() {
            if track.language_code != preferred_language && track.is_translatable {
                candidates.push(Candidate {
                    track_index: index,
                    rule: SelectionRule::Translation,
                    target_language: Some(preferred_language.to_string()),
                });
            }
        }
    }

    for (index, _) in catalog.tracks.iter().enumerate() {
        if !tried_natively[index] {
            candidates.push(Candidate {
                track_index: index,
                rule: SelectionRule::AnyAvailable,
                target_language: None,
            });
        }
    }

    SelectionPlan { candidates }
}

/// Picks the best available transcript for a video
#[derive(Clone)]
pub struct TranscriptSelector {
    service: Arc<dyn TranscriptService>,
    translation_languages: Vec<String>,
}

impl TranscriptSelector {
    pub fn new(service: Arc<dyn TranscriptService>) -> Self {
        Self {
            service,
            translation_languages: vec!["fr".to_string(), "en".to_string()],
        }
    }

    /// Preferred languages for which translation fallback is attempted
    pub fn with_translation_languages(mut self, languages: Vec<String>) -> Self {
        self.translation_languages = languages;
        self
    }

    /// List the caption tracks of a video
    pub async fn catalog(&self, video_id: &str) -> Result<TranscriptCatalog> {
        self.service
            .list_transcripts(video_id)
            .await
            .map_err(|e| match e {
                SeoError::TranscriptList { .. } => e,
                other => SeoError::TranscriptList {
                    video_id: video_id.to_string(),
                    reason: other.to_string(),
                },
            })
    }

    /// Select the best transcript of a video for `preferred_language`
    pub async fn select_transcript(&self, video_id: &str, preferred_language: &str) -> Result<SelectedTranscript> {
        let catalog = self.catalog(video_id).await?;
        self.select_from_catalog(&catalog, preferred_language).await
    }

    /// Walk the selection plan of an already listed catalog
    pub async fn select_from_catalog(
        &self,
        catalog: &TranscriptCatalog,
        preferred_language: &str,
    ) -> Result<SelectedTranscript> {
        let preferred_language = preferred_language.trim();
        let plan = plan_selection(catalog, preferred_language, &self.translation_languages);

        debug!(
            "Transcript plan for {}: {} tracks, {} candidates",
            catalog.video_id,
            catalog.tracks.len(),
            plan.candidates.len()
        );

        for candidate in &plan.candidates {
            let track = &catalog.tracks[candidate.track_index];

            let attempt = match &candidate.target_language {
                Some(target) => self.service.translate_transcript(track, target).await,
                None => self.service.fetch_transcript(track).await,
            };

            let entries = match attempt {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        "⚠️ {:?} candidate {} failed for {}: {}",
                        candidate.rule, track.language_code, catalog.video_id, e
                    );
                    continue;
                }
            };

            let selected = match &candidate.target_language {
                Some(target) => SelectedTranscript {
                    entries,
                    source_type: SourceType::Translated,
                    language_code: target.clone(),
                    language_name: format!("Translated to {}", target),
                    origin_language_code: Some(track.language_code.clone()),
                    rule: candidate.rule,
                },
                None => SelectedTranscript {
                    entries,
                    source_type: track.source_type(),
                    language_code: track.language_code.clone(),
                    language_name: track.language_name.clone(),
                    origin_language_code: None,
                    rule: candidate.rule,
                },
            };

            info!(
                "📝 Selected {} transcript ({}) for {} via {:?}",
                selected.source_type, selected.language_code, catalog.video_id, selected.rule
            );
            return Ok(selected);
        }

        Err(SeoError::NoTranscriptAvailable {
            video_id: catalog.video_id.clone(),
        })
    }
}
