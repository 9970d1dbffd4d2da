/// Autocomplete suggestion retrieval and two-level suggestion trees
///
/// The tree is a literal call tree: the root's children are the first `fanout`
/// suggestions for the seed keyword, and each child is expanded exactly once
/// more. Duplicate suggestions under different parents are kept.
pub mod google;

pub use google::GoogleSuggestClient;

use crate::error::{Result, SeoError};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Source of autocomplete suggestions
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Suggestions for `query` in relevance order
    async fn fetch_suggestions(&self, query: &str, language: &str) -> Result<Vec<String>>;
}

/// A node of the suggestion tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestionNode {
    pub query: String,
    pub children: Vec<SuggestionNode>,
}

impl SuggestionNode {
    pub fn leaf(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            children: Vec::new(),
        }
    }

    /// All suggestions below this node level by level: every first-level
    /// suggestion, then the second level grouped by parent. Duplicates kept.
    pub fn keywords(&self) -> Vec<String> {
        let mut keywords = Vec::new();
        let mut level: Vec<&SuggestionNode> = vec![self];
        while !level.is_empty() {
            let next: Vec<&SuggestionNode> = level.iter().flat_map(|n| n.children.iter()).collect();
            keywords.extend(next.iter().map(|n| n.query.clone()));
            level = next;
        }
        keywords
    }

    /// Number of levels below this node
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Builds two-level suggestion trees with bounded concurrent child expansion
#[derive(Clone)]
pub struct SuggestionTreeBuilder {
    source: Arc<dyn SuggestionSource>,
    max_concurrent: usize,
    call_timeout: Duration,
}

impl SuggestionTreeBuilder {
    pub fn new(source: Arc<dyn SuggestionSource>) -> Self {
        Self {
            source,
            max_concurrent: 4,
            call_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Flat list of the first `limit` suggestions for a keyword
    pub async fn suggestions(&self, query: &str, language: &str, limit: usize) -> Result<Vec<String>> {
        let query = validate_query(query)?;
        let mut suggestions = self.fetch_root(query, language).await?;
        suggestions.truncate(limit);
        Ok(suggestions)
    }

    /// Build the suggestion tree for `root_query`
    ///
    /// A failure at the root aborts; a failure while expanding a child leaves
    /// that child without children.
    pub async fn build_tree(&self, root_query: &str, language: &str, fanout: usize) -> Result<SuggestionNode> {
        let root_query = validate_query(root_query)?;
        if fanout == 0 {
            return Err(SeoError::InvalidQuery("fan-out must be at least 1".to_string()));
        }

        info!("🌳 Building suggestion tree for '{}' (lang={}, fanout={})", root_query, language, fanout);

        let mut first_level = self.fetch_root(root_query, language).await?;
        first_level.truncate(fanout);

        let children = stream::iter(first_level)
            .map(|suggestion| async move {
                let children = match self.fetch_with_timeout(&suggestion, language).await {
                    Ok(mut grand_children) => {
                        grand_children.truncate(fanout);
                        grand_children.into_iter().map(SuggestionNode::leaf).collect()
                    }
                    Err(e) => {
                        warn!("⚠️ Could not expand suggestion '{}': {}", suggestion, e);
                        Vec::new()
                    }
                };
                SuggestionNode {
                    query: suggestion,
                    children,
                }
            })
            .buffered(self.max_concurrent)
            .collect::<Vec<_>>()
            .await;

        let tree = SuggestionNode {
            query: root_query.to_string(),
            children,
        };
        debug!("Suggestion tree has {} keywords", tree.keywords().len());
        Ok(tree)
    }

    async fn fetch_root(&self, query: &str, language: &str) -> Result<Vec<String>> {
        self.fetch_with_timeout(query, language)
            .await
            .map_err(|e| match e {
                SeoError::SuggestionFetch { .. } => e,
                other => SeoError::SuggestionFetch {
                    query: query.to_string(),
                    reason: other.to_string(),
                },
            })
    }

    async fn fetch_with_timeout(&self, query: &str, language: &str) -> Result<Vec<String>> {
        match tokio::time::timeout(self.call_timeout, self.source.fetch_suggestions(query, language)).await {
            Ok(result) => result,
            Err(_) => Err(SeoError::SuggestionFetch {
                query: query.to_string(),
                reason: format!("timed out after {:?}", self.call_timeout),
            }),
        }
    }
}

fn validate_query(query: &str) -> Result<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SeoError::InvalidQuery("query must not be empty".to_string()));
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct StubSource {
        responses: HashMap<String, Vec<String>>,
        failing: Vec<String>,
        slow: Vec<String>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn with(mut self, query: &str, suggestions: &[&str]) -> Self {
            self.responses.insert(
                query.to_string(),
                suggestions.iter().map(|s| s.to_string()).collect(),
            );
            self
        }

        fn failing(mut self, query: &str) -> Self {
            self.failing.push(query.to_string());
            self
        }

        fn slow(mut self, query: &str) -> Self {
            self.slow.push(query.to_string());
            self
        }
    }

    #[async_trait]
    impl SuggestionSource for StubSource {
        async fn fetch_suggestions(&self, query: &str, _language: &str) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.slow.iter().any(|q| q == query) {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self.failing.iter().any(|q| q == query) {
                return Err(SeoError::VideoFetch(format!("HTTP 500 for {query}")));
            }
            Ok(self.responses.get(query).cloned().unwrap_or_default())
        }
    }

    fn builder(source: StubSource) -> (SuggestionTreeBuilder, Arc<StubSource>) {
        let source = Arc::new(source);
        (SuggestionTreeBuilder::new(source.clone()), source)
    }

    fn queries(nodes: &[SuggestionNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.query.as_str()).collect()
    }

    #[tokio::test]
    async fn takes_first_fanout_results_at_each_level() {
        let (builder, _) = builder(
            StubSource::default()
                .with("seo", &["a", "b", "c", "d"])
                .with("a", &["a1", "a2", "a3", "a4"])
                .with("b", &["b1"])
                .with("c", &[]),
        );

        let tree = builder.build_tree("seo", "en", 3).await.unwrap();

        assert_eq!(tree.query, "seo");
        assert_eq!(queries(&tree.children), vec!["a", "b", "c"]);
        assert_eq!(queries(&tree.children[0].children), vec!["a1", "a2", "a3"]);
        assert_eq!(queries(&tree.children[1].children), vec!["b1"]);
        assert!(tree.children[2].children.is_empty());
        assert_eq!(tree.depth(), 2);
    }

    #[tokio::test]
    async fn depth_never_exceeds_two() {
        let (builder, source) = builder(
            StubSource::default()
                .with("root", &["x"])
                .with("x", &["y"])
                .with("y", &["z"]),
        );

        let tree = builder.build_tree("root", "en", 10).await.unwrap();
        assert_eq!(tree.depth(), 2);
        assert!(tree.children[0].children[0].children.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn child_failure_leaves_empty_children() {
        let (builder, _) = builder(
            StubSource::default()
                .with("seo", &["a", "b"])
                .with("b", &["b1"])
                .failing("a"),
        );

        let tree = builder.build_tree("seo", "en", 2).await.unwrap();
        assert_eq!(queries(&tree.children), vec!["a", "b"]);
        assert!(tree.children[0].children.is_empty());
        assert_eq!(queries(&tree.children[1].children), vec!["b1"]);
    }

    #[tokio::test]
    async fn root_failure_is_a_suggestion_fetch_error() {
        let (builder, _) = builder(StubSource::default().failing("seo"));

        match builder.build_tree("seo", "en", 2).await {
            Err(SeoError::SuggestionFetch { query, reason }) => {
                assert_eq!(query, "seo");
                assert!(reason.contains("HTTP 500"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_any_call() {
        let (builder, source) = builder(StubSource::default());

        for query in ["", "   "] {
            let err = builder.build_tree(query, "en", 2).await.unwrap_err();
            assert!(matches!(err, SeoError::InvalidQuery(_)));
        }
        let err = builder.suggestions("", "en", 10).await.unwrap_err();
        assert!(matches!(err, SeoError::InvalidQuery(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_fanout_is_rejected() {
        let (builder, source) = builder(StubSource::default().with("seo", &["a"]));
        let err = builder.build_tree("seo", "en", 0).await.unwrap_err();
        assert!(matches!(err, SeoError::InvalidQuery(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn keywords_are_listed_level_by_level_with_duplicates() {
        let (builder, _) = builder(
            StubSource::default()
                .with("seo", &["a", "b"])
                .with("a", &["shared", "a1"])
                .with("b", &["shared"]),
        );

        let tree = builder.build_tree("seo", "en", 2).await.unwrap();
        assert_eq!(tree.keywords(), vec!["a", "b", "shared", "a1", "shared"]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_child_times_out_without_reordering() {
        let source = StubSource::default()
            .with("seo", &["a", "b", "c"])
            .with("a", &["a1"])
            .with("c", &["c1"])
            .slow("b");
        let builder = SuggestionTreeBuilder::new(Arc::new(source))
            .with_max_concurrent(3)
            .with_call_timeout(Duration::from_secs(1));

        let tree = builder.build_tree("seo", "en", 3).await.unwrap();
        assert_eq!(queries(&tree.children), vec!["a", "b", "c"]);
        assert_eq!(queries(&tree.children[0].children), vec!["a1"]);
        assert!(tree.children[1].children.is_empty());
        assert_eq!(queries(&tree.children[2].children), vec!["c1"]);
    }

    #[tokio::test]
    async fn flat_suggestions_are_limited() {
        let (builder, _) = builder(StubSource::default().with("seo", &["a", "b", "c"]));
        let list = builder.suggestions("seo", "en", 2).await.unwrap();
        assert_eq!(list, vec!["a", "b"]);
    }
}
