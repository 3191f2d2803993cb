//! Web search trait: optional live lookup used as a second evidence source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::SearchError;

/// A single ranked web search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub url: String,

    /// The snippet text used as prompt context.
    #[serde(default)]
    pub content: String,

    /// Provider relevance score (higher is better), if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl SearchResult {
    pub fn snippet(content: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            content: content.into(),
            score: None,
        }
    }
}

/// A web search backend (Tavily, or a mock in tests).
#[async_trait]
pub trait WebSearch: Send + Sync {
    fn name(&self) -> &str;

    /// Search the web. Implementations return at most `max_results` hits,
    /// best first.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError>;
}
