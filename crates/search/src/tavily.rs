//! Tavily search API adapter.
//!
//! `POST {base_url}/search` with `{api_key, query, max_results}`; the
//! response carries `results[]` of `{title, url, content, score}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use stellar_core::error::SearchError;
use stellar_core::search::{SearchResult, WebSearch};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

pub struct TavilySearch {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: http_client(Duration::from_secs(30)),
        }
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = base_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    /// Replace the transport-level timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to configure HTTP client, using defaults");
            reqwest::Client::new()
        })
}

/// Map a non-success HTTP status to a search error.
fn status_error(status: u16, body: String) -> Option<SearchError> {
    match status {
        200..=299 => None,
        401 | 403 => Some(SearchError::Unauthorized(body)),
        429 => Some(SearchError::RateLimited),
        _ => Some(SearchError::Api {
            status_code: status,
            message: body,
        }),
    }
}

fn parse_results(body: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
    let parsed: TavilyResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Malformed(e.to_string()))?;

    Ok(parsed
        .results
        .into_iter()
        .take(max_results)
        .map(|r| SearchResult {
            title: r.title,
            url: r.url,
            content: r.content,
            score: r.score,
        })
        .collect())
}

#[async_trait]
impl WebSearch for TavilySearch {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}/search", self.base_url);
        let body = serde_json::json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": max_results,
        });

        debug!(max_results, "Sending web search request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        if let Some(err) = status_error(status, text.clone()) {
            warn!(status, "Web search returned error");
            return Err(err);
        }

        let results = parse_results(&text, max_results)?;
        debug!(count = results.len(), "Web search complete");
        Ok(results)
    }
}

// --- Tavily wire types ---

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: Option<f32>,
}
