//! Shared test doubles for assembler, generator and session tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use stellar_core::embedding::EmbeddingProvider;
use stellar_core::error::{KnowledgeError, ProviderError, SearchError};
use stellar_core::message::Message;
use stellar_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use stellar_core::search::{SearchResult, WebSearch};
use stellar_memory::HashingEmbedder;

/// A provider that returns a sequence of scripted outcomes and records
/// every request it receives.
///
/// When the script runs out, the last outcome repeats.
pub struct ScriptedProvider {
    outcomes: Mutex<Vec<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(outcomes: Vec<Result<String, ProviderError>>) -> Self {
        assert!(!outcomes.is_empty(), "ScriptedProvider needs at least one outcome");
        Self {
            outcomes: Mutex::new(outcomes),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn text(answer: &str) -> Self {
        Self::new(vec![Ok(answer.to_string())])
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(ProviderError::Network("connection refused".into()))])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The final user message of the most recent request.
    pub fn last_user_message(&self) -> String {
        let requests = self.requests.lock().unwrap();
        let last = requests.last().expect("no requests recorded");
        last.messages.last().map(|m| m.content().to_string()).unwrap_or_default()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);

        let mut outcomes = self.outcomes.lock().unwrap();
        let outcome = if outcomes.len() > 1 {
            outcomes.remove(0)
        } else {
            outcomes[0].clone()
        };

        outcome.map(|text| make_text_response(&text, &model))
    }
}

/// A provider that sleeps before answering.
pub struct SlowProvider {
    pub delay: Duration,
}

#[async_trait]
impl Provider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(make_text_response("too late", &request.model))
    }
}

pub fn make_text_response(text: &str, model: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: model.to_string(),
    }
}

/// Web search returning fixed results, recording each query.
pub struct MockWebSearch {
    results: Vec<SearchResult>,
    queries: Mutex<Vec<String>>,
}

impl MockWebSearch {
    pub fn new(snippets: &[&str]) -> Self {
        Self {
            results: snippets.iter().map(|s| SearchResult::snippet(*s)).collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl WebSearch for MockWebSearch {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

pub struct FailingWebSearch;

#[async_trait]
impl WebSearch for FailingWebSearch {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        Err(SearchError::RateLimited)
    }
}

pub struct SlowWebSearch {
    pub delay: Duration,
}

#[async_trait]
impl WebSearch for SlowWebSearch {
    fn name(&self) -> &str {
        "slow"
    }

    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![SearchResult::snippet("late result")])
    }
}

/// Hashing embedder that can be switched off, so an index can be filled
/// and then lose its embedding backend.
pub struct OutageEmbedder {
    inner: HashingEmbedder,
    down: AtomicBool,
}

impl OutageEmbedder {
    pub fn new() -> Self {
        Self {
            inner: HashingEmbedder::default(),
            down: AtomicBool::new(false),
        }
    }

    pub fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmbeddingProvider for OutageEmbedder {
    fn name(&self) -> &str {
        "outage"
    }

    fn dims(&self) -> Option<usize> {
        self.inner.dims()
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, KnowledgeError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(KnowledgeError::EmbeddingFailed("embedding service down".into()));
        }
        self.inner.embed(texts).await
    }
}
