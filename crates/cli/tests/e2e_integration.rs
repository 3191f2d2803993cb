//! End-to-end integration tests for the Stellar support assistant.
//!
//! These tests drive a full chat session through its public API, from
//! knowledge loading to the prompt the model receives and the history
//! left behind, with the language model and web search scripted.

use std::sync::Arc;
use std::time::Duration;

use stellar_agent::{AssemblySettings, ChatSession, SessionError};
use stellar_config::{AppConfig, ConfigError};
use stellar_core::error::{ProviderError, SearchError};
use stellar_core::message::{Message, Role};
use stellar_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use stellar_core::retrieval::Retrieval;
use stellar_core::search::{SearchResult, WebSearch};
use stellar_memory::HashingEmbedder;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that answers with scripted outcomes in sequence and
/// records every request.
struct ScriptedProvider {
    outcomes: std::sync::Mutex<Vec<Result<String, ProviderError>>>,
    requests: std::sync::Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(outcomes: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            outcomes: std::sync::Mutex::new(outcomes),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn text(answer: &str) -> Self {
        Self::new(vec![Ok(answer.to_string())])
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, n: usize) -> ProviderRequest {
        self.requests.lock().unwrap()[n].clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);

        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            panic!("ScriptedProvider exhausted");
        }
        let text = outcomes.remove(0)?;
        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model,
        })
    }
}

// ── Mock Web Search ──────────────────────────────────────────────────────

enum WebBehaviour {
    Results(Vec<&'static str>),
    Fail,
    Hang,
}

struct ScriptedWebSearch(WebBehaviour);

#[async_trait::async_trait]
impl WebSearch for ScriptedWebSearch {
    fn name(&self) -> &str {
        "e2e_web"
    }

    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        match &self.0 {
            WebBehaviour::Results(snippets) => Ok(snippets
                .iter()
                .take(max_results)
                .map(|s| SearchResult {
                    title: "Result".into(),
                    url: "https://support.example/".into(),
                    content: s.to_string(),
                    score: Some(0.9),
                })
                .collect()),
            WebBehaviour::Fail => Err(SearchError::Unauthorized("invalid key".into())),
            WebBehaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }
}

const SUPPORT_FACTS: [&str; 4] = [
    "Our support hours are 24/7 for premium members, and 9-5 for free users.",
    "You can reset your password by clicking 'Forgot Password' on the login page.",
    "Refunds are processed within 5-7 business days.",
    "We offer a 30-day money-back guarantee on all subscriptions.",
];

async fn support_session(provider: Arc<ScriptedProvider>, web: Option<WebBehaviour>) -> ChatSession {
    let mut builder = ChatSession::builder(provider, Arc::new(HashingEmbedder::default()));
    if let Some(behaviour) = web {
        builder = builder.web_search(Arc::new(ScriptedWebSearch(behaviour)));
    }
    let session = builder.build();
    session.load_knowledge(&SUPPORT_FACTS).await.unwrap();
    session
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn refund_question_is_grounded_in_knowledge() {
    let provider = Arc::new(ScriptedProvider::text("Refunds take 5-7 business days."));
    let session = support_session(provider.clone(), None).await;

    let answer = session.get_response("How long do refunds take?", false).await;
    assert_eq!(answer, "Refunds take 5-7 business days.");

    let request = provider.request(0);
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role(), Role::System);
    assert!(request.messages[0].content().contains("customer service assistant"));

    let user = request.messages[1].content();
    assert!(user.starts_with("Context:\nKnowledge Base Context:\n"));
    assert!(user.contains("Refunds are processed within 5-7 business days."));
    assert!(!user.contains("Web Search Results:"));
    assert!(user.ends_with("\n\nQuestion: How long do refunds take?"));

    let history = session.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content(), "How long do refunds take?");
    assert_eq!(history[1].content(), "Refunds take 5-7 business days.");
}

#[tokio::test]
async fn search_requested_without_credential_answers_from_knowledge() {
    let provider = Arc::new(ScriptedProvider::text("Within a week."));
    let session = support_session(provider.clone(), None).await;

    let reply = session.respond("refund timing", true).await;
    assert!(!reply.is_error);
    let metadata = reply.metadata.unwrap();
    assert_eq!(metadata.web, Retrieval::Skipped);
    assert!(metadata.knowledge.is_found());
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn web_snippets_follow_knowledge_block() {
    let provider = Arc::new(ScriptedProvider::text("It's on the status page."));
    let session = support_session(
        provider.clone(),
        Some(WebBehaviour::Results(vec![
            "Service status is published at status.example.",
            "",
            "Outages are announced on social media.",
            "A fourth result that should be cut.",
        ])),
    )
    .await;

    session.get_response("Is there an outage?", true).await;
    let user = provider.request(0).messages[1].content().to_string();

    let knowledge_at = user.find("Knowledge Base Context:").unwrap();
    let web_at = user.find("Web Search Results:").unwrap();
    assert!(knowledge_at < web_at);
    assert!(user.contains("\n\nWeb Search Results:\n- Service status is published at status.example."));
    assert!(user.contains("- Outages are announced on social media."));
    assert!(!user.contains("A fourth result"));
}

#[tokio::test]
async fn failing_web_search_degrades_gracefully() {
    let provider = Arc::new(ScriptedProvider::text("Refunds take about a week."));
    let session = support_session(provider.clone(), Some(WebBehaviour::Fail)).await;

    let reply = session.respond("How long do refunds take?", true).await;
    assert!(!reply.is_error);
    assert!(reply.metadata.unwrap().web.is_degraded());
    assert!(!provider.request(0).messages[1].content().contains("Web Search Results:"));
    assert_eq!(session.history_len().await, 2);
}

#[tokio::test(start_paused = true)]
async fn hanging_web_search_is_bounded() {
    let provider = Arc::new(ScriptedProvider::text("Answer without the web."));
    let session = ChatSession::builder(provider.clone(), Arc::new(HashingEmbedder::default()))
        .web_search(Arc::new(ScriptedWebSearch(WebBehaviour::Hang)))
        .settings(AssemblySettings {
            search_timeout: Duration::from_secs(5),
            ..AssemblySettings::default()
        })
        .build();
    session.load_knowledge(&SUPPORT_FACTS).await.unwrap();

    let reply = session.respond("refunds", true).await;
    assert!(!reply.is_error);
    assert!(reply.metadata.unwrap().web.is_degraded());
}

#[tokio::test]
async fn generation_failure_leaves_memory_unchanged() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok("Hello! How can I help?".into()),
        Err(ProviderError::RateLimited { retry_after_secs: 5 }),
        Ok("Refunds take 5-7 business days.".into()),
    ]));
    let session = support_session(provider.clone(), None).await;

    session.get_response("Hi", false).await;
    assert_eq!(session.history_len().await, 2);

    let failed = session.get_response("How long do refunds take?", false).await;
    assert!(failed.starts_with("Error generating response: "));
    assert!(failed.len() > "Error generating response: ".len());
    assert_eq!(session.history_len().await, 2);

    // The next turn sees only the successful exchange.
    session.get_response("How long do refunds take?", false).await;
    let retry = provider.request(2);
    assert_eq!(retry.messages.len(), 4);
    assert_eq!(retry.messages[1].content(), "Hi");
    assert_eq!(retry.messages[2].content(), "Hello! How can I help?");
    assert_eq!(session.history_len().await, 4);

    // The transcript shows all three turns.
    assert_eq!(session.transcript().await.len(), 6);
}

#[tokio::test]
async fn history_window_caps_replayed_messages() {
    let outcomes = (0..8).map(|i| Ok(format!("answer {i}"))).collect();
    let provider = Arc::new(ScriptedProvider::new(outcomes));
    let session = support_session(provider.clone(), None).await;

    for i in 0..8 {
        session.get_response(&format!("question {i}"), false).await;
    }

    // 7 completed exchanges precede the last turn; only 10 messages replay.
    let last = provider.request(7);
    assert_eq!(last.messages.len(), 1 + 10 + 1);
    assert_eq!(last.messages[1].content(), "question 2");
    assert_eq!(session.history_len().await, 16);
}

#[tokio::test]
async fn reset_starts_a_fresh_conversation() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok("one".into()), Ok("two".into())]));
    let session = support_session(provider.clone(), None).await;

    session.get_response("first", false).await;
    session.reset().await;
    assert!(session.transcript().await.is_empty());
    assert_eq!(session.history_len().await, 0);

    session.get_response("second", false).await;
    assert_eq!(provider.request(1).messages.len(), 2);
}

#[tokio::test]
async fn exported_history_round_trips() {
    let provider = Arc::new(ScriptedProvider::text("Use 'Forgot Password'."));
    let session = support_session(provider, None).await;
    session.get_response("How do I reset my password?", false).await;

    let json = session.export_history().await.unwrap();
    let messages: Vec<Message> = serde_json::from_str(&json).unwrap();
    let history = session.history().await;
    assert_eq!(messages.len(), history.len());
    for (exported, original) in messages.iter().zip(&history) {
        assert_eq!(exported.id(), original.id());
        assert_eq!(exported.role(), original.role());
        assert_eq!(exported.content(), original.content());
    }
}

#[test]
fn missing_model_credential_is_fatal() {
    let err = ChatSession::from_config(&AppConfig::default()).err().unwrap();
    assert!(matches!(err, SessionError::Config(ConfigError::MissingApiKey(_))));
}

#[test]
fn config_file_drives_session_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
api_key = "gsk_test"
model = "llama-3.1-8b-instant"

[search]
api_key = "tvly-test"
max_results = 2
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(&path).unwrap();
    assert_eq!(config.model, "llama-3.1-8b-instant");
    assert_eq!(config.search.max_results, 2);
    assert_eq!(config.knowledge.top_k, 2);

    let session = ChatSession::from_config(&config).unwrap();
    assert!(session.has_web_search());
}
