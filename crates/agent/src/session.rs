//! The chat session: one conversation with its knowledge and history.
//!
//! A turn runs under a single session lock:
//!
//! 1. **Read** the conversation log
//! 2. **Assemble** the prompt (knowledge and web lookups run concurrently)
//! 3. **Generate** the answer
//! 4. **Record** the exchange in memory, on success only
//!
//! The display transcript records every turn, failed ones included.
//! `reset()` takes the same lock, so it never interleaves with a turn.

use std::sync::Arc;
use std::time::Duration;
use stellar_config::{AppConfig, ConfigError, EmbeddingBackend};
use stellar_core::embedding::EmbeddingProvider;
use stellar_core::error::KnowledgeError;
use stellar_core::knowledge::SourceDocument;
use stellar_core::message::{ConversationId, Message};
use stellar_core::provider::Provider;
use stellar_core::search::WebSearch;
use stellar_memory::{Chunker, ConversationMemory, HashingEmbedder, KnowledgeIndex};
use stellar_providers::RemoteEmbedder;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::context::{AssemblySettings, ContextAssembler};
use crate::generator::{DEFAULT_MODEL, DEFAULT_TIMEOUT, ResponseGenerator};
use crate::reply::Reply;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
}

#[derive(Default)]
struct SessionState {
    memory: ConversationMemory,
    transcript: Vec<Message>,
}

pub struct ChatSession {
    id: ConversationId,
    knowledge: Arc<KnowledgeIndex>,
    chunker: Chunker,
    assembler: ContextAssembler,
    generator: ResponseGenerator,
    state: Mutex<SessionState>,
}

impl ChatSession {
    /// Wire a session from configuration.
    ///
    /// Fails only on configuration problems, most commonly a missing model
    /// credential. An absent search credential just disables web search.
    pub fn from_config(config: &AppConfig) -> Result<Self, SessionError> {
        let provider = stellar_providers::build_from_config(config)?;

        let embedder: Arc<dyn EmbeddingProvider> = match config.embedding.provider {
            EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new(config.embedding.dims)?),
            EmbeddingBackend::Remote => Arc::new(RemoteEmbedder::new(
                provider.clone(),
                config.embedding.model.clone(),
            )),
        };

        let mut builder = Self::builder(provider, embedder)
            .settings(AssemblySettings::from_config(config))
            .model(config.model.clone())
            .temperature(config.temperature)
            .max_tokens(config.max_tokens)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .chunker(Chunker::new(
                config.knowledge.chunk_size,
                config.knowledge.chunk_overlap,
            )?);

        if let Some(web) = stellar_search::from_config(config) {
            builder = builder.web_search(web);
        }

        Ok(builder.build())
    }

    pub fn builder(
        provider: Arc<dyn Provider>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> ChatSessionBuilder {
        ChatSessionBuilder::new(provider, embedder)
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn has_web_search(&self) -> bool {
        self.assembler.has_web_search()
    }

    /// Chunk and index plain reference texts. Returns the number of chunks added.
    pub async fn load_knowledge<S: AsRef<str>>(&self, texts: &[S]) -> Result<usize, KnowledgeError> {
        let chunks = self.chunker.chunk_texts(texts);
        self.index_chunks(chunks).await
    }

    /// Chunk and index labelled source documents.
    pub async fn load_documents(&self, sources: &[SourceDocument]) -> Result<usize, KnowledgeError> {
        let chunks = self.chunker.chunk(sources);
        self.index_chunks(chunks).await
    }

    async fn index_chunks(
        &self,
        chunks: Vec<stellar_core::knowledge::DocumentChunk>,
    ) -> Result<usize, KnowledgeError> {
        if chunks.is_empty() {
            return Ok(0);
        }
        let added = self.knowledge.insert(chunks).await?;
        info!(
            conversation = %self.id,
            added,
            total = self.knowledge.len().await,
            embedder = self.knowledge.embedder_name(),
            "Knowledge loaded"
        );
        Ok(added)
    }

    pub async fn knowledge_len(&self) -> usize {
        self.knowledge.len().await
    }

    /// Answer `query`, returning the answer or an error text. Never fails.
    pub async fn get_response(&self, query: &str, use_search: bool) -> String {
        self.respond(query, use_search).await.text
    }

    /// Run one turn and return the structured reply.
    pub async fn respond(&self, query: &str, use_search: bool) -> Reply {
        let mut state = self.state.lock().await;

        let assembled = self.assembler.assemble(query, &state.memory, use_search).await;
        let prompt = match assembled {
            Ok(prompt) => prompt,
            Err(e) => {
                debug!(conversation = %self.id, error = %e, "Turn rejected");
                return Self::fail(&mut state, query, e.to_string(), None);
            }
        };

        match self.generator.generate(&prompt).await {
            Ok(answer) => {
                state.memory.append_exchange(query, answer.clone());
                state.transcript.push(Message::user(query));
                state.transcript.push(Message::assistant(answer.clone()));

                info!(
                    conversation = %self.id,
                    knowledge_hits = prompt.metadata.knowledge.items().len(),
                    web_hits = prompt.metadata.web.items().len(),
                    degraded = prompt.metadata.is_degraded(),
                    history = state.memory.len(),
                    "Turn complete"
                );
                Reply::answer(answer, prompt.metadata)
            }
            Err(e) => {
                warn!(
                    conversation = %self.id,
                    provider = self.generator.provider_name(),
                    error = %e,
                    "Response generation failed"
                );
                Self::fail(&mut state, query, e.to_string(), Some(prompt.metadata))
            }
        }
    }

    fn fail(
        state: &mut SessionState,
        query: &str,
        reason: String,
        metadata: Option<crate::context::AssemblyMetadata>,
    ) -> Reply {
        let text = format!("Error generating response: {reason}");
        state.transcript.push(Message::user(query));
        state.transcript.push(Message::assistant(text.clone()));
        Reply::error(text, metadata)
    }

    /// Every displayed message, failed turns included.
    pub async fn transcript(&self) -> Vec<Message> {
        self.state.lock().await.transcript.clone()
    }

    /// The conversation log replayed into prompts.
    pub async fn history(&self) -> Vec<Message> {
        self.state.lock().await.memory.all().to_vec()
    }

    pub async fn history_len(&self) -> usize {
        self.state.lock().await.memory.len()
    }

    pub async fn export_history(&self) -> serde_json::Result<String> {
        self.state.lock().await.memory.export_json()
    }

    /// Forget the conversation. The knowledge index is kept.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.memory.clear();
        state.transcript.clear();
        info!(conversation = %self.id, "Conversation reset");
    }
}

/// Explicit wiring for a [`ChatSession`].
pub struct ChatSessionBuilder {
    provider: Arc<dyn Provider>,
    embedder: Arc<dyn EmbeddingProvider>,
    web: Option<Arc<dyn WebSearch>>,
    settings: AssemblySettings,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    timeout: Duration,
    chunker: Chunker,
}

impl ChatSessionBuilder {
    fn new(provider: Arc<dyn Provider>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            embedder,
            web: None,
            settings: AssemblySettings::default(),
            model: DEFAULT_MODEL.to_string(),
            temperature: stellar_core::provider::default_temperature(),
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT,
            chunker: Chunker::default(),
        }
    }

    pub fn web_search(mut self, web: Arc<dyn WebSearch>) -> Self {
        self.web = Some(web);
        self
    }

    pub fn settings(mut self, settings: AssemblySettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn build(self) -> ChatSession {
        let knowledge = Arc::new(KnowledgeIndex::new(self.embedder));

        let mut generator = ResponseGenerator::new(self.provider, self.model)
            .with_temperature(self.temperature)
            .with_timeout(self.timeout);
        if let Some(max_tokens) = self.max_tokens {
            generator = generator.with_max_tokens(max_tokens);
        }

        let session = ChatSession {
            id: ConversationId::new(),
            assembler: ContextAssembler::new(knowledge.clone(), self.web, self.settings),
            knowledge,
            chunker: self.chunker,
            generator,
            state: Mutex::new(SessionState::default()),
        };
        debug!(
            conversation = %session.id,
            model = session.generator.model(),
            web_search = session.has_web_search(),
            "Session created"
        );
        session
    }
}
