//! Context assembly: turns a user query into a complete prompt.
//!
//! The prompt has three parts, in order:
//!
//! 1. **System** instruction, fixed per session
//! 2. **History**, the last `history_limit` messages of the conversation
//! 3. **User** message, carrying the retrieved context ahead of the question
//!
//! Two evidence sources feed the context: the knowledge index (always
//! consulted) and web search (only on request, and only when configured).
//! They are queried concurrently. Neither can fail the turn; each reports a
//! [`Retrieval`] outcome that is kept in the prompt metadata.
//!
//! # Determinism
//!
//! Given the same retrieval outcomes and history, assembly produces the same
//! messages. No time-dependent logic is used when building the text.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use stellar_config::AppConfig;
use stellar_core::error::SearchError;
use stellar_core::knowledge::ScoredChunk;
use stellar_core::message::Message;
use stellar_core::retrieval::Retrieval;
use stellar_core::search::{SearchResult, WebSearch};
use stellar_memory::{ConversationMemory, KnowledgeIndex};
use tracing::{debug, warn};

const KNOWLEDGE_HEADER: &str = "Knowledge Base Context:";
const WEB_HEADER: &str = "Web Search Results:";

// ── Types ─────────────────────────────────────────────────────────────────

/// Tunables for prompt construction.
#[derive(Debug, Clone)]
pub struct AssemblySettings {
    /// Instruction placed first in every prompt.
    pub system_prompt: String,
    /// Knowledge chunks retrieved per query.
    pub top_k: usize,
    /// Most recent history messages replayed into the prompt.
    pub history_limit: usize,
    /// Max chars kept from each web snippet.
    pub snippet_chars: usize,
    /// Web results requested per query.
    pub search_max_results: usize,
    /// Bound on a single web search call.
    pub search_timeout: Duration,
}

impl Default for AssemblySettings {
    fn default() -> Self {
        Self {
            system_prompt: stellar_config::DEFAULT_SYSTEM_PROMPT.to_string(),
            top_k: 2,
            history_limit: 10,
            snippet_chars: 200,
            search_max_results: 3,
            search_timeout: Duration::from_secs(10),
        }
    }
}

impl AssemblySettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            system_prompt: config.system_prompt.clone(),
            top_k: config.knowledge.top_k,
            history_limit: config.conversation.history_limit,
            snippet_chars: config.search.snippet_chars,
            search_max_results: config.search.max_results,
            search_timeout: Duration::from_secs(config.search.timeout_secs),
        }
    }
}

/// What went into a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    pub knowledge: Retrieval<ScoredChunk>,
    pub web: Retrieval<SearchResult>,
    /// History messages included in the prompt.
    pub history_included: usize,
    /// History messages the session holds.
    pub history_total: usize,
}

impl AssemblyMetadata {
    /// True when any evidence source failed.
    pub fn is_degraded(&self) -> bool {
        self.knowledge.is_degraded() || self.web.is_degraded()
    }
}

/// A prompt ready for the language model.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    /// System instruction, history window, then the user message.
    pub messages: Vec<Message>,
    /// The evidence text embedded in the user message, if any.
    pub context: Option<String>,
    pub metadata: AssemblyMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("Query is empty")]
    EmptyQuery,
}

// ── Assembler ─────────────────────────────────────────────────────────────

pub struct ContextAssembler {
    knowledge: Arc<KnowledgeIndex>,
    web: Option<Arc<dyn WebSearch>>,
    settings: AssemblySettings,
}

impl ContextAssembler {
    pub fn new(
        knowledge: Arc<KnowledgeIndex>,
        web: Option<Arc<dyn WebSearch>>,
        settings: AssemblySettings,
    ) -> Self {
        Self {
            knowledge,
            web,
            settings,
        }
    }

    pub fn settings(&self) -> &AssemblySettings {
        &self.settings
    }

    pub fn has_web_search(&self) -> bool {
        self.web.is_some()
    }

    /// Build the prompt for `query` given the session's conversation memory.
    pub async fn assemble(
        &self,
        query: &str,
        history: &ConversationMemory,
        use_search: bool,
    ) -> Result<AssembledPrompt, AssemblyError> {
        if query.trim().is_empty() {
            return Err(AssemblyError::EmptyQuery);
        }

        let (knowledge, web) = tokio::join!(
            self.retrieve_knowledge(query),
            self.retrieve_web(query, use_search)
        );

        let blocks: Vec<String> = [
            knowledge_block(knowledge.items()),
            web_block(web.items(), self.settings.snippet_chars),
        ]
        .into_iter()
        .flatten()
        .collect();
        let context = (!blocks.is_empty()).then(|| blocks.join("\n\n"));

        let window = history.recent(self.settings.history_limit);

        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(Message::system(self.settings.system_prompt.clone()));
        messages.extend(window.iter().cloned());
        messages.push(Message::user(user_content(query, context.as_deref())));

        debug!(
            knowledge_hits = knowledge.items().len(),
            web_hits = web.items().len(),
            history = window.len(),
            "Prompt assembled"
        );

        Ok(AssembledPrompt {
            messages,
            context,
            metadata: AssemblyMetadata {
                knowledge,
                web,
                history_included: window.len(),
                history_total: history.len(),
            },
        })
    }

    async fn retrieve_knowledge(&self, query: &str) -> Retrieval<ScoredChunk> {
        match self.knowledge.search(query, self.settings.top_k).await {
            Ok(hits) => Retrieval::from_items(hits),
            Err(e) => {
                warn!(error = %e, "Knowledge lookup failed, continuing without it");
                Retrieval::Degraded(e.to_string())
            }
        }
    }

    async fn retrieve_web(&self, query: &str, use_search: bool) -> Retrieval<SearchResult> {
        if !use_search {
            return Retrieval::Skipped;
        }
        let Some(web) = &self.web else {
            debug!("Web search requested but not configured");
            return Retrieval::Skipped;
        };

        let timeout = self.settings.search_timeout;
        let outcome = tokio::time::timeout(
            timeout,
            web.search(query, self.settings.search_max_results),
        )
        .await
        .unwrap_or(Err(SearchError::Timeout(timeout.as_secs())));

        match outcome {
            Ok(results) => Retrieval::from_items(
                results
                    .into_iter()
                    .filter(|r| !r.content.trim().is_empty())
                    .take(self.settings.search_max_results)
                    .collect(),
            ),
            Err(e) => {
                warn!(backend = web.name(), error = %e, "Web search failed, continuing without it");
                Retrieval::Degraded(e.to_string())
            }
        }
    }
}

fn knowledge_block(hits: &[ScoredChunk]) -> Option<String> {
    if hits.is_empty() {
        return None;
    }
    let body: Vec<&str> = hits.iter().map(|h| h.chunk.text.as_str()).collect();
    Some(format!("{KNOWLEDGE_HEADER}\n{}", body.join("\n")))
}

fn web_block(results: &[SearchResult], snippet_chars: usize) -> Option<String> {
    if results.is_empty() {
        return None;
    }
    let lines: Vec<String> = results
        .iter()
        .map(|r| format!("- {}", truncate_chars(&r.content, snippet_chars)))
        .collect();
    Some(format!("{WEB_HEADER}\n{}", lines.join("\n")))
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

fn user_content(query: &str, context: Option<&str>) -> String {
    match context {
        Some(ctx) => format!("Context:\n{ctx}\n\nQuestion: {query}"),
        None => query.to_string(),
    }
}
