//! # Stellar Core
//!
//! Domain types, traits, and error definitions for the Stellar support
//! assistant. This crate has **no service dependencies**. It defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (language model, embedding model, web search)
//! is a trait here. Implementations live in their respective crates, so tests
//! swap in scripted mocks and the dependency graph points inward on core.

pub mod error;
pub mod message;
pub mod provider;
pub mod embedding;
pub mod search;
pub mod knowledge;
pub mod retrieval;

// Re-export key types at crate root for ergonomics
pub use error::{Error, KnowledgeError, ProviderError, Result, SearchError};
pub use message::{ConversationId, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use embedding::EmbeddingProvider;
pub use search::{SearchResult, WebSearch};
pub use knowledge::{DocumentChunk, ScoredChunk, SourceDocument};
pub use retrieval::Retrieval;
