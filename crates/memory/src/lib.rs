//! Knowledge and conversation state for Stellar.
//!
//! - [`Chunker`] splits reference documents into overlapping chunks
//! - [`HashingEmbedder`] embeds text offline
//! - [`KnowledgeIndex`] stores embedded chunks and answers top-k queries
//! - [`ConversationMemory`] is the per-session message log

pub mod chunker;
pub mod conversation;
pub mod embedding;
pub mod knowledge;
pub mod vector;

pub use chunker::Chunker;
pub use conversation::ConversationMemory;
pub use embedding::HashingEmbedder;
pub use knowledge::KnowledgeIndex;
pub use vector::{cosine_similarity, normalize, top_k};
