//! Knowledge base value types: source documents, chunks and scored hits.

use serde::{Deserialize, Serialize};

/// A raw reference document before chunking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub text: String,

    /// Human-readable source label (filename, URL, etc.).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SourceDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), source: None }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl From<&str> for SourceDocument {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SourceDocument {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// A bounded-length slice of a source document; the retrieval unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// The text content of this chunk.
    pub text: String,
    /// Source label copied from the parent document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Sequential chunk index within the source document.
    pub index: usize,
    /// Char offset of the chunk's first character within the source text.
    pub offset: usize,
}

impl DocumentChunk {
    /// Length in chars.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A chunk returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    /// Cosine similarity to the query (higher is nearer).
    pub similarity: f32,
}
