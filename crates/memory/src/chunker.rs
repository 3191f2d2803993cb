//! Overlapping fixed-size text chunker.
//!
//! Splits reference documents into [`DocumentChunk`]s of at most
//! `chunk_size` chars, where consecutive chunks of the same source share
//! exactly `chunk_overlap` chars.
//!
//! # Algorithm
//!
//! 1. Take a window of `chunk_size` chars starting at `start`.
//! 2. If the window does not reach the end of the text and would cut a
//!    word, pull the end back to just after the last whitespace, provided
//!    that whitespace lies past the first `chunk_overlap` chars of the
//!    window. Otherwise cut hard.
//! 3. Emit the window, then continue at `end - chunk_overlap`.
//!
//! Lengths are counted in chars, so multi-byte text is never split inside
//! a code point. The chunk's `offset` is the char position of its first
//! character in the source.

use stellar_core::error::KnowledgeError;
use stellar_core::knowledge::{DocumentChunk, SourceDocument};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    /// Requires `chunk_size > 0` and `chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, KnowledgeError> {
        if chunk_size == 0 {
            return Err(KnowledgeError::InvalidChunking("chunk_size must be > 0".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(KnowledgeError::InvalidChunking(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Chunk plain texts with no source labels.
    pub fn chunk_texts<S: AsRef<str>>(&self, texts: &[S]) -> Vec<DocumentChunk> {
        let docs: Vec<SourceDocument> = texts.iter().map(|t| SourceDocument::new(t.as_ref())).collect();
        self.chunk(&docs)
    }

    /// Chunk every source in order. Empty or whitespace-only sources yield nothing.
    pub fn chunk(&self, sources: &[SourceDocument]) -> Vec<DocumentChunk> {
        sources.iter().flat_map(|doc| self.chunk_one(doc)).collect()
    }

    fn chunk_one(&self, doc: &SourceDocument) -> Vec<DocumentChunk> {
        let text = doc.text.as_str();
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let n = chars.len();
        let byte_at = |i: usize| if i == n { text.len() } else { chars[i].0 };

        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let hard_end = (start + self.chunk_size).min(n);
            let end = if hard_end < n && !chars[hard_end].1.is_whitespace() {
                (start + self.chunk_overlap..hard_end)
                    .rev()
                    .find(|&p| chars[p].1.is_whitespace())
                    .map(|p| p + 1)
                    .unwrap_or(hard_end)
            } else {
                hard_end
            };

            chunks.push(DocumentChunk {
                text: text[byte_at(start)..byte_at(end)].to_string(),
                source: doc.source.clone(),
                index: chunks.len(),
                offset: start,
            });

            if end == n {
                break;
            }
            // end > start + overlap, so this always advances.
            start = end - self.chunk_overlap;
        }

        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}
