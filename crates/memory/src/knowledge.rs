//! In-memory knowledge index over embedded document chunks.
//!
//! One embedding provider is bound to an index for its whole lifetime, and the
//! vector dimension is fixed by the first non-empty insertion. Entries are only
//! ever appended.

use std::sync::Arc;

use stellar_core::embedding::EmbeddingProvider;
use stellar_core::error::KnowledgeError;
use stellar_core::knowledge::{DocumentChunk, ScoredChunk};
use tokio::sync::RwLock;
use tracing::debug;

use crate::vector::top_k;

#[derive(Default)]
struct IndexState {
    chunks: Vec<DocumentChunk>,
    vectors: Vec<Vec<f32>>,
    dims: Option<usize>,
}

pub struct KnowledgeIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    state: RwLock<IndexState>,
}

impl KnowledgeIndex {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            state: RwLock::new(IndexState::default()),
        }
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.chunks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.chunks.is_empty()
    }

    /// Vector dimension, known once something has been inserted.
    pub async fn dims(&self) -> Option<usize> {
        self.state.read().await.dims
    }

    /// Embed and append a batch of chunks.
    ///
    /// The batch is validated as a whole before anything is stored: on error
    /// the index is unchanged.
    pub async fn insert(&self, chunks: Vec<DocumentChunk>) -> Result<usize, KnowledgeError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(KnowledgeError::CountMismatch {
                expected: chunks.len(),
                actual: vectors.len(),
            });
        }

        let mut state = self.state.write().await;
        let dims = state.dims.unwrap_or(vectors[0].len());
        if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
            return Err(KnowledgeError::DimensionMismatch {
                expected: dims,
                actual: bad.len(),
            });
        }

        let count = chunks.len();
        state.dims = Some(dims);
        state.chunks.extend(chunks);
        state.vectors.extend(vectors);

        debug!(
            embedder = self.embedder.name(),
            inserted = count,
            total = state.chunks.len(),
            "Knowledge chunks indexed"
        );
        Ok(count)
    }

    /// The `k` chunks nearest to `query`, most similar first.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, KnowledgeError> {
        if k == 0 {
            return Err(KnowledgeError::InvalidTopK);
        }
        if self.is_empty().await {
            return Ok(Vec::new());
        }

        let mut embedded = self.embedder.embed(&[query.to_string()]).await?;
        if embedded.len() != 1 {
            return Err(KnowledgeError::CountMismatch {
                expected: 1,
                actual: embedded.len(),
            });
        }
        let query_vec = embedded.swap_remove(0);

        let state = self.state.read().await;
        if let Some(dims) = state.dims {
            if query_vec.len() != dims {
                return Err(KnowledgeError::DimensionMismatch {
                    expected: dims,
                    actual: query_vec.len(),
                });
            }
        }

        let hits = top_k(state.vectors.iter().map(Vec::as_slice), &query_vec, k)
            .into_iter()
            .map(|(i, similarity)| ScoredChunk {
                chunk: state.chunks[i].clone(),
                similarity,
            })
            .collect();
        Ok(hits)
    }
}
