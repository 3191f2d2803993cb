//! Embedding provider trait.
//!
//! An embedding provider maps text to fixed-length vectors. The knowledge
//! index holds exactly one provider for its whole lifetime, so every stored
//! vector comes from the same model.

use async_trait::async_trait;
use crate::error::KnowledgeError;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// The model identifier (e.g. `"hashing-384"`, `"text-embedding-3-small"`).
    fn name(&self) -> &str;

    /// Vector dimensionality, if known before the first call.
    fn dims(&self) -> Option<usize>;

    /// Embed a batch of texts. Returns one vector per input, in input order.
    ///
    /// Must be deterministic for a given provider version.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, KnowledgeError>;
}
