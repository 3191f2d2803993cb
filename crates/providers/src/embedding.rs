//! Remote embedding provider backed by a chat provider's `/embeddings` endpoint.

use async_trait::async_trait;
use std::sync::Arc;
use stellar_core::embedding::EmbeddingProvider;
use stellar_core::error::KnowledgeError;
use stellar_core::provider::{EmbeddingRequest, Provider};
use tracing::debug;

/// Embeds text through [`Provider::embed`] with a fixed model.
pub struct RemoteEmbedder {
    provider: Arc<dyn Provider>,
    model: String,
}

impl RemoteEmbedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> Option<usize> {
        None
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, KnowledgeError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = %self.provider.name(), model = %self.model, count = texts.len(), "Embedding texts");

        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: texts.to_vec(),
            })
            .await
            .map_err(|e| KnowledgeError::EmbeddingFailed(e.to_string()))?;

        if response.embeddings.len() != texts.len() {
            return Err(KnowledgeError::CountMismatch {
                expected: texts.len(),
                actual: response.embeddings.len(),
            });
        }

        Ok(response.embeddings)
    }
}
