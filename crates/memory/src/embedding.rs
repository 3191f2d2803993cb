//! Offline feature-hashing embedder.
//!
//! Each lowercase alphanumeric token (and each adjacent token pair) is hashed
//! with SHA-256 into one of `dims` buckets with a sign bit, and the summed
//! vector is L2-normalized. Texts that share vocabulary land close together
//! under cosine similarity, which is enough for FAQ-scale retrieval without a
//! network round-trip or model download.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use stellar_core::embedding::EmbeddingProvider;
use stellar_core::error::KnowledgeError;

use crate::vector::normalize;

pub const DEFAULT_DIMS: usize = 384;

/// Weight of an adjacent-token feature relative to a single token.
const BIGRAM_WEIGHT: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dims: usize,
    name: String,
}

impl HashingEmbedder {
    pub fn new(dims: usize) -> Result<Self, KnowledgeError> {
        if dims == 0 {
            return Err(KnowledgeError::EmbeddingFailed(
                "embedding dimensionality must be > 0".into(),
            ));
        }
        Ok(Self {
            dims,
            name: format!("hashing-{dims}"),
        })
    }

    /// Embed a single text synchronously.
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        let tokens = tokenize(text);

        for token in &tokens {
            self.accumulate(&mut v, token.as_bytes(), 1.0);
        }
        for pair in tokens.windows(2) {
            let feature = format!("{} {}", pair[0], pair[1]);
            self.accumulate(&mut v, feature.as_bytes(), BIGRAM_WEIGHT);
        }

        normalize(&mut v);
        v
    }

    fn accumulate(&self, v: &mut [f32], feature: &[u8], weight: f32) {
        let digest = Sha256::digest(feature);
        let mut bucket = [0u8; 8];
        bucket.copy_from_slice(&digest[..8]);
        let idx = (u64::from_le_bytes(bucket) % self.dims as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        v[idx] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dims: DEFAULT_DIMS,
            name: format!("hashing-{DEFAULT_DIMS}"),
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dims(&self) -> Option<usize> {
        Some(self.dims)
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, KnowledgeError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
