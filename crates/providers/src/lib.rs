//! LLM provider implementations for Stellar.
//!
//! All providers implement the `stellar_core::Provider` trait.
//! `router::build_from_config` selects the configured backend.

pub mod embedding;
pub mod openai_compat;
pub mod router;

pub use embedding::RemoteEmbedder;
pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
