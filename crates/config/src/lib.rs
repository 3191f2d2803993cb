//! Configuration loading, validation, and management for Stellar.
//!
//! Loads configuration from `~/.stellar/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful customer service assistant. \
Use the provided context to answer questions accurately. If you don't know something, say so.";

/// The root configuration structure.
///
/// Maps directly to `~/.stellar/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language-model API key (required before a session can start)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// LLM provider name
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Chat model
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Bound on a single language-model call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Fixed system instruction placed first in every prompt
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Provider-specific overrides (api_url, api_key)
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    #[serde(default)]
    pub conversation: ConversationConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

fn default_provider() -> String {
    "groq".into()
}
fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("system_prompt", &self.system_prompt)
            .field("providers", &self.providers)
            .field("embedding", &self.embedding)
            .field("knowledge", &self.knowledge)
            .field("conversation", &self.conversation)
            .field("search", &self.search)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Which embedding backend the knowledge index uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// Offline feature-hashing embedder
    #[default]
    Hashing,
    /// The configured provider's `/embeddings` endpoint
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingBackend,

    /// Remote embedding model (ignored by the hashing backend)
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector size of the hashing backend
    #[serde(default = "default_embedding_dims")]
    pub dims: usize,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_embedding_dims() -> usize {
    384
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::default(),
            model: default_embedding_model(),
            dims: default_embedding_dims(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Max chars per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chars shared by consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks retrieved per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Reference texts loaded into the index at session start
    #[serde(default = "default_seed")]
    pub seed: Vec<String>,
}

fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    200
}
fn default_top_k() -> usize {
    2
}
fn default_seed() -> Vec<String> {
    vec![
        "Our support hours are 24/7 for premium members, and 9-5 for free users.".into(),
        "You can reset your password by clicking 'Forgot Password' on the login page.".into(),
        "Refunds are processed within 5-7 business days.".into(),
        "We offer a 30-day money-back guarantee on all subscriptions.".into(),
    ]
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Most recent messages replayed into each prompt
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_history_limit() -> usize {
    10
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Web search credential; absent disables web search entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Max chars kept from each snippet
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,

    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_base_url() -> String {
    "https://api.tavily.com".into()
}
fn default_max_results() -> usize {
    3
}
fn default_snippet_chars() -> usize {
    200
}
fn default_search_timeout_secs() -> u64 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_search_base_url(),
            max_results: default_max_results(),
            snippet_chars: default_snippet_chars(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .field("snippet_chars", &self.snippet_chars)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.stellar/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_path())
    }

    /// Load from `path`, then apply environment overrides:
    /// - `STELLAR_API_KEY`, then `GROQ_API_KEY` (model credential)
    /// - `TAVILY_API_KEY` (search credential)
    /// - `STELLAR_PROVIDER`, `STELLAR_MODEL`
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.clear_blank_credentials();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup. Unset or empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| non_blank(lookup(key));

        self.clear_blank_credentials();

        if self.api_key.is_none() {
            self.api_key = get("STELLAR_API_KEY").or_else(|| get("GROQ_API_KEY"));
        }

        if self.search.api_key.is_none() {
            self.search.api_key = get("TAVILY_API_KEY");
        }

        if let Some(provider) = get("STELLAR_PROVIDER") {
            self.provider = provider;
        }

        if let Some(model) = get("STELLAR_MODEL") {
            self.model = model;
        }
    }

    /// Treat blank or whitespace-only credentials as unset.
    pub fn clear_blank_credentials(&mut self) {
        self.api_key = non_blank(self.api_key.take());
        self.search.api_key = non_blank(self.search.api_key.take());
        for provider in self.providers.values_mut() {
            provider.api_key = non_blank(provider.api_key.take());
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".stellar")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        if self.knowledge.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "knowledge.chunk_size must be > 0".into(),
            ));
        }

        if self.knowledge.chunk_overlap >= self.knowledge.chunk_size {
            return Err(ConfigError::ValidationError(
                "knowledge.chunk_overlap must be smaller than knowledge.chunk_size".into(),
            ));
        }

        if self.knowledge.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "knowledge.top_k must be > 0".into(),
            ));
        }

        if self.embedding.dims == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.dims must be > 0".into(),
            ));
        }

        if self.search.max_results == 0 || self.search.snippet_chars == 0 {
            return Err(ConfigError::ValidationError(
                "search.max_results and search.snippet_chars must be > 0".into(),
            ));
        }

        if self.search.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "search.timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if a model API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.require_api_key().is_ok()
    }

    /// The model API key, or the fatal configuration error.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(self.provider.clone()))
    }

    /// Whether web search can be used at all.
    pub fn has_search_key(&self) -> bool {
        self.search
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Write the default configuration to `path`, creating parent directories.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        let write_err = |e: std::io::Error| ConfigError::WriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, Self::default_toml()).map_err(write_err)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            system_prompt: default_system_prompt(),
            providers: HashMap::new(),
            embedding: EmbeddingConfig::default(),
            knowledge: KnowledgeConfig::default(),
            conversation: ConversationConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("No API key configured for provider '{0}' (set GROQ_API_KEY or STELLAR_API_KEY)")]
    MissingApiKey(String),

    #[error("Failed to write config file at {path}: {reason}")]
    WriteError { path: PathBuf, reason: String },
}
