//! Subcommand implementations and the session setup they share.

pub mod ask;
pub mod chat;
pub mod init;
pub mod status;

use std::path::{Path, PathBuf};

use stellar_agent::{ChatSession, SessionError};
use stellar_config::{AppConfig, ConfigError};
use stellar_core::knowledge::SourceDocument;
use tracing::{debug, info};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map(Path::to_path_buf).unwrap_or_else(AppConfig::config_path)
}

pub fn load_config(explicit: Option<&Path>) -> CliResult<AppConfig> {
    let path = config_path(explicit);
    debug!(path = %path.display(), "Loading configuration");
    AppConfig::load_with_env(&path).map_err(|e| format!("Failed to load config: {e}").into())
}

/// Build a session and load the seed knowledge plus any extra files.
pub async fn start_session(config: &AppConfig, knowledge_files: &[PathBuf]) -> CliResult<ChatSession> {
    let session = match ChatSession::from_config(config) {
        Ok(session) => session,
        Err(SessionError::Config(ConfigError::MissingApiKey(provider))) => {
            print_key_help(&provider);
            return Err("No API key found. See above for setup instructions.".into());
        }
        Err(e) => return Err(e.into()),
    };

    session.load_knowledge(config.knowledge.seed.as_slice()).await?;

    let mut documents = Vec::with_capacity(knowledge_files.len());
    for path in knowledge_files {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        documents.push(SourceDocument::new(text).with_source(path.display().to_string()));
    }
    session.load_documents(&documents).await?;

    let chunks = session.knowledge_len().await;
    info!(
        session = %session.id(),
        chunks,
        extra_files = knowledge_files.len(),
        web_search = session.has_web_search(),
        "Session ready"
    );
    Ok(session)
}

fn print_key_help(provider: &str) {
    eprintln!();
    eprintln!("  ERROR: No API key configured for provider '{provider}'!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    export GROQ_API_KEY='gsk_...'      (recommended)");
    eprintln!("    export STELLAR_API_KEY='...'       (generic)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_path().display());
    eprintln!();
    eprintln!("  Optional web search: export TAVILY_API_KEY='tvly-...'");
    eprintln!("  Get a Groq key at: https://console.groq.com/keys");
    eprintln!();
}
