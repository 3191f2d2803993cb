//! `stellar ask`: answer one question and exit.

use std::path::{Path, PathBuf};

use super::CliResult;

pub async fn run(
    config_path: Option<&Path>,
    message: &str,
    search: bool,
    knowledge: &[PathBuf],
) -> CliResult {
    let config = super::load_config(config_path)?;
    let session = super::start_session(&config, knowledge).await?;

    if search && !session.has_web_search() {
        eprintln!("  Note: web search is not configured (set TAVILY_API_KEY); using the knowledge base only.");
    }

    let reply = session.respond(message, search).await;
    println!("{}", reply.text);

    if reply.is_error {
        return Err("Failed to generate a response".into());
    }
    Ok(())
}
