//! `stellar status`: show configuration status.

use std::path::Path;

use super::CliResult;

pub fn run(config_path: Option<&Path>) -> CliResult {
    let path = super::config_path(config_path);
    let config = super::load_config(config_path)?;

    let present = |yes: bool| if yes { "configured" } else { "missing" };

    println!("Stellar Status");
    println!("==============");
    println!("  Config file:   {}", path.display());
    println!("  Provider:      {}", config.provider);
    println!("  Model:         {}", config.model);
    println!("  Temperature:   {}", config.temperature);
    println!("  API key:       {}", present(config.has_api_key()));
    println!("  Web search:    {}", present(config.has_search_key()));
    println!("  Embedding:     {:?} ({} dims)", config.embedding.provider, config.embedding.dims);
    println!(
        "  Chunking:      {} chars, {} overlap",
        config.knowledge.chunk_size, config.knowledge.chunk_overlap
    );
    println!("  Top-k:         {}", config.knowledge.top_k);
    println!("  Seed facts:    {}", config.knowledge.seed.len());
    println!("  History limit: {}", config.conversation.history_limit);

    if path.exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file, using defaults (run `stellar init` to create one)");
    }

    Ok(())
}
