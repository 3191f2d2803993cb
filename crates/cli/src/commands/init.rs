//! `stellar init`: write a default configuration file.

use std::path::Path;

use stellar_config::AppConfig;

use super::CliResult;

pub fn run(config_path: Option<&Path>, force: bool) -> CliResult {
    let path = super::config_path(config_path);

    if path.exists() && !force {
        println!("  Config already exists at: {}", path.display());
        println!("  Edit it manually or re-run with --force to overwrite.");
        return Ok(());
    }

    AppConfig::write_default(&path)?;
    println!("  Created config at: {}", path.display());
    println!();
    println!("  Next steps:");
    println!("   1. export GROQ_API_KEY='gsk_...' (or set api_key in the file)");
    println!("   2. Optionally export TAVILY_API_KEY for web search");
    println!("   3. Run: stellar chat");
    println!();

    Ok(())
}
