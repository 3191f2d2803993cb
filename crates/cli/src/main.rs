//! Stellar CLI: the main entry point.
//!
//! Commands:
//! - `chat`: Interactive support chat (default)
//! - `ask`: Answer a single question and exit
//! - `init`: Write a default config file
//! - `status`: Show configuration and credential status

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "stellar",
    about = "Stellar: AI customer-support assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.stellar/config.toml)
    #[arg(short, long, global = true, env = "STELLAR_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the support assistant
    Chat {
        /// Extra reference documents to load into the knowledge base
        #[arg(short, long = "knowledge", value_name = "FILE")]
        knowledge: Vec<PathBuf>,
    },

    /// Ask a single question
    Ask {
        /// The question
        message: String,

        /// Also search the web for this question
        #[arg(short, long)]
        search: bool,

        /// Extra reference documents to load into the knowledge base
        #[arg(short, long = "knowledge", value_name = "FILE")]
        knowledge: Vec<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command.unwrap_or(Commands::Chat { knowledge: Vec::new() }) {
        Commands::Chat { knowledge } => commands::chat::run(config_path, &knowledge).await?,
        Commands::Ask {
            message,
            search,
            knowledge,
        } => commands::ask::run(config_path, &message, search, &knowledge).await?,
        Commands::Init { force } => commands::init::run(config_path, force)?,
        Commands::Status => commands::status::run(config_path)?,
    }

    Ok(())
}
