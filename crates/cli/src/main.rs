//! Helpdesk CLI — the main entry point.
//!
//! Commands:
//! - `serve`    — Start the HTTP API server
//! - `ask`      — Run one chat turn and print the reply
//! - `history`  — Print a session transcript
//! - `sessions` — List sessions
//! - `status`   — Show resolved configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "helpdesk",
    about = "Helpdesk — documentation-grounded customer support assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $HELPDESK_CONFIG, then ./helpdesk.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question within a session
    Ask {
        /// Session identifier
        #[arg(short, long)]
        session: String,

        /// The question
        message: String,
    },

    /// Print the transcript of a session
    History {
        /// Session identifier
        session: String,
    },

    /// List sessions, most recently active first
    Sessions,

    /// Show system status
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
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Ask { session, message } => {
            commands::ask::run(config_path, session, message).await?
        }
        Commands::History { session } => commands::history::run(config_path, session).await?,
        Commands::Sessions => commands::sessions::run(config_path).await?,
        Commands::Status => commands::status::run(config_path).await?,
    }

    Ok(())
}
