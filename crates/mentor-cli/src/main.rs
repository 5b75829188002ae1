//! Mentor command-line interface.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mentor", version, about = "Conversational quiz mentor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive mentor chat
    Chat {
        /// Session ID to continue (defaults to the last active session)
        #[arg(long)]
        session: Option<String>,
    },
    /// Manage stored sessions
    Sessions {
        #[command(subcommand)]
        command: SessionsCommand,
    },
}

#[derive(Subcommand)]
enum SessionsCommand {
    /// List stored sessions, most recent first
    List,
    /// Create a new session for a topic and make it active
    New { topic: String },
    /// Delete a session
    Delete { id: String },
    /// Change a session's topic
    Rename { id: String, topic: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat { session } => commands::chat::run(session).await,
        Commands::Sessions { command } => match command {
            SessionsCommand::List => commands::sessions::list().await,
            SessionsCommand::New { topic } => commands::sessions::new(topic).await,
            SessionsCommand::Delete { id } => commands::sessions::delete(id).await,
            SessionsCommand::Rename { id, topic } => commands::sessions::rename(id, topic).await,
        },
    }
}
