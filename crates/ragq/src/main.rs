//! RAG question-answering service - entry point.
//!
//! Lives in the `ragq` facade crate to avoid doc output filename collision
//! with the `ragq` library crate (cargo issue #6313).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for the RAG question-answering service.
#[derive(Parser, Debug)]
#[command(name = "ragq")]
#[command(about = "RAG question-answering service")]
#[command(version)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default if no subcommand is given).
    Serve,
    /// Roll a knowledge entry back to a prior version, re-embedding and
    /// re-indexing its restored content.
    Restore {
        /// The knowledge entry to roll back.
        entry_id: String,
        /// The version number to restore.
        version: u32,
        /// Attributed actor for the resulting version record.
        #[arg(long, default_value = "cli")]
        actor: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => ragq::serve(config_path).await?,
        Command::Restore { entry_id, version, actor } => {
            ragq::restore(config_path, &entry_id, version, &actor).await?;
            println!("restored {entry_id} to version {version}");
        }
    }

    Ok(())
}
