mod cli;
mod config;
mod db;
mod knowledge;
mod server;
mod tools;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "scriptorium",
    version,
    about = "Knowledge-base MCP server with automatic cross-referencing"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server
    Serve {
        /// Transport to use: stdio or http (defaults to the configured transport)
        #[arg(long)]
        transport: Option<String>,
    },
    /// Export all categories, topics, and relations as JSON to stdout
    Export,
    /// Import categories, topics, and relations from an export file
    Import {
        /// Path to the JSON export
        file: PathBuf,
    },
    /// Show a topic with its history and relations
    Inspect {
        /// Topic id, name, or slug
        topic: String,
    },
    /// Show knowledge-base statistics
    Stats,
    /// Run database diagnostics
    Doctor,
    /// Delete all knowledge (asks for confirmation)
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::ScriptoriumConfig::load()?;

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { transport } => {
            let transport = transport.unwrap_or_else(|| config.server.transport.clone());
            match transport.as_str() {
                "stdio" => server::serve_stdio(config).await?,
                "http" | "sse" => server::serve_http(config).await?,
                other => bail!("unknown transport: {other} (expected stdio or http)"),
            }
        }
        Command::Export => cli::export::export(&config)?,
        Command::Import { file } => cli::import::import(&config, &file)?,
        Command::Inspect { topic } => cli::inspect::inspect(&config, &topic)?,
        Command::Stats => cli::stats::stats(&config)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
        Command::Reset => cli::reset::reset(&config)?,
    }

    Ok(())
}
