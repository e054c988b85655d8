//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod location;
pub mod resolve;
pub mod search;
pub mod submit;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Find a clinic location and register it
#[derive(Parser)]
#[command(name = "clinic-locator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for places
    Search(search::SearchArgs),

    /// Resolve a location to a postal address
    Resolve(resolve::ResolveArgs),

    /// Resolve a location and register it as a clinic
    Submit(submit::SubmitArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => search::run(args).await,
        Commands::Resolve(args) => resolve::run(args).await,
        Commands::Submit(args) => submit::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}

/// Initialize stderr logging; RUST_LOG takes precedence over `level`
pub fn init_logging(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
