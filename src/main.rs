//! OpenTag - emergency medical profiles on a QR code
//!
//! CLI for issuing PIN-protected tags and resolving them the way a first
//! responder's scanner would.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CommandExecutor, InspectCommand, IssueCommand, LookupCommand, ScanCommand};
use opentag::config::OpenTagConfig;

/// OpenTag - emergency medical profiles on a QR code
///
/// Serverless tags carry the whole profile, sealed under a 4-digit PIN, in
/// the tag URL. Online tags carry a tag ID that points into a record store.
#[derive(Parser)]
#[command(name = "opentag")]
#[command(version)]
#[command(about = "PIN-protected emergency medical tags")]
#[command(long_about = None)]
struct Cli {
    /// Verbose output (diagnostics on stderr; RUST_LOG overrides the filter)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.opentag/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a tag for a medical profile
    Issue(IssueCommand),

    /// Resolve a serverless tag URL
    Scan(ScanCommand),

    /// Resolve an online tag from the record store
    Lookup(LookupCommand),

    /// Show how a plaintext record string decodes
    Inspect(InspectCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        init_tracing();
    }

    let config = match &cli.config {
        Some(path) => OpenTagConfig::load_from(path),
        None => OpenTagConfig::load(),
    }
    .context("Failed to load configuration")?;

    match &cli.command {
        Commands::Issue(cmd) => cmd.execute(&config),
        Commands::Scan(cmd) => cmd.execute(&config),
        Commands::Lookup(cmd) => cmd.execute(&config),
        Commands::Inspect(cmd) => cmd.execute(&config),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("opentag=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
