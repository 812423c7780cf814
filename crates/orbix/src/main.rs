//! Orbix CLI - directive engine.
//!
//! Provides commands for:
//! - `extract`: List the directives of a response as JSON
//! - `strip`: Print a response without directive markup
//! - `stream`: Show how a partial response renders while streaming
//! - `apply`: Apply a finished response to an app and commit it

mod commands;
mod error;
mod input;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ApplyArgs, ExtractArgs, StreamArgs, StripArgs};
use output::Output;

/// Orbix - directive engine for assistant responses.
#[derive(Parser)]
#[command(name = "orbix", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract directives and diagnostics as JSON.
    Extract(ExtractArgs),
    /// Remove directive markup, leaving prose.
    Strip(StripArgs),
    /// Close unclosed tags and report per-tag state as JSON.
    Stream(StreamArgs),
    /// Apply file directives to an app and commit once.
    Apply(ApplyArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Extract(args) => args.execute(&output),
        Commands::Strip(args) => args.execute(&output),
        Commands::Stream(args) => args.execute(&output),
        Commands::Apply(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
