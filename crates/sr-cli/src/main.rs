//! sqlrun - apply a directory of SQL scripts to PostgreSQL

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;
use commands::{plan, run};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match &cli.command {
        Some(cli::Commands::Plan(args)) => plan::execute(args, &cli.global).await,
        None => run::execute(&cli.run, &cli.global).await,
    }
}

/// Send log records to stderr, filtered by `RUST_LOG` (default `info`).
///
/// Stdout stays reserved for planner output.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
