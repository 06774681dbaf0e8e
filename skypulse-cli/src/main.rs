//! Binary crate for the `skypulse` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive city selection
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cmd = cli::Cli::parse();
    tracing::debug!(?cmd, "parsed command line");
    cmd.run().await
}
