//! Toolchainbot CLI
//!
//! Entry point for the toolchainbot command-line application.

use anyhow::Result;
use clap::Parser;

use toolchainbot::cli::output::{display_error, format_summary};
use toolchainbot::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match cli.run() {
        Ok(Some(summary)) => {
            println!("{}", format_summary(&summary));
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(e.exit_code());
        }
    }
}
