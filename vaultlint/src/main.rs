// vaultlint/src/main.rs

mod cli;
mod commands;
mod render;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool, debug: bool) {
    // RUST_LOG still wins when set explicitly.
    let default_level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose, args.debug);

    let Some(vault) = args.vault.as_deref() else {
        eprintln!(
            "Error: No vault path provided. Use --vault or set OBSIDIAN_VAULT environment variable."
        );
        std::process::exit(1);
    };
    tracing::debug!(vault = %vault.display(), "vault resolved");

    let outcome = match &args.command {
        Commands::Lint { config, format } => {
            commands::lint::run(vault, config.as_deref(), *format, args.verbose).await
        }
        Commands::Query {
            query,
            format,
            no_cache,
        } => commands::query::run(vault, query, *format, *no_cache).await,
        Commands::Cache { action } => commands::cache::run(vault, action).await,
    };

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}
