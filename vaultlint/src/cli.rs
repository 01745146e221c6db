// vaultlint/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vaultlint")]
#[command(about = "Declarative validation rules for Obsidian-style note vaults", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the vault (env: OBSIDIAN_VAULT)
    #[arg(long, global = true, env = "OBSIDIAN_VAULT")]
    pub vault: Option<PathBuf>,

    /// Verbose output (info-level logs, info results in the report)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Runs every validation rule against the vault
    Lint {
        /// Explicit path to the rule configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Executes one ad-hoc query against the vault
    Query {
        query: String,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Bypass the in-memory result cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Inspects or clears stored query results
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Lists stored query results
    List,
    /// Removes all stored query results (internal entries are kept)
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_lint_defaults() -> Result<()> {
        let args = Cli::parse_from(["vaultlint", "--vault", "/tmp/vault", "lint"]);
        assert_eq!(args.vault.as_deref().unwrap().to_string_lossy(), "/tmp/vault");
        match args.command {
            Commands::Lint { config, format } => {
                assert_eq!(config, None);
                assert_eq!(format, OutputFormat::Table);
                Ok(())
            }
            _ => bail!("Expected Lint command"),
        }
    }

    #[test]
    fn test_cli_parse_lint_json() -> Result<()> {
        let args = Cli::parse_from([
            "vaultlint",
            "lint",
            "--vault",
            "/tmp/vault",
            "--config",
            "rules.toml",
            "--format",
            "json",
        ]);
        match args.command {
            Commands::Lint { config, format } => {
                assert_eq!(config.as_deref().unwrap().to_string_lossy(), "rules.toml");
                assert_eq!(format, OutputFormat::Json);
                Ok(())
            }
            _ => bail!("Expected Lint command"),
        }
    }

    #[test]
    fn test_cli_parse_query_no_cache() -> Result<()> {
        let args = Cli::parse_from([
            "vaultlint",
            "query",
            "LIST FROM \"Daily\"",
            "--vault",
            "/tmp/vault",
            "--no-cache",
        ]);
        match args.command {
            Commands::Query {
                query, no_cache, ..
            } => {
                assert_eq!(query, "LIST FROM \"Daily\"");
                assert!(no_cache);
                Ok(())
            }
            _ => bail!("Expected Query command"),
        }
    }

    #[test]
    fn test_cli_parse_cache_clear() -> Result<()> {
        let args = Cli::parse_from(["vaultlint", "cache", "clear", "--vault", "/tmp/vault"]);
        match args.command {
            Commands::Cache {
                action: CacheAction::Clear,
            } => Ok(()),
            _ => bail!("Expected Cache clear command"),
        }
    }
}
