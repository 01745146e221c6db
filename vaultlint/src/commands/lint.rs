// vaultlint/src/commands/lint.rs

use crate::cli::OutputFormat;
use crate::render;
use anyhow::{Context, Result};
use std::path::Path;
use vaultlint_core::application::VaultLinter;
use vaultlint_core::infrastructure::BridgeClient;

/// Runs the full lint pipeline. Returns the process exit code: zero when no
/// failed rule has error severity, non-zero otherwise.
pub async fn run(
    vault: &Path,
    config: Option<&Path>,
    format: OutputFormat,
    verbose: bool,
) -> Result<i32> {
    anyhow::ensure!(
        vault.is_dir(),
        "Vault path does not exist or is not a directory: {}",
        vault.display()
    );

    let gateway = BridgeClient::new(vault);
    let linter = VaultLinter::new(vault, &gateway);

    let report = linter
        .lint(config)
        .await
        .context("linting aborted before any rule ran")?;

    match format {
        OutputFormat::Table => render::print_report(&report, verbose),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.to_value())?),
    }

    Ok(if report.has_errors() { 1 } else { 0 })
}
