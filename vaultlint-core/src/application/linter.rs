// vaultlint-core/src/application/linter.rs

//! Full-run orchestration: locate + load the config, run every rule in
//! declared order, aggregate into a report.
//!
//! Configuration problems are fatal and abort before any rule executes;
//! per-rule problems become report entries, never aborts.

use crate::application::runner::RuleRunner;
use crate::domain::report::LintReport;
use crate::error::VaultlintError;
use crate::infrastructure::config;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::gateway::QueryGateway;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct VaultLinter<'a> {
    vault_path: PathBuf,
    gateway: &'a dyn QueryGateway,
}

impl<'a> VaultLinter<'a> {
    pub fn new(vault_path: impl Into<PathBuf>, gateway: &'a dyn QueryGateway) -> Self {
        VaultLinter {
            vault_path: vault_path.into(),
            gateway,
        }
    }

    pub async fn lint(&self, config_path: Option<&Path>) -> Result<LintReport, VaultlintError> {
        let started = Instant::now();

        let config_file = config::find_config_file(config_path, Some(&self.vault_path))
            .ok_or_else(|| {
                InfrastructureError::ConfigNotFound(format!(
                    "No validation config file found. Expected {} or {} in vault root or current directory.",
                    config::CONFIG_FILE_NAMES[0],
                    config::CONFIG_FILE_NAMES[1],
                ))
            })?;

        let config = config::load(&config_file).map_err(VaultlintError::Infrastructure)?;
        info!(rules = config.rules.len(), config = %config_file.display(), "starting lint run");

        let mut report = LintReport::new(self.vault_path.display().to_string());
        let runner = RuleRunner::new(self.gateway);

        for rule in &config.rules {
            let result = runner.run_rule(rule).await;
            if result.passed {
                debug!(rule = %rule.name, "rule passed");
            } else {
                warn!(rule = %rule.name, message = %result.message, "rule failed");
            }
            report.add_result(result);
        }

        info!(
            elapsed = ?started.elapsed(),
            total = report.total_rules(),
            passed = report.passed_count(),
            failed = report.failed_count(),
            errors = report.error_count(),
            warnings = report.warning_count(),
            "lint run completed"
        );

        Ok(report)
    }
}
