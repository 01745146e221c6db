// vaultlint-core/src/domain/report.rs

use crate::domain::rule::Severity;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

/// Outcome of one rule execution. Immutable once created; `message` is empty
/// and `details` is absent when the rule passed.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub rule_name: String,
    pub severity: Severity,
    pub passed: bool,
    pub message: String,
    pub details: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

impl LintResult {
    pub fn passed(rule_name: impl Into<String>, severity: Severity) -> Self {
        LintResult {
            rule_name: rule_name.into(),
            severity,
            passed: true,
            message: String::new(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(
        rule_name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        LintResult {
            rule_name: rule_name.into(),
            severity,
            passed: false,
            message: message.into(),
            details,
            timestamp: Utc::now(),
        }
    }

}

/// Aggregated results for one lint run. All counts are recomputed from the
/// result sequence on demand, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    pub vault_path: String,
    pub run_timestamp: DateTime<Utc>,
    pub results: Vec<LintResult>,
}

impl LintReport {
    pub fn new(vault_path: impl Into<String>) -> Self {
        LintReport {
            vault_path: vault_path.into(),
            run_timestamp: Utc::now(),
            results: Vec::new(),
        }
    }

    pub fn add_result(&mut self, result: LintResult) {
        self.results.push(result);
    }

    pub fn total_rules(&self) -> usize {
        self.results.len()
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    fn failed_with(&self, severity: Severity) -> usize {
        self.results
            .iter()
            .filter(|r| !r.passed && r.severity == severity)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.failed_with(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.failed_with(Severity::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.failed_with(Severity::Info)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &LintResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &LintResult> {
        self.results.iter().filter(move |r| r.severity == severity)
    }

    pub fn summary(&self) -> Value {
        json!({
            "vault_path": self.vault_path,
            "run_timestamp": self.run_timestamp.to_rfc3339(),
            "total_rules": self.total_rules(),
            "passed": self.passed_count(),
            "failed": self.failed_count(),
            "errors": self.error_count(),
            "warnings": self.warning_count(),
            "info": self.info_count(),
            "has_errors": self.has_errors(),
            "has_failures": self.has_failures(),
        })
    }

    pub fn to_value(&self) -> Value {
        json!({
            "summary": self.summary(),
            "results": self.results,
        })
    }
}
