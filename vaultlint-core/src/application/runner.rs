// vaultlint-core/src/application/runner.rs

//! Executes one rule: substitute -> query -> normalize -> assert -> format.
//!
//! Strictly sequential, no retries. Every per-rule problem is caught and
//! turned into a failed `LintResult`; nothing at this layer aborts the run.

use crate::domain::assertion;
use crate::domain::query::{QueryData, QueryResult};
use crate::domain::report::LintResult;
use crate::domain::rule::LintRule;
use crate::error::VaultlintError;
use crate::infrastructure::templates;
use crate::ports::gateway::QueryGateway;
use serde_json::{Map, Value, json};
use std::time::Instant;
use tracing::{debug, error};

const MAX_DISPLAY_ROWS: usize = 5;
const MAX_DISPLAY_LENGTH: usize = 500;

pub struct RuleRunner<'a> {
    gateway: &'a dyn QueryGateway,
}

impl<'a> RuleRunner<'a> {
    pub fn new(gateway: &'a dyn QueryGateway) -> Self {
        RuleRunner { gateway }
    }

    pub async fn run_rule(&self, rule: &LintRule) -> LintResult {
        debug!(rule = %rule.name, "running rule");
        match self.try_run(rule).await {
            Ok(result) => result,
            Err(err) => {
                error!(rule = %rule.name, %err, "rule execution failed");
                exception_result(rule, &err)
            }
        }
    }

    async fn try_run(&self, rule: &LintRule) -> Result<LintResult, VaultlintError> {
        let query_result = self.execute_query(rule).await?;

        if !query_result.success {
            return Ok(query_error_result(rule, &query_result));
        }

        let data = QueryData::from_result(&query_result);

        let passed = match assertion::evaluate(&rule.assertion, &data, &rule.variables) {
            Ok(passed) => passed,
            Err(err) => return Ok(assertion_error_result(rule, &err)),
        };

        if passed {
            return Ok(LintResult::passed(&rule.name, rule.severity));
        }

        let message = format_message(rule, &data);
        Ok(LintResult::failed(
            &rule.name,
            rule.severity,
            message,
            Some(data.to_value()),
        ))
    }

    async fn execute_query(&self, rule: &LintRule) -> Result<QueryResult, VaultlintError> {
        // Substitution failures here are configuration bugs; they propagate
        // up and are caught by run_rule's catch-all.
        let query = templates::substitute(&rule.query, &rule.variables)
            .map_err(VaultlintError::Infrastructure)?;
        debug!(rule = %rule.name, query = %query, "executing query");

        let started = Instant::now();
        let record = self.gateway.execute(&query).await?;
        Ok(QueryResult::from_record(query, record, started.elapsed()))
    }
}

fn format_message(rule: &LintRule, data: &QueryData) -> String {
    let mut variables = Map::new();
    variables.insert("count".to_string(), Value::from(data.row_count()));
    variables.insert(
        "results".to_string(),
        Value::String(format_rows_for_display(&data.rows)),
    );
    for (key, value) in &rule.variables {
        variables.insert(key.clone(), value.clone());
    }

    // Fall back to the raw template when substitution fails; a broken
    // message must not hide the rule failure itself.
    templates::substitute(&rule.message, &variables).unwrap_or_else(|err| {
        debug!(rule = %rule.name, %err, "message substitution failed");
        rule.message.clone()
    })
}

/// Renders up to five representative rows, preferring `path`, then a nested
/// `file.path`, then `name`, then `value`, then the first non-empty field.
fn format_rows_for_display(rows: &[Map<String, Value>]) -> String {
    if rows.is_empty() {
        return "[]".to_string();
    }

    let mut items = Vec::new();
    for row in rows.iter().take(MAX_DISPLAY_ROWS) {
        if let Some(display) = pick_field(row) {
            items.push(display);
        }
    }

    if items.is_empty() {
        let raw = Value::Array(rows.iter().cloned().map(Value::Object).collect()).to_string();
        return if raw.len() > MAX_DISPLAY_LENGTH {
            let truncated: String = raw.chars().take(MAX_DISPLAY_LENGTH).collect();
            format!("{truncated}...")
        } else {
            raw
        };
    }

    let mut display = items.join(", ");
    if rows.len() > MAX_DISPLAY_ROWS {
        display.push_str(&format!(" (and {} more)", rows.len() - MAX_DISPLAY_ROWS));
    }
    display
}

fn pick_field(row: &Map<String, Value>) -> Option<String> {
    row.get("path")
        .map(display_value)
        .or_else(|| {
            row.get("file")
                .and_then(|f| f.get("path"))
                .map(display_value)
        })
        .or_else(|| row.get("name").map(display_value))
        .or_else(|| row.get("value").map(display_value))
        .or_else(|| {
            row.values()
                .find(|v| assertion::truthy(v))
                .map(display_value)
        })
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn query_error_result(rule: &LintRule, query_result: &QueryResult) -> LintResult {
    let error = query_result.error.as_deref().unwrap_or("unknown error");
    LintResult::failed(
        &rule.name,
        rule.severity,
        format!("Query failed: {error}"),
        Some(json!({"query": query_result.query, "error": error})),
    )
}

fn assertion_error_result(rule: &LintRule, err: &crate::domain::error::DomainError) -> LintResult {
    LintResult::failed(
        &rule.name,
        rule.severity,
        format!("Assertion evaluation failed: {err}"),
        Some(json!({"error": err.to_string(), "type": err.kind()})),
    )
}

fn exception_result(rule: &LintRule, err: &VaultlintError) -> LintResult {
    let kind = match err {
        VaultlintError::Domain(domain) => domain.kind(),
        VaultlintError::Infrastructure(_) => "infrastructure",
        VaultlintError::InternalError(_) => "internal",
    };
    LintResult::failed(
        &rule.name,
        rule.severity,
        format!("Rule execution failed: {err}"),
        Some(json!({"error": err.to_string(), "type": kind})),
    )
}
