// vaultlint-core/src/infrastructure/config.rs

//! Loading, discovery and schema validation of rule configuration files.
//!
//! Both YAML and TOML are accepted (selected by file extension); both parse
//! into a `serde_json::Value` tree first so the schema checks and their error
//! precedence are identical for either format.

use crate::domain::rule::{LintRule, SEVERITY_LEVELS, Severity};
use crate::infrastructure::error::InfrastructureError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Recognized filenames, in discovery order.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".vaultlint.yaml", ".vaultlint.toml"];

pub const SUPPORTED_VERSION: &str = "1.0";

/// A fully validated configuration. Never partially constructed: any schema
/// violation aborts the whole load.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub version: String,
    pub rules: Vec<LintRule>,
    pub variables: Map<String, Value>,
}

pub fn load(path: &Path) -> Result<ValidationConfig, InfrastructureError> {
    info!(path = %path.display(), "loading configuration");

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(InfrastructureError::ConfigNotFound(
                path.display().to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    let tree: Value = if path.extension().is_some_and(|ext| ext == "toml") {
        let parsed: toml::Value = toml::from_str(&text)
            .map_err(|e| InfrastructureError::ConfigError(format!("Invalid TOML syntax: {e}")))?;
        serde_json::to_value(parsed)
            .map_err(|e| InfrastructureError::ConfigError(format!("Invalid TOML syntax: {e}")))?
    } else {
        serde_yaml::from_str(&text)
            .map_err(|e| InfrastructureError::ConfigError(format!("Invalid YAML syntax: {e}")))?
    };

    let config = validate(&tree)?;
    info!(rules = config.rules.len(), "configuration validated");
    Ok(config)
}

/// Discovery order: explicit path (used verbatim), then the current working
/// directory, then the vault root, each trying the recognized filenames in
/// order. Returns `None` when nothing is found; the caller decides whether
/// that is fatal.
pub fn find_config_file(explicit: Option<&Path>, vault_root: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "using explicit config path");
        return Some(path.to_path_buf());
    }

    if let Ok(cwd) = std::env::current_dir() {
        for name in CONFIG_FILE_NAMES {
            let candidate = cwd.join(name);
            if candidate.exists() {
                info!(path = %candidate.display(), "found config in current directory");
                return Some(candidate);
            }
        }
    }

    if let Some(root) = vault_root {
        for name in CONFIG_FILE_NAMES {
            let candidate = root.join(name);
            if candidate.exists() {
                info!(path = %candidate.display(), "found config in vault root");
                return Some(candidate);
            }
        }
    }

    warn!("no configuration file found in any default location");
    None
}

fn invalid(message: impl Into<String>) -> InfrastructureError {
    InfrastructureError::ConfigError(message.into())
}

// Schema checks run in a fixed priority order so error messages stay
// deterministic: top-level presence, version value, rules type, then each
// rule by index.
fn validate(tree: &Value) -> Result<ValidationConfig, InfrastructureError> {
    let Some(root) = tree.as_object() else {
        return Err(invalid("Configuration must be a mapping"));
    };

    let version = root
        .get("version")
        .ok_or_else(|| invalid("Missing required field: 'version'"))?;
    let rules = root
        .get("rules")
        .ok_or_else(|| invalid("Missing required field: 'rules'"))?;

    let version = match version.as_str() {
        Some(v) if v == SUPPORTED_VERSION => v.to_string(),
        _ => {
            return Err(invalid(format!(
                "Invalid version: {}. Expected '{SUPPORTED_VERSION}'",
                render_scalar(version)
            )));
        }
    };

    let rules = rules
        .as_array()
        .ok_or_else(|| invalid("'rules' must be a list"))?;

    let global_variables = match root.get("variables") {
        None => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err(invalid("'variables' must be a mapping")),
    };

    let mut validated = Vec::with_capacity(rules.len());
    for (index, rule) in rules.iter().enumerate() {
        validated.push(validate_rule(rule, index, &global_variables)?);
    }

    Ok(ValidationConfig {
        version,
        rules: validated,
        variables: global_variables,
    })
}

fn validate_rule(
    rule: &Value,
    index: usize,
    global_variables: &Map<String, Value>,
) -> Result<LintRule, InfrastructureError> {
    let Some(fields) = rule.as_object() else {
        return Err(invalid(format!("Rule {index}: Must be a mapping")));
    };

    // Presence first, in a fixed field order.
    for field in ["name", "severity", "query", "assertion", "message"] {
        if !fields.contains_key(field) {
            return Err(invalid(format!(
                "Rule {index}: Missing required field '{field}'"
            )));
        }
    }

    let name = non_blank_string(fields, "name", index)?;

    let severity = match fields.get("severity").and_then(Value::as_str) {
        Some(s) if SEVERITY_LEVELS.contains(&s) => s
            .parse::<Severity>()
            .map_err(|e| invalid(format!("Rule {index}: {e}")))?,
        _ => {
            return Err(invalid(format!(
                "Rule {index}: 'severity' must be one of {SEVERITY_LEVELS:?}, got {}",
                render_scalar(&fields["severity"])
            )));
        }
    };

    let query = non_blank_string(fields, "query", index)?;
    let assertion = non_blank_string(fields, "assertion", index)?;
    let message = non_blank_string(fields, "message", index)?;

    let description = match fields.get("description") {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(invalid(format!(
                "Rule {index}: 'description' must be a string"
            )));
        }
    };

    let mut variables = match fields.get("variables") {
        None => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(invalid(format!(
                "Rule {index}: 'variables' must be a mapping"
            )));
        }
    };

    // Top-level variables apply to every rule; rule-level entries win.
    for (key, value) in global_variables {
        variables.entry(key.clone()).or_insert_with(|| value.clone());
    }

    debug!(rule = %name, index, "rule validated");

    Ok(LintRule {
        name,
        severity,
        query,
        assertion,
        message,
        description,
        variables,
    })
}

fn non_blank_string(
    fields: &Map<String, Value>,
    field: &str,
    index: usize,
) -> Result<String, InfrastructureError> {
    match fields.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(invalid(format!(
            "Rule {index}: '{field}' must be a non-empty string"
        ))),
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}
