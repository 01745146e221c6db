// vaultlint-core/src/infrastructure/templates.rs

//! Placeholder substitution for query and message templates.
//!
//! Placeholders use `{name}` syntax, `{{`/`}}` escape literal braces.
//! Values are encoded before substitution: lists become JSON arrays,
//! bare strings get JSON-quoted (already-quoted strings pass through),
//! booleans are lowercased, numbers keep their decimal form.

use crate::infrastructure::error::InfrastructureError;
use serde_json::{Map, Value};
use tracing::debug;

pub fn substitute(
    template: &str,
    variables: &Map<String, Value>,
) -> Result<String, InfrastructureError> {
    if variables.is_empty() {
        return Ok(template.to_string());
    }

    let mut output = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    output.push('{');
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') => {
                            return Err(InfrastructureError::TemplateError(
                                "nested '{' inside placeholder".to_string(),
                            ));
                        }
                        Some(ch) => name.push(ch),
                        None => {
                            return Err(InfrastructureError::TemplateError(
                                "unmatched '{' in template".to_string(),
                            ));
                        }
                    }
                }
                let value = variables
                    .get(&name)
                    .ok_or_else(|| InfrastructureError::UndefinedVariable(name.clone()))?;
                let encoded = encode(value);
                debug!(variable = %name, encoded = %encoded, "substituted template variable");
                output.push_str(&encoded);
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    output.push('}');
                } else {
                    return Err(InfrastructureError::TemplateError(
                        "single '}' encountered in template".to_string(),
                    ));
                }
            }
            other => output.push(other),
        }
    }

    Ok(output)
}

/// Encodes a variable value for insertion into a query string.
pub fn encode(value: &Value) -> String {
    match value {
        Value::String(s) => {
            if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
                s.clone()
            } else {
                json_literal(value)
            }
        }
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => json_literal(value),
    }
}

// JSON rendering with ", " and ": " separators, so substituted arrays read
// the way the external query engine documents them.
fn json_literal(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(json_literal).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(key, val)| {
                    format!(
                        "{}: {}",
                        serde_json::to_string(key).unwrap_or_default(),
                        json_literal(val)
                    )
                })
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        scalar => serde_json::to_string(scalar).unwrap_or_default(),
    }
}
