// vaultlint-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(vaultlint::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG ---
    #[error("Configuration file not found: {0}")]
    #[diagnostic(code(vaultlint::infra::config_missing))]
    ConfigNotFound(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(vaultlint::infra::config),
        help("Check the rule file against the documented schema (version, rules[]).")
    )]
    ConfigError(String),

    // --- BRIDGE STORE (shared JSON document) ---
    #[error("Bridge store not found at '{0}'")]
    #[diagnostic(
        code(vaultlint::infra::store_missing),
        help("Is the vault bridge plugin installed and enabled for this vault?")
    )]
    StoreNotFound(String),

    #[error("Bridge store parsing error: {0}")]
    #[diagnostic(code(vaultlint::infra::store_parse))]
    StoreParse(#[from] serde_json::Error),

    // --- TEMPLATING ---
    #[error("Undefined variable in template: '{0}'")]
    #[diagnostic(
        code(vaultlint::infra::template_undefined),
        help("Every {{name}} placeholder must have a matching variable.")
    )]
    UndefinedVariable(String),

    #[error("Template formatting error: {0}")]
    #[diagnostic(code(vaultlint::infra::template))]
    TemplateError(String),
}
