// vaultlint-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Assertion syntax error: {0}")]
    #[diagnostic(
        code(vaultlint::domain::assertion_syntax),
        help("Check the assertion expression (comparisons, and/or/not, len/any/all/sum/min/max).")
    )]
    AssertionSyntax(String),

    #[error("Unknown name in assertion: {0}")]
    #[diagnostic(
        code(vaultlint::domain::assertion_name),
        help("Only results, count, result_count, is_empty and rule variables are in scope.")
    )]
    AssertionName(String),

    #[error("Assertion evaluation failed: {0}")]
    #[diagnostic(code(vaultlint::domain::assertion_eval))]
    AssertionEval(String),

    #[error("Column '{0}' not found in query results")]
    #[diagnostic(code(vaultlint::domain::column_not_found))]
    ColumnNotFound(String),
}

impl DomainError {
    /// Stable classification used in result details.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::AssertionSyntax(_) => "syntax",
            DomainError::AssertionName(_) => "name",
            DomainError::AssertionEval(_) => "eval",
            DomainError::ColumnNotFound(_) => "eval",
        }
    }
}
