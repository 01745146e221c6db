// vaultlint-core/src/domain/mod.rs

pub mod assertion;
pub mod error;
pub mod query;
pub mod report;
pub mod rule;

pub use error::DomainError;
pub use query::{QueryData, QueryKind, QueryResult};
pub use report::{LintReport, LintResult};
pub use rule::{LintRule, Severity};
