// vaultlint-core/src/application/mod.rs

pub mod linter;
pub mod runner;

pub use linter::VaultLinter;
pub use runner::RuleRunner;
