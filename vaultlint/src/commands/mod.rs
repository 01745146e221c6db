// vaultlint/src/commands/mod.rs

pub mod cache;
pub mod lint;
pub mod query;
