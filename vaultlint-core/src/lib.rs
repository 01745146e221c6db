// vaultlint-core/src/lib.rs

#![allow(missing_docs)]
// Memory safety
#![deny(unsafe_code)]
// Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts the application depends on (QueryGateway...)
pub mod ports;

// 2. Domain (business core)
// Rules, reports, query normalization, the assertion evaluator.
// Depends on nothing else (neither infra nor app).
pub mod domain;

// 3. Infrastructure (Adapters)
// Config files, templates, the bridge store, the result cache.
pub mod infrastructure;

// 4. Application (Use Cases)
// Orchestration: RuleRunner and VaultLinter.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use application::{RuleRunner, VaultLinter};
pub use domain::{LintReport, LintResult, LintRule, Severity};
pub use error::VaultlintError;
