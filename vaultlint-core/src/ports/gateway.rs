// vaultlint-core/src/ports/gateway.rs

// The application needs to submit a query string and get a structured
// answer back. How that happens (shared JSON document, message queue,
// RPC...) is an adapter concern.

use crate::error::VaultlintError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Terminal and non-terminal states of a submitted query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Pending,
    Success,
    Error,
    Timeout,
}

impl QueryStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, QueryStatus::Pending)
    }
}

/// One request record in the shared query store. The store is externally
/// owned; fields written by other parties round-trip through `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    pub query: String,
    pub timestamp: String,
    pub status: QueryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// Submits a query and waits for a terminal record. `Ok(None)` means the
    /// external engine is not available — a normal outcome, not an error.
    /// Timeouts come back as a record with `QueryStatus::Timeout`.
    async fn execute(&self, query: &str) -> Result<Option<QueryRecord>, VaultlintError>;

    /// All user-submitted records currently in the store (internal
    /// housekeeping entries are filtered out).
    async fn cached_results(&self) -> Result<BTreeMap<String, QueryRecord>, VaultlintError>;

    /// Removes all user-submitted records, returns how many were removed.
    async fn clear_cache(&self) -> Result<usize, VaultlintError>;
}
