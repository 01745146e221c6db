// vaultlint-core/src/infrastructure/bridge.rs

//! File-based adapter for the query gateway port.
//!
//! The external engine communicates through a shared JSON document inside
//! the vault: the client writes a pending request record, the engine's
//! plugin picks it up and writes a terminal record back. The document is
//! externally owned and concurrently mutated; reads and writes here are
//! whole-file and deliberately not transactional.

use crate::error::VaultlintError;
use crate::infrastructure::cache::{DEFAULT_CACHE_SIZE, DEFAULT_CACHE_TTL, QueryCache};
use crate::infrastructure::error::InfrastructureError;
use crate::ports::gateway::{QueryGateway, QueryRecord, QueryStatus};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

pub const BRIDGE_STORE_PATH: &str = ".obsidian/plugins/vault-bridge/metadata.json";

const INTERNAL_PREFIX: char = '_';
const AVAILABILITY_PROBE_ID: &str = "_check";
const AVAILABILITY_PROBE_QUERY: &str = "CHECK_DATAVIEW";
const TIMEOUT_ERROR: &str = "Query execution timed out";

/// Polling knobs, constructed by the caller and passed down. Tests shrink
/// these to keep runs fast.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub availability_recheck: Duration,
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        BridgeSettings {
            availability_recheck: Duration::from_millis(500),
            poll_interval: Duration::from_millis(100),
            max_wait: Duration::from_secs(5),
        }
    }
}

/// On-disk shape of the shared document. Unknown top-level keys are carried
/// through read-modify-write untouched.
#[derive(Debug, Default, Serialize, Deserialize)]
struct BridgeState {
    #[serde(rename = "dataviewAvailable", default)]
    dataview_available: bool,
    #[serde(rename = "dataviewQueries", default)]
    queries: BTreeMap<String, QueryRecord>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

pub struct BridgeClient {
    vault_path: PathBuf,
    store_path: PathBuf,
    settings: BridgeSettings,
    cache: Option<Mutex<QueryCache>>,
}

impl BridgeClient {
    /// Client with the result cache enabled at default TTL and capacity.
    pub fn new(vault_path: impl Into<PathBuf>) -> Self {
        Self::with_settings(vault_path, BridgeSettings::default())
    }

    pub fn with_settings(vault_path: impl Into<PathBuf>, settings: BridgeSettings) -> Self {
        let vault_path = vault_path.into();
        let store_path = vault_path.join(BRIDGE_STORE_PATH);
        BridgeClient {
            vault_path,
            store_path,
            settings,
            cache: Some(Mutex::new(QueryCache::new(
                DEFAULT_CACHE_TTL,
                DEFAULT_CACHE_SIZE,
            ))),
        }
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    async fn read_state(&self) -> Result<BridgeState, VaultlintError> {
        if !self.store_path.exists() {
            return Err(InfrastructureError::StoreNotFound(
                self.store_path.display().to_string(),
            )
            .into());
        }
        let text = tokio::fs::read_to_string(&self.store_path).await?;
        let state = serde_json::from_str(&text)?;
        Ok(state)
    }

    async fn write_state(&self, state: &BridgeState) -> Result<(), VaultlintError> {
        let text = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.store_path, text).await?;
        Ok(())
    }

    /// Request id derived from the query text and the current time. Not
    /// deterministic, collisions negligible.
    fn request_id(query: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(query.as_bytes());
        hasher.update(b"_");
        hasher.update(nanos.to_string().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }

    fn cache_key(&self, query: &str) -> String {
        QueryCache::make_key(&self.vault_path.display().to_string(), query)
    }

    /// Probes for engine availability, re-reading once after a short delay.
    async fn ensure_available(&self) -> Result<bool, VaultlintError> {
        let mut state = self.read_state().await?;
        if state.dataview_available {
            return Ok(true);
        }

        state.queries.insert(
            AVAILABILITY_PROBE_ID.to_string(),
            QueryRecord {
                query: AVAILABILITY_PROBE_QUERY.to_string(),
                timestamp: Utc::now().to_rfc3339(),
                status: QueryStatus::Pending,
                result: None,
                error: None,
                extra: Map::new(),
            },
        );
        self.write_state(&state).await?;

        tokio::time::sleep(self.settings.availability_recheck).await;
        let state = self.read_state().await?;
        Ok(state.dataview_available)
    }

    async fn execute_uncached(&self, query: &str) -> Result<Option<QueryRecord>, VaultlintError> {
        if !self.ensure_available().await? {
            warn!("query engine not available");
            return Ok(None);
        }

        let id = Self::request_id(query);
        let mut state = self.read_state().await?;
        state.queries.insert(
            id.clone(),
            QueryRecord {
                query: query.to_string(),
                timestamp: Utc::now().to_rfc3339(),
                status: QueryStatus::Pending,
                result: None,
                error: None,
                extra: Map::new(),
            },
        );
        self.write_state(&state).await?;
        debug!(request_id = %id, "query submitted, polling for completion");

        let mut elapsed = Duration::ZERO;
        while elapsed < self.settings.max_wait {
            tokio::time::sleep(self.settings.poll_interval).await;
            elapsed += self.settings.poll_interval;

            let state = self.read_state().await?;
            if let Some(record) = state.queries.get(&id) {
                if record.status.is_terminal() {
                    debug!(request_id = %id, status = ?record.status, "query completed");
                    return Ok(Some(record.clone()));
                }
            }
        }

        // Timeout is a caller-visible outcome, not an error.
        warn!(request_id = %id, "query timed out after {:?}", self.settings.max_wait);
        Ok(Some(QueryRecord {
            query: query.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            status: QueryStatus::Timeout,
            result: None,
            error: Some(TIMEOUT_ERROR.to_string()),
            extra: Map::new(),
        }))
    }

    pub fn cache_stats(&self) -> Option<crate::infrastructure::cache::CacheStats> {
        self.cache
            .as_ref()
            .and_then(|c| c.lock().ok())
            .map(|c| c.stats())
    }
}

#[async_trait]
impl QueryGateway for BridgeClient {
    async fn execute(&self, query: &str) -> Result<Option<QueryRecord>, VaultlintError> {
        let key = self.cache_key(query);

        if let Some(cache) = &self.cache {
            let hit = cache
                .lock()
                .map_err(|_| VaultlintError::InternalError("cache lock poisoned".to_string()))?
                .get(&key);
            if let Some(value) = hit {
                debug!("query served from result cache");
                let record: QueryRecord = serde_json::from_value(value)?;
                return Ok(Some(record));
            }
        }

        let record = self.execute_uncached(query).await?;

        if let (Some(cache), Some(record)) = (&self.cache, &record) {
            cache
                .lock()
                .map_err(|_| VaultlintError::InternalError("cache lock poisoned".to_string()))?
                .set(&key, serde_json::to_value(record)?);
        }

        Ok(record)
    }

    async fn cached_results(&self) -> Result<BTreeMap<String, QueryRecord>, VaultlintError> {
        let state = self.read_state().await?;
        Ok(state
            .queries
            .into_iter()
            .filter(|(id, _)| !id.starts_with(INTERNAL_PREFIX))
            .collect())
    }

    async fn clear_cache(&self) -> Result<usize, VaultlintError> {
        let mut state = self.read_state().await?;
        let before = state.queries.len();
        state.queries.retain(|id, _| id.starts_with(INTERNAL_PREFIX));
        let removed = before - state.queries.len();
        self.write_state(&state).await?;

        if let Some(cache) = &self.cache {
            cache
                .lock()
                .map_err(|_| VaultlintError::InternalError("cache lock poisoned".to_string()))?
                .clear();
        }

        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn fast_settings() -> BridgeSettings {
        BridgeSettings {
            availability_recheck: Duration::from_millis(10),
            poll_interval: Duration::from_millis(10),
            max_wait: Duration::from_millis(100),
        }
    }

    fn write_store(vault: &Path, body: &Value) {
        let store = vault.join(BRIDGE_STORE_PATH);
        std::fs::create_dir_all(store.parent().unwrap()).unwrap();
        std::fs::write(&store, serde_json::to_string_pretty(body).unwrap()).unwrap();
    }

    fn read_store(vault: &Path) -> Value {
        let text = std::fs::read_to_string(vault.join(BRIDGE_STORE_PATH)).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    /// Background task standing in for the engine plugin: marks the first
    /// pending user query as successful.
    fn spawn_responder(vault: PathBuf, result: Value) {
        tokio::spawn(async move {
            let store = vault.join(BRIDGE_STORE_PATH);
            for _ in 0..200 {
                tokio::time::sleep(Duration::from_millis(5)).await;
                let Ok(text) = std::fs::read_to_string(&store) else {
                    continue;
                };
                let Ok(mut doc) = serde_json::from_str::<Value>(&text) else {
                    continue;
                };
                let Some(queries) = doc["dataviewQueries"].as_object_mut() else {
                    continue;
                };
                let pending = queries.iter().find_map(|(id, record)| {
                    (!id.starts_with('_') && record["status"] == "pending").then(|| id.clone())
                });
                if let Some(id) = pending {
                    queries[&id]["status"] = json!("success");
                    queries[&id]["result"] = result.clone();
                    std::fs::write(&store, serde_json::to_string(&doc).unwrap()).unwrap();
                    return;
                }
            }
        });
    }

    #[tokio::test]
    async fn test_missing_store_is_store_not_found() {
        let vault = TempDir::new().unwrap();
        let client = BridgeClient::with_settings(vault.path(), fast_settings());
        let err = client.execute("LIST").await.unwrap_err();
        assert!(matches!(
            err,
            VaultlintError::Infrastructure(InfrastructureError::StoreNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unavailable_engine_returns_none_and_writes_probe() {
        let vault = TempDir::new().unwrap();
        write_store(vault.path(), &json!({"dataviewAvailable": false}));
        let client = BridgeClient::with_settings(vault.path(), fast_settings());

        let outcome = client.execute("LIST").await.unwrap();
        assert!(outcome.is_none());

        let doc = read_store(vault.path());
        assert_eq!(doc["dataviewQueries"]["_check"]["query"], "CHECK_DATAVIEW");
    }

    #[tokio::test]
    async fn test_timeout_is_synthetic_record() {
        let vault = TempDir::new().unwrap();
        write_store(vault.path(), &json!({"dataviewAvailable": true}));
        let client = BridgeClient::with_settings(vault.path(), fast_settings()).without_cache();

        let record = client.execute("LIST").await.unwrap().unwrap();
        assert_eq!(record.status, QueryStatus::Timeout);
        assert_eq!(record.error.as_deref(), Some(TIMEOUT_ERROR));
    }

    #[tokio::test]
    async fn test_successful_roundtrip() {
        let vault = TempDir::new().unwrap();
        write_store(vault.path(), &json!({"dataviewAvailable": true}));
        let client = BridgeClient::with_settings(vault.path(), fast_settings()).without_cache();
        spawn_responder(
            vault.path().to_path_buf(),
            json!({"values": [{"path": "a.md"}]}),
        );

        let record = client.execute("LIST FROM \"Daily\"").await.unwrap().unwrap();
        assert_eq!(record.status, QueryStatus::Success);
        assert_eq!(record.result.unwrap()["values"][0]["path"], "a.md");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_bridge() {
        let vault = TempDir::new().unwrap();
        write_store(vault.path(), &json!({"dataviewAvailable": true}));
        let client = BridgeClient::with_settings(vault.path(), fast_settings());
        spawn_responder(vault.path().to_path_buf(), json!({"values": ["a.md"]}));

        let first = client.execute("LIST").await.unwrap().unwrap();
        assert_eq!(first.status, QueryStatus::Success);

        // Wipe the store; a second call must come from the in-memory cache.
        write_store(
            vault.path(),
            &json!({"dataviewAvailable": false, "dataviewQueries": {}}),
        );
        let second = client.execute("LIST").await.unwrap().unwrap();
        assert_eq!(second.status, QueryStatus::Success);
        assert_eq!(client.cache_stats().unwrap().hits, 1);
    }

    #[tokio::test]
    async fn test_cached_results_filters_internal_entries() {
        let vault = TempDir::new().unwrap();
        write_store(
            vault.path(),
            &json!({
                "dataviewAvailable": true,
                "dataviewQueries": {
                    "_check": {"query": "CHECK_DATAVIEW", "timestamp": "t", "status": "pending"},
                    "abc123": {"query": "LIST", "timestamp": "t", "status": "success"},
                }
            }),
        );
        let client = BridgeClient::with_settings(vault.path(), fast_settings());

        let results = client.cached_results().await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results.contains_key("abc123"));
    }

    #[tokio::test]
    async fn test_clear_cache_preserves_internal_entries() {
        let vault = TempDir::new().unwrap();
        write_store(
            vault.path(),
            &json!({
                "dataviewAvailable": true,
                "dataviewQueries": {
                    "_check": {"query": "CHECK_DATAVIEW", "timestamp": "t", "status": "pending"},
                    "abc123": {"query": "LIST", "timestamp": "t", "status": "success"},
                    "def456": {"query": "TABLE", "timestamp": "t", "status": "error", "error": "x"},
                }
            }),
        );
        let client = BridgeClient::with_settings(vault.path(), fast_settings());

        let removed = client.clear_cache().await.unwrap();
        assert_eq!(removed, 2);

        let doc = read_store(vault.path());
        let queries = doc["dataviewQueries"].as_object().unwrap();
        assert_eq!(queries.len(), 1);
        assert!(queries.contains_key("_check"));
    }

    #[tokio::test]
    async fn test_unknown_record_fields_survive_rewrite() {
        let vault = TempDir::new().unwrap();
        write_store(
            vault.path(),
            &json!({
                "dataviewAvailable": false,
                "dataviewQueries": {
                    "user1": {
                        "query": "LIST",
                        "timestamp": "t",
                        "status": "pending",
                        "requestedBy": "plugin-x",
                    }
                }
            }),
        );
        let client = BridgeClient::with_settings(vault.path(), fast_settings());

        // Unavailable path still rewrites the store (probe insertion).
        let outcome = client.execute("LIST").await.unwrap();
        assert!(outcome.is_none());

        let doc = read_store(vault.path());
        assert_eq!(doc["dataviewQueries"]["user1"]["requestedBy"], "plugin-x");
    }

    #[tokio::test]
    async fn test_unknown_top_level_keys_survive_rewrite() {
        let vault = TempDir::new().unwrap();
        write_store(
            vault.path(),
            &json!({
                "dataviewAvailable": true,
                "dataviewQueries": {"abc": {"query": "LIST", "timestamp": "t", "status": "success"}},
                "notes": {"a.md": {"basename": "a"}},
                "stats": {"noteCount": 12},
            }),
        );
        let client = BridgeClient::with_settings(vault.path(), fast_settings());
        client.clear_cache().await.unwrap();

        let doc = read_store(vault.path());
        assert_eq!(doc["stats"]["noteCount"], 12);
        assert_eq!(doc["notes"]["a.md"]["basename"], "a");
    }

    #[test]
    fn test_request_ids_are_unique_per_call() {
        let a = BridgeClient::request_id("LIST");
        std::thread::sleep(Duration::from_millis(1));
        let b = BridgeClient::request_id("LIST");
        assert_ne!(a, b);
        assert_eq!(a.len(), 16);
    }
}
