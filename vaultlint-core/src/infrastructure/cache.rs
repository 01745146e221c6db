// vaultlint-core/src/infrastructure/cache.rs

//! In-memory LRU cache with per-entry TTL for query results.
//!
//! Process-local and single-threaded per instance; callers that share an
//! instance across tasks wrap it in a mutex.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_CACHE_SIZE: usize = 100;

#[derive(Debug)]
pub struct QueryCache {
    ttl: Duration,
    max_size: usize,
    entries: HashMap<String, (Value, Instant)>,
    // Recency order, least-recently-used first.
    order: Vec<String>,
    hits: u64,
    misses: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub ttl_seconds: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

impl QueryCache {
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        QueryCache {
            ttl,
            max_size,
            entries: HashMap::new(),
            order: Vec::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Cache key for a (vault, query) pair.
    pub fn make_key(vault_path: &str, query: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(vault_path.as_bytes());
        hasher.update(b":");
        hasher.update(query.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn get(&mut self, key: &str) -> Option<Value> {
        let Some((value, inserted_at)) = self.entries.get(key) else {
            self.misses += 1;
            return None;
        };

        if inserted_at.elapsed() > self.ttl {
            // Expired entries are evicted on access.
            self.entries.remove(key);
            self.order.retain(|k| k != key);
            self.misses += 1;
            debug!(key, "cache entry expired");
            return None;
        }

        let value = value.clone();
        self.touch(key);
        self.hits += 1;
        Some(value)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        if self.max_size == 0 {
            return;
        }
        if self.entries.len() >= self.max_size && !self.entries.contains_key(key) {
            if let Some(victim) = self.order.first().cloned() {
                debug!(key = %victim, "evicting least-recently-used cache entry");
                self.entries.remove(&victim);
                self.order.remove(0);
            }
        }
        self.entries.insert(key.to_string(), (value, Instant::now()));
        self.touch(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let total = self.hits + self.misses;
        CacheStats {
            size: self.entries.len(),
            max_size: self.max_size,
            ttl_seconds: self.ttl.as_secs(),
            hits: self.hits,
            misses: self.misses,
            hit_rate: if total == 0 {
                0.0
            } else {
                self.hits as f64 / total as f64
            },
        }
    }

    fn touch(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push(key.to_string());
    }
}
