//! TTL-bounded result cache with lazy expiry.
//!
//! Entries are never swept in the background. An entry older than the TTL
//! is dropped the next time it is read (or on [`ResultCache::clear`]), so
//! stale entries may sit in memory until then.
//!
//! Every operation takes the same lock, which keeps a single `get` or `set`
//! consistent. A caller doing get, miss, compute, set is not atomic across
//! the two calls: concurrent identical requests can both miss and both
//! compute.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// A cached result and the moment it was stored.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Point-in-time view of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Stored entries, including expired ones not yet read.
    pub entries: usize,
    /// Entry time-to-live.
    pub ttl: Duration,
}

/// Mutex-guarded key to value store with a fixed TTL.
#[derive(Debug)]
pub struct ResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResultCache {
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl }
    }

    /// Returns the value stored under `key` if it is younger than the TTL.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;

        if entry.is_expired(self.ttl) {
            entries.remove(key);
            debug!(key = %key, "Cache entry expired");
            return None;
        }

        Some(entry.value.clone())
    }

    /// Inserts or replaces the entry for `key` with a fresh timestamp.
    pub fn set(&self, key: String, value: Value) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, CacheEntry { value, created_at: Instant::now() });
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Entry count and TTL.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner).len();
        CacheStats { entries, ttl: self.ttl }
    }
}
