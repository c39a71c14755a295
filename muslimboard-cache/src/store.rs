//! In-memory TTL store.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use muslimboard_core::{CacheStats, CacheStore, Result, DEFAULT_CACHE_MAX_ENTRIES};

/// Stored payload with its deadline.
#[derive(Clone)]
struct CacheEntry {
    payload: String,
    inserted_at: Instant,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// Whether to purge expired entries before evicting live ones
    pub auto_cleanup: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            auto_cleanup: true,
        }
    }
}

/// In-memory cache store shared by all request tasks.
///
/// Single-key operations take the lock once, so `get` and `set` are atomic
/// with respect to each other. Expired entries read as absent.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    config: StoreConfig,
}

impl MemoryStore {
    /// Creates a store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a store with custom configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
        }
    }

    fn read_live(&self, key: &str) -> Option<CacheEntry> {
        let entries = self.entries.read();
        entries.get(key).filter(|e| !e.is_expired()).cloned()
    }

    fn insert(&self, key: &str, payload: String, ttl: Duration) {
        let mut entries = self.entries.write();

        if !entries.contains_key(key) {
            if self.config.auto_cleanup && entries.len() >= self.config.max_entries {
                entries.retain(|_, e| !e.is_expired());
            }
            // Still at capacity? Evict the oldest write
            if entries.len() >= self.config.max_entries {
                if let Some(oldest_key) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest_key);
                }
            }
        }

        let now = Instant::now();
        entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                inserted_at: now,
                expires_at: now + ttl,
            },
        );
    }

    /// Removes an entry.
    pub fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Removes all expired entries.
    pub fn cleanup_expired(&self) {
        self.entries.write().retain(|_, e| !e.is_expired());
    }

    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_live(key).map(|e| e.payload))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.insert(key, value, ttl);
        Ok(())
    }

    async fn expires_at(&self, key: &str) -> Result<Option<Instant>> {
        Ok(self.read_live(key).map(|e| e.expires_at))
    }

    fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired()).count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
            capacity: self.config.max_entries,
        }
    }
}
