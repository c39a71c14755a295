//! Cache-aside retrieval with a sliding keep-alive.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use muslimboard_core::{CacheKey, CacheStore, Result, ScheduleResult, DEFAULT_KEEP_ALIVE};

/// Where a resolved schedule came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// Served from the cache store.
    Cache,
    /// Fetched from the upstream provider.
    Upstream,
}

/// A schedule together with its origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    /// The schedule
    pub result: ScheduleResult,
    /// Whether it was a hit or a fetch
    pub source: Source,
}

/// Read-through policy over a [`CacheStore`].
///
/// A hit re-writes the stored payload with a fresh deadline, so entries for
/// queries that keep being asked for never expire while abandoned ones do.
/// Cache failures of any kind are absorbed: a failed read is a miss and a
/// failed write only costs a future fetch.
#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn CacheStore>,
    keep_alive: Duration,
}

impl CacheAside {
    /// Creates a retriever with the default keep-alive.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_keep_alive(store, DEFAULT_KEEP_ALIVE)
    }

    /// Creates a retriever with a custom keep-alive.
    pub fn with_keep_alive(store: Arc<dyn CacheStore>, keep_alive: Duration) -> Self {
        Self { store, keep_alive }
    }

    /// Returns the keep-alive applied on every write and hit.
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Returns the cached schedule for `key`, or runs `fetch` and caches a
    /// non-empty result.
    ///
    /// Errors from `fetch` are returned unchanged and nothing is written.
    pub async fn resolve<F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<Resolved>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ScheduleResult>>,
    {
        if let Some(result) = self.lookup(key).await {
            return Ok(Resolved {
                result,
                source: Source::Cache,
            });
        }

        let result = fetch().await?;

        if result.is_cacheable() {
            self.store_result(key, &result).await;
        } else {
            debug!(key = %key, "empty schedule, not caching");
        }

        Ok(Resolved {
            result,
            source: Source::Upstream,
        })
    }

    async fn lookup(&self, key: &CacheKey) -> Option<ScheduleResult> {
        let payload = match self.store.get(key.as_str()).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!(key = %key, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        let result: ScheduleResult = match serde_json::from_str(&payload) {
            Ok(result) => result,
            Err(e) => {
                warn!(key = %key, error = %e, "undecodable cache payload, treating as miss");
                return None;
            }
        };
        if result.is_empty() {
            debug!(key = %key, "cached schedule is empty, treating as miss");
            return None;
        }

        // Prolong with the same payload
        if let Err(e) = self.store.set(key.as_str(), payload, self.keep_alive).await {
            warn!(key = %key, error = %e, "failed to renew cache entry");
        }

        debug!(key = %key, "load from cache");
        Some(result)
    }

    async fn store_result(&self, key: &CacheKey, result: &ScheduleResult) {
        let payload = match serde_json::to_string(result) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to encode schedule for cache");
                return;
            }
        };

        match self.store.set(key.as_str(), payload, self.keep_alive).await {
            Ok(()) => debug!(key = %key, "set cache"),
            Err(e) => warn!(key = %key, error = %e, "cache write failed"),
        }
    }
}
