//! Common traits for Muslimboard.
//!
//! These are the seams between the cache-aside core and its collaborators,
//! so tests can swap any of them for a double.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CoordinateQuery, ImageStream, ImageUrl, LocationQuery, ScheduleResult};

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Point-in-time counters reported by a cache store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Expired entries not yet purged
    pub expired_entries: usize,
    /// Valid (non-expired) entries
    pub valid_entries: usize,
    /// Maximum capacity
    pub capacity: usize,
}

/// Shared key-value store with a per-key expiry.
///
/// Single-key `get`/`set` must be atomic. Expiry enforcement belongs to the
/// store: an expired key reads as absent.
///
/// Implementations might use:
/// - An in-process map (for a single instance or tests)
/// - Redis or Memcached (for a fleet sharing one cache)
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the payload stored under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous entry and resetting
    /// its deadline to `now + ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Returns the deadline of a live entry.
    async fn expires_at(&self, key: &str) -> Result<Option<Instant>>;

    /// Returns store statistics.
    fn stats(&self) -> CacheStats;
}

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM TRAITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Remote provider of monthly prayer schedules.
///
/// Failures are reported as `MuslimboardError::Upstream` and never retried
/// here; retries belong to the transport client, if anywhere.
#[async_trait]
pub trait ScheduleFetcher: Send + Sync {
    /// Fetches the schedule for a latitude/longitude pair.
    async fn by_coordinate(&self, query: &CoordinateQuery) -> Result<ScheduleResult>;

    /// Fetches the schedule for a province/city pair.
    async fn by_location(&self, query: &LocationQuery) -> Result<ScheduleResult>;
}

/// Remote origin for proxied images.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Opens the image at `url`. The body is streamed, never buffered.
    async fn fetch_image(&self, url: &ImageUrl) -> Result<ImageStream>;
}
