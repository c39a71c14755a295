//! Defaults for the Muslimboard API.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// REQUEST DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Calculation method used when the request omits `method`.
pub const DEFAULT_METHOD: &str = "1";

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Sliding TTL applied on every cache write and renewed on every hit.
///
/// A published monthly schedule does not change, so the window only has to
/// outlive the gap between two polls of the same query.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Maximum number of entries held by the in-memory store.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Redis server used when the shared backend is selected.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM
// ═══════════════════════════════════════════════════════════════════════════════

/// Base URL of the Aladhan-compatible schedule provider.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.aladhan.com";

/// Country passed to the provider for location lookups.
pub const DEFAULT_UPSTREAM_COUNTRY: &str = "Indonesia";

/// Transport timeout for upstream HTTP calls, in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

// ═══════════════════════════════════════════════════════════════════════════════
// IMAGE PROXY
// ═══════════════════════════════════════════════════════════════════════════════

/// `max-age` advertised to clients on proxied images, in seconds.
pub const DEFAULT_IMAGE_MAX_AGE_SECS: u64 = 86_400;

/// Content type used when the image origin does not send one.
pub const FALLBACK_IMAGE_CONTENT_TYPE: &str = "application/octet-stream";
