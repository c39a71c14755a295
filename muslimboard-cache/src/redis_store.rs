//! Redis-backed cache store.
//!
//! Requires the `redis` feature. Every instance pointed at the same server
//! shares one cache, and entries outlive a process restart.

use std::time::{Duration, Instant};

use ::redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use muslimboard_core::{CacheStats, CacheStore, MuslimboardError, Result, DEFAULT_REDIS_URL};

/// Redis connection configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Connection URL (e.g. `redis://localhost:6379/0`)
    pub url: String,
    /// Prepended to every key; empty keeps keys exactly as derived
    pub prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.into(),
            prefix: String::new(),
        }
    }
}

/// Cache store backed by a Redis server.
///
/// Writes use `SET key value EX ttl`, so expiry is enforced by Redis itself.
/// The multiplexed connection is cloned per call and reconnects on its own.
pub struct RedisStore {
    conn: MultiplexedConnection,
    config: RedisConfig,
}

impl RedisStore {
    /// Connects to the server named by `config.url`.
    pub async fn connect(config: RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| MuslimboardError::Config(format!("invalid Redis URL: {}", e)))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| MuslimboardError::Config(format!("Redis connection failed: {}", e)))?;

        info!(prefix = %config.prefix, "connected to Redis cache");
        Ok(Self { conn, config })
    }

    fn prefixed_key(&self, key: &str) -> String {
        format!("{}{}", self.config.prefix, key)
    }
}

/// Redis rejects `EX 0`; anything shorter than a second rounds up.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();

        conn.get::<_, Option<String>>(self.prefixed_key(key))
            .await
            .map_err(|e| MuslimboardError::CacheRead(format!("Redis GET: {}", e)))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();

        conn.set_ex::<_, _, ()>(self.prefixed_key(key), value, ttl_seconds(ttl))
            .await
            .map_err(|e| MuslimboardError::CacheWrite(format!("Redis SET: {}", e)))
    }

    async fn expires_at(&self, key: &str) -> Result<Option<Instant>> {
        let mut conn = self.conn.clone();

        // -2: no such key, -1: no expiry
        let remaining: i64 = conn
            .pttl(self.prefixed_key(key))
            .await
            .map_err(|e| MuslimboardError::CacheRead(format!("Redis PTTL: {}", e)))?;

        Ok(u64::try_from(remaining)
            .ok()
            .map(|ms| Instant::now() + Duration::from_millis(ms)))
    }

    /// Redis keeps no per-prefix counters, so every field reads as zero.
    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}
