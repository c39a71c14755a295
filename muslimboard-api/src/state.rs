//! App state: schedule service, image client, config.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::warn;

use muslimboard_cache::{CacheAside, MemoryStore, ScheduleService, StoreConfig};
use muslimboard_core::{
    CacheKeyMode, CacheStore, ImageFetcher, Result, ScheduleFetcher, DEFAULT_CACHE_MAX_ENTRIES,
    DEFAULT_IMAGE_MAX_AGE_SECS, DEFAULT_KEEP_ALIVE, DEFAULT_REDIS_URL,
};
use muslimboard_upstream::{AladhanClient, ImageClient, UpstreamConfig};

/// Where cached schedules live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheBackend {
    /// In-process map, lost on restart
    #[default]
    Memory,
    /// Shared Redis server (needs the `redis` feature)
    Redis,
}

impl std::str::FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Schedule provider settings
    pub upstream: UpstreamConfig,
    /// Sliding TTL for cached schedules
    pub keep_alive: Duration,
    /// Cache store selection
    pub cache_backend: CacheBackend,
    /// Capacity of the in-memory store
    pub cache_max_entries: usize,
    /// Redis server, used with [`CacheBackend::Redis`]
    pub redis_url: String,
    /// Prefix for Redis keys
    pub redis_key_prefix: String,
    /// How requests map to cache keys
    pub cache_key_mode: CacheKeyMode,
    /// `max-age` sent with proxied images
    pub image_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            keep_alive: DEFAULT_KEEP_ALIVE,
            cache_backend: CacheBackend::Memory,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            redis_url: DEFAULT_REDIS_URL.into(),
            redis_key_prefix: String::new(),
            cache_key_mode: CacheKeyMode::Literal,
            image_max_age_secs: DEFAULT_IMAGE_MAX_AGE_SECS,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let cache_key_mode = env_choice("CACHE_KEY_MODE").unwrap_or(defaults.cache_key_mode);
        let cache_backend = env_choice("CACHE_BACKEND").unwrap_or(defaults.cache_backend);

        Self {
            upstream: UpstreamConfig {
                base_url: std::env::var("UPSTREAM_BASE_URL")
                    .unwrap_or(defaults.upstream.base_url),
                country: std::env::var("UPSTREAM_COUNTRY").unwrap_or(defaults.upstream.country),
                timeout_seconds: env_parse("UPSTREAM_TIMEOUT_SECS")
                    .unwrap_or(defaults.upstream.timeout_seconds),
            },
            keep_alive: env_parse("CACHE_KEEP_ALIVE_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.keep_alive),
            cache_backend,
            cache_max_entries: env_parse("CACHE_MAX_ENTRIES").unwrap_or(defaults.cache_max_entries),
            redis_url: std::env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            redis_key_prefix: std::env::var("REDIS_KEY_PREFIX").unwrap_or(defaults.redis_key_prefix),
            cache_key_mode,
            image_max_age_secs: env_parse("IMAGE_CACHE_MAX_AGE_SECS")
                .unwrap_or(defaults.image_max_age_secs),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Like [`env_parse`], but warns about values it cannot use.
fn env_choice<T>(name: &str) -> Option<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw = std::env::var(name).ok()?;
    raw.parse()
        .map_err(|e| warn!(error = %e, "ignoring {}", name))
        .ok()
}

/// Shared state handed to every handler.
pub struct AppState {
    /// Server configuration
    pub config: ApiConfig,
    /// Cache-aside schedule resolution
    pub schedules: ScheduleService,
    /// Image origin
    pub images: Arc<dyn ImageFetcher>,
    /// When the state was built
    pub started_at: Instant,
}

impl AppState {
    /// Builds the production state: configured store, Aladhan client, image client.
    pub async fn new(config: ApiConfig) -> Result<Self> {
        let store = open_store(&config).await?;
        let fetcher = Arc::new(AladhanClient::with_config(config.upstream.clone())?);
        let images = Arc::new(ImageClient::with_connect_timeout(Duration::from_secs(
            config.upstream.timeout_seconds,
        ))?);

        Ok(Self::with_parts(config, store, fetcher, images))
    }

    /// Builds state from explicit collaborators.
    pub fn with_parts(
        config: ApiConfig,
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn ScheduleFetcher>,
        images: Arc<dyn ImageFetcher>,
    ) -> Self {
        let cache = CacheAside::with_keep_alive(store, config.keep_alive);

        Self {
            config,
            schedules: ScheduleService::new(cache, fetcher),
            images,
            started_at: Instant::now(),
        }
    }
}

async fn open_store(config: &ApiConfig) -> Result<Arc<dyn CacheStore>> {
    match config.cache_backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryStore::with_config(StoreConfig {
            max_entries: config.cache_max_entries,
            auto_cleanup: true,
        }))),
        #[cfg(feature = "redis")]
        CacheBackend::Redis => {
            let store = muslimboard_cache::RedisStore::connect(muslimboard_cache::RedisConfig {
                url: config.redis_url.clone(),
                prefix: config.redis_key_prefix.clone(),
            })
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        CacheBackend::Redis => Err(muslimboard_core::MuslimboardError::Config(
            "CACHE_BACKEND=redis needs a build with the `redis` feature".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muslimboard_core::MuslimboardError;

    #[test]
    fn test_cache_backend_from_str() {
        assert_eq!("memory".parse::<CacheBackend>(), Ok(CacheBackend::Memory));
        assert_eq!(" Redis ".parse::<CacheBackend>(), Ok(CacheBackend::Redis));
        assert!("memcached".parse::<CacheBackend>().is_err());
    }

    #[tokio::test]
    async fn test_memory_backend_builds() {
        let state = AppState::new(ApiConfig::default()).await.unwrap();
        assert_eq!(state.schedules.cache().store().stats().capacity, DEFAULT_CACHE_MAX_ENTRIES);
    }

    #[cfg(not(feature = "redis"))]
    #[tokio::test]
    async fn test_redis_backend_needs_feature() {
        let config = ApiConfig {
            cache_backend: CacheBackend::Redis,
            ..Default::default()
        };

        let err = AppState::new(config).await.err().unwrap();
        assert!(matches!(err, MuslimboardError::Config(_)));
    }

    #[cfg(feature = "redis")]
    #[tokio::test]
    async fn test_unreachable_redis_fails_startup() {
        let config = ApiConfig {
            cache_backend: CacheBackend::Redis,
            redis_url: "redis://127.0.0.1:1".into(),
            ..Default::default()
        };

        let err = AppState::new(config).await.err().unwrap();
        assert!(matches!(err, MuslimboardError::Config(_)));
    }
}
