//! Cache-aside schedule retrieval for Muslimboard.
//!
//! - [`MemoryStore`]: in-process [`CacheStore`](muslimboard_core::CacheStore) with per-key expiry
//! - `RedisStore` (feature `redis`): shared store that survives restarts
//! - [`CacheAside`]: read-through policy with sliding keep-alive
//! - [`ScheduleService`]: coordinate and location resolvers on top of both

#[cfg(feature = "redis")]
mod redis_store;
mod retriever;
mod schedule;
mod store;

pub use retriever::{CacheAside, Resolved, Source};
pub use schedule::{Resolution, ScheduleService};
pub use store::{MemoryStore, StoreConfig};

#[cfg(feature = "redis")]
pub use redis_store::{RedisConfig, RedisStore};
