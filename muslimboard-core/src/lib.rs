//! # Muslimboard Core
//!
//! Core types, errors, and traits shared by every Muslimboard crate.
//!
//! - **Types**: schedule results, request queries, cache keys, image streams
//! - **Errors**: the request-level error taxonomy
//! - **Constants**: defaults for the cache and upstream provider
//! - **Traits**: the cache store and upstream fetcher seams
//!
//! ## Example
//!
//! ```rust
//! use muslimboard_core::{CacheKey, CacheKeyMode};
//!
//! let key = CacheKey::from_request(
//!     "/api/v1/shalat-schedule/by-coordinate",
//!     Some("latitude=-6.2&longitude=106.8"),
//!     CacheKeyMode::Literal,
//! );
//! assert_eq!(
//!     key.as_str(),
//!     "/api/v1/shalat-schedule/by-coordinate?latitude=-6.2&longitude=106.8"
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{ErrorKind, MuslimboardError, Result};
pub use traits::*;
pub use types::*;
