//! Domain types for Muslimboard.
//!
//! - [`ScheduleResult`]: a month of daily prayer times plus request metadata
//! - [`CoordinateQuery`] / [`LocationQuery`]: validated inbound parameters
//! - [`CacheKey`]: deterministic fingerprint of a request
//! - [`ImageUrl`] / [`ImageStream`]: image proxy input and output

mod cache_key;
mod image;
mod query;
mod schedule;

pub use cache_key::*;
pub use image::*;
pub use query::*;
pub use schedule::*;
