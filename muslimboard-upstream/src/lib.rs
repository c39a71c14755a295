//! Upstream clients for Muslimboard.
//!
//! - [`AladhanClient`]: monthly prayer schedules from an Aladhan-compatible API
//! - [`ImageClient`]: streaming fetch of proxied images

mod image;
mod schedule;

pub use image::ImageClient;
pub use schedule::{AladhanClient, UpstreamConfig};
