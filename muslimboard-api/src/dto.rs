//! DTOs for API requests and responses.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use muslimboard_cache::Resolution;
use muslimboard_core::{CacheStats, ScheduleResult};

/// Uniform response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// HTTP status, repeated in the body
    pub status_code: u16,
    /// Payload on success
    pub data: Option<T>,
    /// Error message on failure
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope.
    pub fn ok(data: T) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            data: Some(data),
            error: None,
        }
    }

    /// Failed envelope.
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Payload of a schedule lookup.
///
/// A degenerate coordinate answers with a bare `true` instead of a schedule.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchedulePayload {
    /// Monthly schedule
    Schedule(ScheduleResult),
    /// Placeholder for `(0, 0)`
    Placeholder(bool),
}

impl From<Resolution> for SchedulePayload {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Schedule(resolved) => SchedulePayload::Schedule(resolved.result),
            Resolution::Placeholder => SchedulePayload::Placeholder(true),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Serialize)]
pub struct CacheStatsDto {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Valid entries
    pub valid_entries: usize,
    /// Maximum capacity
    pub capacity: usize,
}

impl From<CacheStats> for CacheStatsDto {
    fn from(stats: CacheStats) -> Self {
        Self {
            total_entries: stats.total_entries,
            valid_entries: stats.valid_entries,
            capacity: stats.capacity,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Schedule cache statistics
    pub cache: CacheStatsDto,
}
