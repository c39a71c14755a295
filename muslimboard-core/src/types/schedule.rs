//! Schedule result types.

use serde::{Deserialize, Serialize};

/// Prayer times for one calendar day.
///
/// Times are `HH:MM` strings in the local timezone of the queried place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySchedule {
    /// Gregorian date, `DD-MM-YYYY`
    pub date: String,
    /// Imsak (start of fasting)
    pub imsak: String,
    /// Fajr / subuh
    pub fajr: String,
    /// Sunrise / terbit
    pub sunrise: String,
    /// Dhuhr / dzuhur
    pub dhuhr: String,
    /// Asr / ashar
    pub asr: String,
    /// Maghrib
    pub maghrib: String,
    /// Isha / isya
    pub isha: String,
}

/// Parameters the schedule was computed for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    /// Calculation method code
    pub method: String,
    /// Requested month, as sent by the client
    pub month: String,
    /// Requested year, as sent by the client
    pub year: String,
    /// IANA timezone reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Latitude (coordinate lookups)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    /// Longitude (coordinate lookups)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    /// Province (location lookups)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    /// City (location lookups)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// A month of daily schedules.
///
/// An empty `schedules` list means the provider had no data for the range.
/// Such a result is returned to the caller but never cached.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Daily entries, in calendar order
    #[serde(default)]
    pub schedules: Vec<DailySchedule>,
    /// Request metadata
    #[serde(default)]
    pub metadata: ScheduleMetadata,
}

impl ScheduleResult {
    /// Creates a result from its parts.
    pub fn new(schedules: Vec<DailySchedule>, metadata: ScheduleMetadata) -> Self {
        Self { schedules, metadata }
    }

    /// Returns true if there are no daily entries.
    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    /// Returns true if this result may be written to the cache.
    pub fn is_cacheable(&self) -> bool {
        !self.is_empty()
    }
}
