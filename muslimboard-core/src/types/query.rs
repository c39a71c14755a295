//! Inbound schedule query parameters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_METHOD;

/// Decoded query string keeping the first value of each key.
///
/// Repeats of a key after the first are ignored, so `?latitude=0&latitude=5`
/// reads `latitude` as `"0"`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    /// Parses a raw (still percent-encoded) query string.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut params = HashMap::new();
        for (name, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            params.entry(name.into_owned()).or_insert_with(|| value.into_owned());
        }
        Self(params)
    }

    /// Value of `name`, or an empty string when absent.
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or_default()
    }
}

/// Schedule lookup by latitude/longitude.
///
/// Values are kept as the client sent them and forwarded verbatim to the
/// provider; only [`CoordinateQuery::is_degenerate`] interprets them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateQuery {
    /// Calculation method code; empty means [`DEFAULT_METHOD`]
    pub method: String,
    /// Month (1-12)
    pub month: String,
    /// Year
    pub year: String,
    /// Latitude in decimal degrees
    pub latitude: String,
    /// Longitude in decimal degrees
    pub longitude: String,
}

impl CoordinateQuery {
    /// Builds the query from a raw query string.
    pub fn from_query(raw: Option<&str>) -> Self {
        let params = QueryParams::parse(raw);
        Self {
            method: params.get("method").into(),
            month: params.get("month").into(),
            year: params.get("year").into(),
            latitude: params.get("latitude").into(),
            longitude: params.get("longitude").into(),
        }
    }

    /// Effective calculation method.
    pub fn method(&self) -> &str {
        effective_method(&self.method)
    }

    /// Parsed coordinate. Absent or unparseable components read as zero.
    pub fn coordinate(&self) -> (f64, f64) {
        (parse_degrees(&self.latitude), parse_degrees(&self.longitude))
    }

    /// Returns true when both components are zero.
    ///
    /// `(0, 0)` is what a client without a location fix sends, so it is never
    /// forwarded upstream.
    pub fn is_degenerate(&self) -> bool {
        let (lat, lon) = self.coordinate();
        lat == 0.0 && lon == 0.0
    }
}

/// Schedule lookup by administrative location.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationQuery {
    /// Calculation method code; empty means [`DEFAULT_METHOD`]
    pub method: String,
    /// Month (1-12)
    pub month: String,
    /// Year
    pub year: String,
    /// Province (maps to the provider's `state`)
    pub province: String,
    /// City
    pub city: String,
}

impl LocationQuery {
    /// Builds the query from a raw query string.
    pub fn from_query(raw: Option<&str>) -> Self {
        let params = QueryParams::parse(raw);
        Self {
            method: params.get("method").into(),
            month: params.get("month").into(),
            year: params.get("year").into(),
            province: params.get("province").into(),
            city: params.get("city").into(),
        }
    }

    /// Effective calculation method.
    pub fn method(&self) -> &str {
        effective_method(&self.method)
    }
}

fn effective_method(method: &str) -> &str {
    if method.is_empty() {
        DEFAULT_METHOD
    } else {
        method
    }
}

fn parse_degrees(raw: &str) -> f64 {
    raw.parse::<f64>().unwrap_or(0.0)
}
