//! Schedule provider client.
//!
//! Talks to an Aladhan-compatible calendar API and maps its monthly response
//! onto [`ScheduleResult`].

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use muslimboard_core::{
    CoordinateQuery, DailySchedule, LocationQuery, MuslimboardError, Result, ScheduleFetcher,
    ScheduleMetadata, ScheduleResult, DEFAULT_UPSTREAM_BASE_URL, DEFAULT_UPSTREAM_COUNTRY,
    DEFAULT_UPSTREAM_TIMEOUT_SECS,
};

/// Upstream client configuration.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct UpstreamConfig {
    /// Provider base URL, without a trailing `/v1`
    pub base_url: String,
    /// Country sent with location lookups
    pub country: String,
    /// Transport timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_BASE_URL.into(),
            country: DEFAULT_UPSTREAM_COUNTRY.into(),
            timeout_seconds: DEFAULT_UPSTREAM_TIMEOUT_SECS,
        }
    }
}

impl UpstreamConfig {
    /// Creates config for a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Schedule client for an Aladhan-compatible API.
pub struct AladhanClient {
    config: UpstreamConfig,
    http_client: reqwest::Client,
}

impl AladhanClient {
    /// Creates a client with the given config.
    pub fn with_config(config: UpstreamConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| MuslimboardError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/v1/{}", self.config.base_url.trim_end_matches('/'), name)
    }

    async fn fetch_calendar(&self, url: &str, params: &[(&str, &str)]) -> Result<CalendarResponse> {
        // Empty values are left for the provider to default. A request without
        // month/year gets the provider's current month, cached under the
        // month-less key for as long as it keeps being read.
        let params: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();

        let response = self
            .http_client
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|e| MuslimboardError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, url, "schedule provider returned an error");
            return Err(MuslimboardError::Upstream(format!("HTTP {}", status)));
        }

        let body: CalendarResponse = response
            .json()
            .await
            .map_err(|e| MuslimboardError::Upstream(format!("invalid calendar response: {}", e)))?;

        if body.code != 200 {
            return Err(MuslimboardError::Upstream(format!(
                "provider answered code {}: {}",
                body.code, body.status
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl ScheduleFetcher for AladhanClient {
    #[instrument(skip(self))]
    async fn by_coordinate(&self, query: &CoordinateQuery) -> Result<ScheduleResult> {
        let body = self
            .fetch_calendar(
                &self.endpoint("calendar"),
                &[
                    ("latitude", query.latitude.as_str()),
                    ("longitude", query.longitude.as_str()),
                    ("method", query.method()),
                    ("month", query.month.as_str()),
                    ("year", query.year.as_str()),
                ],
            )
            .await?;

        let metadata = ScheduleMetadata {
            method: query.method().into(),
            month: query.month.clone(),
            year: query.year.clone(),
            latitude: Some(query.latitude.clone()),
            longitude: Some(query.longitude.clone()),
            ..Default::default()
        };

        let result = body.into_result(metadata);
        debug!(days = result.schedules.len(), "fetched schedule by coordinate");
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn by_location(&self, query: &LocationQuery) -> Result<ScheduleResult> {
        let body = self
            .fetch_calendar(
                &self.endpoint("calendarByCity"),
                &[
                    ("city", query.city.as_str()),
                    ("state", query.province.as_str()),
                    ("country", self.config.country.as_str()),
                    ("method", query.method()),
                    ("month", query.month.as_str()),
                    ("year", query.year.as_str()),
                ],
            )
            .await?;

        let metadata = ScheduleMetadata {
            method: query.method().into(),
            month: query.month.clone(),
            year: query.year.clone(),
            province: Some(query.province.clone()),
            city: Some(query.city.clone()),
            ..Default::default()
        };

        let result = body.into_result(metadata);
        debug!(days = result.schedules.len(), "fetched schedule by location");
        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    code: u16,
    #[serde(default)]
    status: String,
    #[serde(default)]
    data: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
struct CalendarDay {
    timings: BTreeMap<String, String>,
    date: CalendarDate,
    #[serde(default)]
    meta: Option<CalendarMeta>,
}

#[derive(Debug, Deserialize)]
struct CalendarDate {
    gregorian: GregorianDate,
}

#[derive(Debug, Deserialize)]
struct GregorianDate {
    date: String,
}

#[derive(Debug, Deserialize)]
struct CalendarMeta {
    timezone: Option<String>,
}

impl CalendarResponse {
    fn into_result(self, mut metadata: ScheduleMetadata) -> ScheduleResult {
        metadata.timezone = self
            .data
            .iter()
            .find_map(|d| d.meta.as_ref().and_then(|m| m.timezone.clone()));

        let schedules = self.data.into_iter().map(CalendarDay::into_schedule).collect();
        ScheduleResult::new(schedules, metadata)
    }
}

impl CalendarDay {
    fn into_schedule(self) -> DailySchedule {
        let time = |name: &str| self.timings.get(name).map(|t| strip_zone(t)).unwrap_or_default();

        DailySchedule {
            imsak: time("Imsak"),
            fajr: time("Fajr"),
            sunrise: time("Sunrise"),
            dhuhr: time("Dhuhr"),
            asr: time("Asr"),
            maghrib: time("Maghrib"),
            isha: time("Isha"),
            date: self.date.gregorian.date,
        }
    }
}

/// `"04:31 (WIB)"` -> `"04:31"`
fn strip_zone(raw: &str) -> String {
    raw.split_whitespace().next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn calendar_body(days: usize) -> serde_json::Value {
        let data: Vec<_> = (1..=days)
            .map(|d| {
                json!({
                    "timings": {
                        "Imsak": "04:25 (WIB)",
                        "Fajr": "04:35 (WIB)",
                        "Sunrise": "05:52 (WIB)",
                        "Dhuhr": "11:53 (WIB)",
                        "Asr": "15:13 (WIB)",
                        "Sunset": "17:50 (WIB)",
                        "Maghrib": "17:50 (WIB)",
                        "Isha": "19:00 (WIB)"
                    },
                    "date": {
                        "readable": format!("{:02} May 2024", d),
                        "gregorian": { "date": format!("{:02}-05-2024", d) }
                    },
                    "meta": { "timezone": "Asia/Jakarta" }
                })
            })
            .collect();
        json!({ "code": 200, "status": "OK", "data": data })
    }

    fn client(server: &MockServer) -> AladhanClient {
        AladhanClient::with_config(UpstreamConfig::with_base_url(server.uri())).unwrap()
    }

    fn coordinate() -> CoordinateQuery {
        CoordinateQuery {
            month: "5".into(),
            year: "2024".into(),
            latitude: "-6.2".into(),
            longitude: "106.8".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_by_coordinate_maps_calendar() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/calendar"))
            .and(query_param("latitude", "-6.2"))
            .and(query_param("longitude", "106.8"))
            .and(query_param("method", "1"))
            .and(query_param("month", "5"))
            .and(query_param("year", "2024"))
            .respond_with(ResponseTemplate::new(200).set_body_json(calendar_body(2)))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server).by_coordinate(&coordinate()).await.unwrap();

        assert_eq!(result.schedules.len(), 2);
        assert_eq!(result.schedules[0].date, "01-05-2024");
        assert_eq!(result.schedules[0].fajr, "04:35");
        assert_eq!(result.schedules[1].isha, "19:00");
        assert_eq!(result.metadata.method, "1");
        assert_eq!(result.metadata.timezone.as_deref(), Some("Asia/Jakarta"));
        assert_eq!(result.metadata.latitude.as_deref(), Some("-6.2"));
    }

    #[tokio::test]
    async fn test_by_location_sends_state_and_country() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/calendarByCity"))
            .and(query_param("city", "Bogor"))
            .and(query_param("state", "Jawa Barat"))
            .and(query_param("country", "Indonesia"))
            .and(query_param("method", "11"))
            .respond_with(ResponseTemplate::new(200).set_body_json(calendar_body(1)))
            .expect(1)
            .mount(&server)
            .await;

        let query = LocationQuery {
            method: "11".into(),
            month: "5".into(),
            year: "2024".into(),
            province: "Jawa Barat".into(),
            city: "Bogor".into(),
        };
        let result = client(&server).by_location(&query).await.unwrap();

        assert_eq!(result.schedules.len(), 1);
        assert_eq!(result.metadata.city.as_deref(), Some("Bogor"));
    }

    #[tokio::test]
    async fn test_empty_params_are_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/calendar"))
            .and(query_param("method", "1"))
            .and(query_param_is_missing("month"))
            .and(query_param_is_missing("year"))
            .respond_with(ResponseTemplate::new(200).set_body_json(calendar_body(3)))
            .expect(1)
            .mount(&server)
            .await;

        let query = CoordinateQuery {
            latitude: "-6.2".into(),
            longitude: "106.8".into(),
            ..Default::default()
        };
        let result = client(&server).by_coordinate(&query).await.unwrap();

        assert_eq!(result.schedules.len(), 3);
        assert_eq!(result.metadata.month, "");
        assert_eq!(result.metadata.year, "");
    }

    #[tokio::test]
    async fn test_empty_calendar_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/calendar"))
            .respond_with(ResponseTemplate::new(200).set_body_json(calendar_body(0)))
            .mount(&server)
            .await;

        let result = client(&server).by_coordinate(&coordinate()).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server).by_coordinate(&coordinate()).await.unwrap_err();

        assert!(matches!(err, MuslimboardError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_provider_error_code_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "code": 400, "status": "Bad Request", "data": "Invalid month" })),
            )
            .mount(&server)
            .await;

        let err = client(&server).by_coordinate(&coordinate()).await.unwrap_err();

        assert!(matches!(err, MuslimboardError::Upstream(_)));
    }

    #[test]
    fn test_strip_zone() {
        assert_eq!(strip_zone("04:31 (WIB)"), "04:31");
        assert_eq!(strip_zone("04:31"), "04:31");
        assert_eq!(strip_zone(""), "");
    }
}
