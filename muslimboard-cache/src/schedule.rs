//! Schedule resolution by coordinate and by location.

use std::sync::Arc;

use tracing::debug;

use muslimboard_core::{CacheKey, CoordinateQuery, LocationQuery, Result, ScheduleFetcher};

use crate::retriever::{CacheAside, Resolved};

/// Outcome of a coordinate lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// A schedule, from cache or upstream.
    Schedule(Resolved),
    /// The coordinate was `(0, 0)`; nothing was fetched or cached.
    Placeholder,
}

/// Resolves schedule requests through the cache-aside retriever.
#[derive(Clone)]
pub struct ScheduleService {
    cache: CacheAside,
    fetcher: Arc<dyn ScheduleFetcher>,
}

impl ScheduleService {
    /// Creates a service over a retriever and an upstream fetcher.
    pub fn new(cache: CacheAside, fetcher: Arc<dyn ScheduleFetcher>) -> Self {
        Self { cache, fetcher }
    }

    /// Returns the retriever.
    pub fn cache(&self) -> &CacheAside {
        &self.cache
    }

    /// Resolves a schedule for a latitude/longitude pair.
    ///
    /// A degenerate `(0, 0)` coordinate short-circuits to
    /// [`Resolution::Placeholder`] without touching the cache or upstream.
    pub async fn by_coordinate(&self, key: &CacheKey, query: &CoordinateQuery) -> Result<Resolution> {
        if query.is_degenerate() {
            debug!(key = %key, "degenerate coordinate, skipping lookup");
            return Ok(Resolution::Placeholder);
        }

        let fetcher = &self.fetcher;
        let resolved = self
            .cache
            .resolve(key, move || async move { fetcher.by_coordinate(query).await })
            .await?;

        Ok(Resolution::Schedule(resolved))
    }

    /// Resolves a schedule for a province/city pair.
    pub async fn by_location(&self, key: &CacheKey, query: &LocationQuery) -> Result<Resolved> {
        let fetcher = &self.fetcher;
        self.cache
            .resolve(key, move || async move { fetcher.by_location(query).await })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use muslimboard_core::{
        CacheKeyMode, CacheStore, DailySchedule, MuslimboardError, ScheduleMetadata, ScheduleResult,
    };

    use crate::retriever::Source;
    use crate::store::MemoryStore;

    const COORDINATE_PATH: &str = "/api/v1/shalat-schedule/by-coordinate";
    const LOCATION_PATH: &str = "/api/v1/shalat-schedule/by-location";

    /// Fetcher that counts calls and answers with a fixed outcome.
    struct CountingFetcher {
        calls: AtomicUsize,
        empty: bool,
        fail: bool,
    }

    impl CountingFetcher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                empty: false,
                fail: false,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn answer(&self, metadata: ScheduleMetadata) -> Result<ScheduleResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MuslimboardError::Upstream("HTTP 502".into()));
            }
            let schedules = if self.empty {
                vec![]
            } else {
                vec![DailySchedule {
                    date: "01-05-2024".into(),
                    imsak: "04:25".into(),
                    fajr: "04:35".into(),
                    sunrise: "05:52".into(),
                    dhuhr: "11:53".into(),
                    asr: "15:13".into(),
                    maghrib: "17:50".into(),
                    isha: "19:00".into(),
                }]
            };
            Ok(ScheduleResult::new(schedules, metadata))
        }
    }

    #[async_trait]
    impl ScheduleFetcher for CountingFetcher {
        async fn by_coordinate(&self, query: &CoordinateQuery) -> Result<ScheduleResult> {
            self.answer(ScheduleMetadata {
                method: query.method().into(),
                month: query.month.clone(),
                year: query.year.clone(),
                latitude: Some(query.latitude.clone()),
                longitude: Some(query.longitude.clone()),
                ..Default::default()
            })
        }

        async fn by_location(&self, query: &LocationQuery) -> Result<ScheduleResult> {
            self.answer(ScheduleMetadata {
                method: query.method().into(),
                month: query.month.clone(),
                year: query.year.clone(),
                province: Some(query.province.clone()),
                city: Some(query.city.clone()),
                ..Default::default()
            })
        }
    }

    fn service(fetcher: Arc<CountingFetcher>) -> (Arc<MemoryStore>, ScheduleService) {
        let store = Arc::new(MemoryStore::new());
        let cache = CacheAside::with_keep_alive(store.clone(), Duration::from_secs(60));
        (store, ScheduleService::new(cache, fetcher))
    }

    fn coordinate(latitude: &str, longitude: &str) -> (CacheKey, CoordinateQuery) {
        let query = CoordinateQuery {
            method: "1".into(),
            month: "5".into(),
            year: "2024".into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
        };
        let raw = format!(
            "latitude={}&longitude={}&month=5&year=2024&method=1",
            latitude, longitude
        );
        let key = CacheKey::from_request(COORDINATE_PATH, Some(&raw), CacheKeyMode::Literal);
        (key, query)
    }

    #[tokio::test]
    async fn test_coordinate_second_call_is_cached() {
        let fetcher = Arc::new(CountingFetcher::new());
        let (_, service) = service(fetcher.clone());
        let (key, query) = coordinate("-6.2", "106.8");

        let first = service.by_coordinate(&key, &query).await.unwrap();
        let second = service.by_coordinate(&key, &query).await.unwrap();

        assert_eq!(fetcher.calls(), 1);
        match (first, second) {
            (Resolution::Schedule(a), Resolution::Schedule(b)) => {
                assert_eq!(a.source, Source::Upstream);
                assert_eq!(b.source, Source::Cache);
                assert_eq!(a.result, b.result);
            }
            other => panic!("expected schedules, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_degenerate_coordinate_skips_fetch() {
        let fetcher = Arc::new(CountingFetcher::new());
        let (store, service) = service(fetcher.clone());

        for (lat, lon) in [("0", "0"), ("", ""), ("abc", "xyz"), ("0.0", "")] {
            let (key, query) = coordinate(lat, lon);
            let resolution = service.by_coordinate(&key, &query).await.unwrap();
            assert_eq!(resolution, Resolution::Placeholder);
        }

        assert_eq!(fetcher.calls(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_empty_coordinate_schedule_refetched() {
        let fetcher = Arc::new(CountingFetcher {
            empty: true,
            ..CountingFetcher::new()
        });
        let (store, service) = service(fetcher.clone());
        let (key, query) = coordinate("-6.2", "106.8");

        service.by_coordinate(&key, &query).await.unwrap();
        service.by_coordinate(&key, &query).await.unwrap();

        assert_eq!(fetcher.calls(), 2);
        assert!(store.get(key.as_str()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let fetcher = Arc::new(CountingFetcher {
            fail: true,
            ..CountingFetcher::new()
        });
        let (store, service) = service(fetcher.clone());
        let (key, query) = coordinate("-6.2", "106.8");

        let err = service.by_coordinate(&key, &query).await.unwrap_err();

        assert!(matches!(err, MuslimboardError::Upstream(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_location_cached_per_key() {
        let fetcher = Arc::new(CountingFetcher::new());
        let (_, service) = service(fetcher.clone());
        let query = LocationQuery {
            province: "Jawa Barat".into(),
            city: "Bogor".into(),
            month: "5".into(),
            year: "2024".into(),
            ..Default::default()
        };
        let key = CacheKey::from_request(
            LOCATION_PATH,
            Some("province=Jawa+Barat&city=Bogor&month=5&year=2024"),
            CacheKeyMode::Literal,
        );
        let reordered = CacheKey::from_request(
            LOCATION_PATH,
            Some("city=Bogor&province=Jawa+Barat&month=5&year=2024"),
            CacheKeyMode::Literal,
        );

        let first = service.by_location(&key, &query).await.unwrap();
        let second = service.by_location(&key, &query).await.unwrap();
        service.by_location(&reordered, &query).await.unwrap();

        assert_eq!(first.result.metadata.method, "1");
        assert_eq!(second.source, Source::Cache);
        assert_eq!(fetcher.calls(), 2);
    }
}
