//! Weather service - the engine's public operations
//!
//! Every operation goes cache first. On a miss, concurrent callers for the
//! same key share a single fallback run, and only successful answers are
//! written back.

use std::{fmt, sync::Arc};

use chrono::Utc;
use domain::{
    AgronomicIndices, CropType, ForecastBundle, GeoLocation, HistoricalRange, Observation,
    PredictionBundle, WeatherQuery, agronomy,
};
use tracing::{debug, error, instrument, warn};

use super::{
    fallback_orchestrator::{FallbackOrchestrator, ProviderStatus},
    prediction_engine::PredictionEngine,
    single_flight::SingleFlight,
};
use crate::{
    deadline::Deadline,
    error::ApplicationError,
    outcome::{UnavailableReason, WeatherOutcome},
    ports::{CachePort, CachePortExt, CacheStats, CacheTtls},
};

/// Days requested for an agriculture forecast
pub const AGRICULTURE_FORECAST_DAYS: u8 = 7;

/// Longest extended forecast a provider is asked for
pub const MAX_FORECAST_DAYS: u8 = 14;

/// Decimal places coordinates are rounded to in cache keys
pub const DEFAULT_COORDINATE_PRECISION: usize = 2;

struct Inner {
    orchestrator: FallbackOrchestrator,
    cache: Arc<dyn CachePort>,
    ttls: CacheTtls,
    coordinate_precision: usize,
    flights: SingleFlight<WeatherOutcome<ForecastBundle>>,
}

impl Inner {
    /// Run the fallback chain for a flight shared by every waiting caller
    async fn fetch_and_store(
        &self,
        key: &str,
        query: &WeatherQuery,
    ) -> WeatherOutcome<ForecastBundle> {
        let outcome = self.orchestrator.fetch(query, Deadline::none()).await;
        if let WeatherOutcome::Available(bundle) = &outcome {
            let ttl = self.ttls.for_operation(query.operation());
            if let Err(e) = self.cache.set(key, bundle, ttl).await {
                warn!(key, error = %e, "Failed to cache weather data");
            }
        }
        outcome
    }
}

/// Weather aggregation, agronomic derivation and prediction
pub struct WeatherService {
    inner: Arc<Inner>,
    prediction: PredictionEngine,
}

impl fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherService")
            .field("orchestrator", &self.inner.orchestrator)
            .field("cache", &self.inner.cache)
            .field("ttls", &self.inner.ttls)
            .field("prediction", &self.prediction)
            .finish_non_exhaustive()
    }
}

impl WeatherService {
    #[must_use]
    pub fn new(
        orchestrator: FallbackOrchestrator,
        cache: Arc<dyn CachePort>,
        prediction: PredictionEngine,
    ) -> Self {
        Self::with_settings(
            orchestrator,
            cache,
            prediction,
            CacheTtls::default(),
            DEFAULT_COORDINATE_PRECISION,
        )
    }

    /// Create a service with explicit TTLs and cache-key precision
    #[must_use]
    pub fn with_settings(
        orchestrator: FallbackOrchestrator,
        cache: Arc<dyn CachePort>,
        prediction: PredictionEngine,
        ttls: CacheTtls,
        coordinate_precision: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                orchestrator,
                cache,
                ttls,
                coordinate_precision,
                flights: SingleFlight::new(),
            }),
            prediction,
        }
    }

    /// Cache key: `{operation}:{lat}:{lon}:{parameters}`
    #[must_use]
    pub fn cache_key(&self, query: &WeatherQuery) -> String {
        format!(
            "{}:{}:{}",
            query.operation(),
            query.location().rounded_key(self.inner.coordinate_precision),
            query.parameters()
        )
    }

    /// Current conditions with the short-range outlook
    #[instrument(skip(self, deadline), fields(lat = location.latitude(), lon = location.longitude()))]
    pub async fn current_weather(
        &self,
        location: GeoLocation,
        deadline: Deadline,
    ) -> WeatherOutcome<ForecastBundle> {
        self.fetch_bundle(WeatherQuery::Current { location }, deadline)
            .await
    }

    /// Multi-day forecast; `days` is clamped to 1..=14
    #[instrument(skip(self, deadline), fields(lat = location.latitude(), lon = location.longitude()))]
    pub async fn extended_forecast(
        &self,
        location: GeoLocation,
        days: u8,
        deadline: Deadline,
    ) -> WeatherOutcome<ForecastBundle> {
        let days = days.clamp(1, MAX_FORECAST_DAYS);
        self.fetch_bundle(WeatherQuery::Extended { location, days }, deadline)
            .await
            .map(|bundle| bundle.truncate_days(usize::from(days)))
    }

    /// Hourly observations inside `range`, sorted and de-duplicated by timestamp
    #[instrument(skip(self, deadline), fields(lat = location.latitude(), lon = location.longitude()))]
    pub async fn historical_weather(
        &self,
        location: GeoLocation,
        range: HistoricalRange,
        deadline: Deadline,
    ) -> WeatherOutcome<Vec<Observation>> {
        self.fetch_bundle(WeatherQuery::Historical { location, range }, deadline)
            .await
            .map(|bundle| {
                let mut hourly: Vec<Observation> = bundle
                    .into_hourly()
                    .into_iter()
                    .filter(|o| range.contains(o.timestamp()))
                    .collect();
                hourly.sort_by_key(Observation::timestamp);
                hourly.dedup_by_key(|o| o.timestamp());
                hourly
            })
    }

    /// Agronomic indices for each day of a 7-day forecast
    ///
    /// Indices are derived on every call and never cached themselves.
    #[instrument(skip(self, deadline), fields(lat = location.latitude(), lon = location.longitude()))]
    pub async fn agriculture_forecast(
        &self,
        location: GeoLocation,
        crop: Option<CropType>,
        deadline: Deadline,
    ) -> WeatherOutcome<Vec<AgronomicIndices>> {
        self.extended_forecast(location, AGRICULTURE_FORECAST_DAYS, deadline)
            .await
            .map(|bundle| agronomy::derive_indices(&bundle, crop))
    }

    /// Extend the recent history `horizon_hours` into the future (clamped to 1..=48)
    #[instrument(skip(self, deadline), fields(lat = location.latitude(), lon = location.longitude()))]
    pub async fn generate_prediction(
        &self,
        location: GeoLocation,
        horizon_hours: usize,
        deadline: Deadline,
    ) -> WeatherOutcome<PredictionBundle> {
        let range = match HistoricalRange::last_hours(Utc::now(), self.prediction.history_hours()) {
            Ok(range) => range,
            Err(e) => {
                error!(error = %e, "Invalid prediction history window");
                return WeatherOutcome::Unavailable(UnavailableReason::PredictionFailed {
                    message: e.to_string(),
                });
            },
        };

        let history = match self.historical_weather(location, range, deadline).await {
            WeatherOutcome::Available(history) => history,
            WeatherOutcome::Unavailable(reason) => return WeatherOutcome::Unavailable(reason),
        };

        match self.prediction.predict(location, &history, horizon_hours).await {
            Ok(bundle) => WeatherOutcome::Available(bundle),
            Err(ApplicationError::InsufficientHistory {
                available_hours,
                required_hours,
            }) => {
                warn!(available_hours, required_hours, "Prediction not available");
                WeatherOutcome::Unavailable(UnavailableReason::InsufficientHistory {
                    available_hours,
                    required_hours,
                })
            },
            Err(e) => {
                error!(error = %e, "Prediction failed");
                WeatherOutcome::Unavailable(UnavailableReason::PredictionFailed {
                    message: e.to_string(),
                })
            },
        }
    }

    /// Configured providers in fallback order
    #[must_use]
    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        self.inner.orchestrator.providers()
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    /// Drop every cached answer for the location's rounded coordinates
    ///
    /// Returns the number of entries removed.
    pub async fn invalidate_location(
        &self,
        location: GeoLocation,
    ) -> Result<u64, ApplicationError> {
        let cell = location.rounded_key(self.inner.coordinate_precision);
        let mut removed = 0;
        for operation in ["current", "extended", "historical"] {
            removed += self
                .inner
                .cache
                .invalidate_prefix(&format!("{operation}:{cell}:"))
                .await?;
        }
        debug!(removed, "Invalidated cached weather for location");
        Ok(removed)
    }

    async fn fetch_bundle(
        &self,
        query: WeatherQuery,
        deadline: Deadline,
    ) -> WeatherOutcome<ForecastBundle> {
        let key = self.cache_key(&query);

        match self.inner.cache.get::<ForecastBundle>(&key).await {
            Ok(Some(bundle)) => {
                debug!(key, "Weather cache hit");
                return WeatherOutcome::Available(bundle);
            },
            Ok(None) => debug!(key, "Weather cache miss"),
            Err(e) => warn!(key, error = %e, "Weather cache read failed, fetching"),
        }

        // Each caller's deadline bounds only its own wait on the flight.
        let inner = Arc::clone(&self.inner);
        let flight_key = key.clone();
        let flight = self.inner.flights.join(&key, move || async move {
            inner.fetch_and_store(&flight_key, &query).await
        });

        let joined = match deadline.remaining() {
            None => flight.await,
            Some(left) => match tokio::time::timeout(left, flight).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(key, "Deadline passed waiting for in-flight fetch");
                    return WeatherOutcome::Unavailable(UnavailableReason::DeadlineExceeded);
                },
            },
        };

        joined.unwrap_or_else(|e| {
            error!(key, error = %e, "Weather fetch task aborted");
            WeatherOutcome::Unavailable(UnavailableReason::Internal {
                message: e.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ports::{
            MockForecastModelPort, MockModelLoaderPort, MockWeatherSourcePort, WeatherSourcePort,
        },
        services::test_support::MemoryCacheDouble,
    };
    use chrono::{DateTime, Duration as ChronoDuration, NaiveDate};
    use domain::{DailyAggregate, LocationInfo, ProviderId, WeatherOperation};
    use std::time::Duration;

    fn location() -> GeoLocation {
        GeoLocation::new(52.5200, 13.4049).unwrap()
    }

    fn hourly(start: DateTime<Utc>, hours: i64, source: ProviderId) -> Vec<Observation> {
        (0..hours)
            .map(|h| {
                Observation::new(source, start + ChronoDuration::hours(h), 14.0)
                    .with_humidity(65.0)
                    .with_pressure(1011.0)
            })
            .collect()
    }

    fn bundle(source: ProviderId, days: usize, hourly: Vec<Observation>) -> ForecastBundle {
        let now = Utc::now();
        let first = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let daily = (0..days)
            .map(|d| {
                DailyAggregate::new(first + ChronoDuration::days(d as i64), 15.0, 25.0)
                    .unwrap()
                    .with_humidity(80.0)
                    .with_precipitation(8.0, 30.0)
            })
            .collect();
        ForecastBundle::new(
            LocationInfo::from_coordinates(52.52, 13.40),
            Observation::new(source, now, 18.0),
            hourly,
            daily,
            source,
            now,
        )
        .unwrap()
    }

    fn provider(
        id: ProviderId,
        calls: usize,
        answer: impl Fn(&WeatherQuery) -> Result<ForecastBundle, ApplicationError>
        + Send
        + Sync
        + 'static,
    ) -> Arc<dyn WeatherSourcePort> {
        let mut mock = MockWeatherSourcePort::new();
        mock.expect_provider_id().return_const(id);
        mock.expect_reliability().return_const(id.reliability());
        mock.expect_supports().return_const(true);
        mock.expect_fetch().times(calls).returning(move |q| answer(q));
        Arc::new(mock)
    }

    fn failing(id: ProviderId, calls: usize) -> Arc<dyn WeatherSourcePort> {
        provider(id, calls, move |_| {
            Err(ApplicationError::ProviderUnavailable {
                provider: id,
                message: "HTTP 500".to_string(),
            })
        })
    }

    fn idle_engine() -> PredictionEngine {
        PredictionEngine::new(Arc::new(MockModelLoaderPort::new()))
    }

    fn service(sources: Vec<Arc<dyn WeatherSourcePort>>) -> (WeatherService, Arc<MemoryCacheDouble>) {
        let cache = Arc::new(MemoryCacheDouble::default());
        let svc = WeatherService::new(
            FallbackOrchestrator::new(sources),
            Arc::clone(&cache) as Arc<dyn CachePort>,
            idle_engine(),
        );
        (svc, cache)
    }

    #[tokio::test]
    async fn second_call_within_ttl_hits_cache() {
        let (svc, cache) = service(vec![provider(ProviderId::WeatherApi, 1, |_| {
            Ok(bundle(ProviderId::WeatherApi, 1, Vec::new()))
        })]);

        let first = svc.current_weather(location(), Deadline::none()).await;
        let second = svc.current_weather(location(), Deadline::none()).await;

        assert!(first.is_available());
        assert_eq!(first, second);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn nearby_points_share_a_cache_entry() {
        let (svc, _) = service(vec![provider(ProviderId::WeatherApi, 1, |_| {
            Ok(bundle(ProviderId::WeatherApi, 1, Vec::new()))
        })]);
        let near = GeoLocation::new(52.5211, 13.4012).unwrap();

        assert!(svc.current_weather(location(), Deadline::none()).await.is_available());
        assert!(svc.current_weather(near, Deadline::none()).await.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_triggers_refetch() {
        let (svc, _) = service(vec![provider(ProviderId::WeatherApi, 2, |_| {
            Ok(bundle(ProviderId::WeatherApi, 1, Vec::new()))
        })]);

        assert!(svc.current_weather(location(), Deadline::none()).await.is_available());
        tokio::time::advance(Duration::from_secs(5 * 60)).await;
        assert!(svc.current_weather(location(), Deadline::none()).await.is_available());
    }

    #[tokio::test]
    async fn failed_fetches_are_not_cached() {
        let (svc, cache) = service(vec![
            failing(ProviderId::OpenWeatherMap, 2),
            failing(ProviderId::WeatherApi, 2),
        ]);

        let first = svc.current_weather(location(), Deadline::none()).await;
        assert!(matches!(
            first.reason(),
            Some(UnavailableReason::AllProvidersFailed { attempts }) if attempts.len() == 2
        ));
        assert_eq!(cache.stats().entries, 0);

        let second = svc.current_weather(location(), Deadline::none()).await;
        assert!(!second.is_available());
    }

    #[tokio::test]
    async fn fallback_source_is_reported() {
        let (svc, _) = service(vec![
            failing(ProviderId::OpenWeatherMap, 1),
            provider(ProviderId::WeatherApi, 1, |_| {
                Ok(bundle(ProviderId::WeatherApi, 1, Vec::new()))
            }),
        ]);

        let outcome = svc.current_weather(location(), Deadline::none()).await;
        assert_eq!(outcome.available().unwrap().source(), ProviderId::WeatherApi);
    }

    #[tokio::test]
    async fn concurrent_cold_requests_share_one_fetch() {
        let (svc, _) = service(vec![provider(ProviderId::WeatherApi, 1, |_| {
            Ok(bundle(ProviderId::WeatherApi, 1, Vec::new()))
        })]);

        let (a, b, c) = tokio::join!(
            svc.current_weather(location(), Deadline::none()),
            svc.current_weather(location(), Deadline::none()),
            svc.current_weather(location(), Deadline::none()),
        );
        assert!(a.is_available() && b.is_available() && c.is_available());
    }

    #[derive(Default)]
    struct SlowSource {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl WeatherSourcePort for SlowSource {
        fn provider_id(&self) -> ProviderId {
            ProviderId::WeatherApi
        }

        fn reliability(&self) -> f64 {
            ProviderId::WeatherApi.reliability()
        }

        fn supports(&self, _operation: WeatherOperation) -> bool {
            true
        }

        async fn fetch(&self, _query: &WeatherQuery) -> Result<ForecastBundle, ApplicationError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(bundle(ProviderId::WeatherApi, 1, Vec::new()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn each_caller_keeps_its_own_deadline_on_a_shared_fetch() {
        let source = Arc::new(SlowSource::default());
        let (svc, cache) = service(vec![Arc::clone(&source) as Arc<dyn WeatherSourcePort>]);

        let (hurried, patient) = tokio::join!(
            svc.current_weather(location(), Deadline::after(Duration::from_secs(1))),
            svc.current_weather(location(), Deadline::none()),
        );

        assert_eq!(hurried.reason(), Some(&UnavailableReason::DeadlineExceeded));
        assert!(patient.is_available());
        assert_eq!(source.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(cache.stats().entries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_fetch_still_fills_the_cache() {
        let source = Arc::new(SlowSource::default());
        let (svc, _) = service(vec![Arc::clone(&source) as Arc<dyn WeatherSourcePort>]);

        let hurried = svc
            .current_weather(location(), Deadline::after(Duration::from_millis(500)))
            .await;
        assert_eq!(hurried.reason(), Some(&UnavailableReason::DeadlineExceeded));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(svc.current_weather(location(), Deadline::none()).await.is_available());
        assert_eq!(source.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    struct PanickingSource;

    #[async_trait::async_trait]
    impl WeatherSourcePort for PanickingSource {
        fn provider_id(&self) -> ProviderId {
            ProviderId::OpenWeatherMap
        }

        fn reliability(&self) -> f64 {
            ProviderId::OpenWeatherMap.reliability()
        }

        fn supports(&self, _operation: WeatherOperation) -> bool {
            true
        }

        #[allow(clippy::panic)]
        async fn fetch(&self, _query: &WeatherQuery) -> Result<ForecastBundle, ApplicationError> {
            panic!("adapter bug")
        }
    }

    #[tokio::test]
    async fn aborted_fetch_is_an_internal_failure() {
        let (svc, cache) = service(vec![Arc::new(PanickingSource)]);

        let outcome = svc.current_weather(location(), Deadline::none()).await;
        assert!(matches!(
            outcome.reason(),
            Some(UnavailableReason::Internal { .. })
        ));
        assert_eq!(cache.stats().entries, 0);
    }

    #[tokio::test]
    async fn extended_forecast_clamps_days() {
        let (svc, _) = service(vec![provider(ProviderId::WeatherApi, 1, |q| {
            assert!(matches!(q, WeatherQuery::Extended { days: 14, .. }));
            Ok(bundle(ProviderId::WeatherApi, 16, Vec::new()))
        })]);

        let outcome = svc.extended_forecast(location(), 30, Deadline::none()).await;
        assert_eq!(outcome.available().unwrap().daily().len(), 14);
    }

    #[tokio::test]
    async fn historical_weather_is_sorted_and_filtered() {
        let now = Utc::now();
        let range = HistoricalRange::last_hours(now, 6).unwrap();
        let start = range.start();
        let (svc, _) = service(vec![provider(ProviderId::VisualCrossing, 1, move |_| {
            // two hours before the range plus six inside it
            Ok(bundle(
                ProviderId::VisualCrossing,
                0,
                hourly(start - ChronoDuration::hours(2), 8, ProviderId::VisualCrossing),
            ))
        })]);

        let obs = svc
            .historical_weather(location(), range, Deadline::none())
            .await
            .available()
            .unwrap();
        assert_eq!(obs.len(), 6);
        assert!(obs.iter().all(|o| range.contains(o.timestamp())));
        assert!(obs.windows(2).all(|w| w[0].timestamp() < w[1].timestamp()));
    }

    #[tokio::test]
    async fn agriculture_forecast_derives_seven_days() {
        let (svc, _) = service(vec![provider(ProviderId::WeatherApi, 1, |q| {
            assert!(matches!(q, WeatherQuery::Extended { days: 7, .. }));
            Ok(bundle(ProviderId::WeatherApi, 7, Vec::new()))
        })]);

        let indices = svc
            .agriculture_forecast(location(), Some(CropType::Corn), Deadline::none())
            .await
            .available()
            .unwrap();
        assert_eq!(indices.len(), 7);
        assert!((indices[0].disease_pressure - 80.0).abs() < 1e-9);
        assert!((indices[6].cumulative_gdd - 70.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn prediction_with_short_history_is_not_available() {
        let mut loader = MockModelLoaderPort::new();
        loader.expect_load().never();
        let svc = WeatherService::new(
            FallbackOrchestrator::new(vec![provider(ProviderId::WeatherApi, 1, |q| {
                let WeatherQuery::Historical { range, .. } = q else {
                    panic!("expected historical query");
                };
                Ok(bundle(
                    ProviderId::WeatherApi,
                    0,
                    hourly(range.end() - ChronoDuration::hours(10), 10, ProviderId::WeatherApi),
                ))
            })]),
            Arc::new(MemoryCacheDouble::default()),
            PredictionEngine::new(Arc::new(loader)),
        );

        let outcome = svc.generate_prediction(location(), 12, Deadline::none()).await;
        assert!(matches!(
            outcome.reason(),
            Some(UnavailableReason::InsufficientHistory {
                required_hours: 24,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn prediction_uses_recent_history() {
        let mut model = MockForecastModelPort::new();
        model.expect_version().return_const("test-v1".to_string());
        model
            .expect_predict_temperature()
            .returning(|_, horizon| Ok(vec![15.0; horizon]));
        model
            .expect_predict_precipitation_probability()
            .returning(|_| Ok(0.3));
        let model: Arc<dyn crate::ports::ForecastModelPort> = Arc::new(model);
        let mut loader = MockModelLoaderPort::new();
        loader
            .expect_load()
            .returning(move || Ok(Arc::clone(&model)));

        let cache = Arc::new(MemoryCacheDouble::default());
        let svc = WeatherService::new(
            FallbackOrchestrator::new(vec![provider(ProviderId::WeatherApi, 1, |q| {
                let WeatherQuery::Historical { range, .. } = q else {
                    panic!("expected historical query");
                };
                Ok(bundle(
                    ProviderId::WeatherApi,
                    0,
                    hourly(range.end() - ChronoDuration::hours(40), 40, ProviderId::WeatherApi),
                ))
            })]),
            cache as Arc<dyn CachePort>,
            PredictionEngine::new(Arc::new(loader)),
        );

        let bundle = svc
            .generate_prediction(location(), 12, Deadline::none())
            .await
            .available()
            .unwrap();
        assert_eq!(bundle.horizon_hours(), 12);
        assert_eq!(bundle.model_version(), "test-v1");
    }

    #[tokio::test]
    async fn invalidate_location_forces_refetch() {
        let (svc, _) = service(vec![provider(ProviderId::WeatherApi, 2, |_| {
            Ok(bundle(ProviderId::WeatherApi, 1, Vec::new()))
        })]);

        assert!(svc.current_weather(location(), Deadline::none()).await.is_available());
        assert_eq!(svc.invalidate_location(location()).await.unwrap(), 1);
        assert!(svc.current_weather(location(), Deadline::none()).await.is_available());
    }

    #[tokio::test]
    async fn cache_key_rounds_coordinates() {
        let (svc, _) = service(Vec::new());
        let key = svc.cache_key(&WeatherQuery::Extended {
            location: location(),
            days: 7,
        });
        assert_eq!(key, "extended:52.52:13.40:days=7");
        assert_eq!(WeatherOperation::Extended.as_str(), "extended");
    }

    #[tokio::test]
    async fn provider_status_lists_sources_in_order() {
        let (svc, _) = service(vec![
            failing(ProviderId::TomorrowIo, 0),
            failing(ProviderId::VisualCrossing, 0),
        ]);
        let status = svc.provider_status();
        assert_eq!(status[0].provider, ProviderId::TomorrowIo);
        assert_eq!(status[1].priority, 2);
    }
}
