//! Provider fallback orchestration
//!
//! Tries weather sources one at a time in priority order until one returns a
//! normalized bundle. Each attempt gets its own timeout, capped by the
//! caller's deadline.

use std::{fmt, sync::Arc, time::Duration};

use domain::{ForecastBundle, ProviderId, WeatherQuery};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    deadline::Deadline,
    outcome::{ProviderFailure, UnavailableReason, WeatherOutcome},
    ports::WeatherSourcePort,
};

/// Default per-attempt timeout in seconds
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 10;

/// A configured provider as reported by [`FallbackOrchestrator::providers`]
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ProviderStatus {
    /// Position in the fallback order, starting at 1
    pub priority: usize,
    pub provider: ProviderId,
    pub reliability: f64,
}

/// Sequential fallback across weather sources
pub struct FallbackOrchestrator {
    sources: Vec<Arc<dyn WeatherSourcePort>>,
    attempt_timeout: Duration,
}

impl fmt::Debug for FallbackOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<ProviderId> = self.sources.iter().map(|s| s.provider_id()).collect();
        f.debug_struct("FallbackOrchestrator")
            .field("sources", &ids)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl FallbackOrchestrator {
    /// Sources are tried in the order given
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn WeatherSourcePort>>) -> Self {
        Self {
            sources,
            attempt_timeout: Duration::from_secs(DEFAULT_ATTEMPT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub const fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Configured providers in fallback order
    #[must_use]
    pub fn providers(&self) -> Vec<ProviderStatus> {
        self.sources
            .iter()
            .enumerate()
            .map(|(i, source)| ProviderStatus {
                priority: i + 1,
                provider: source.provider_id(),
                reliability: source.reliability(),
            })
            .collect()
    }

    /// Try each source until one answers
    ///
    /// Sources that do not support the operation are skipped without counting
    /// as failures. On success the bundle is stamped with the serving source
    /// and its reliability. Once the deadline passes, remaining sources are
    /// abandoned.
    #[instrument(
        skip(self, query, deadline),
        fields(
            operation = %query.operation(),
            lat = query.location().latitude(),
            lon = query.location().longitude()
        )
    )]
    pub async fn fetch(
        &self,
        query: &WeatherQuery,
        deadline: Deadline,
    ) -> WeatherOutcome<ForecastBundle> {
        let mut attempts: Vec<ProviderFailure> = Vec::new();

        for source in &self.sources {
            let provider = source.provider_id();
            if !source.supports(query.operation()) {
                debug!(%provider, "Provider does not support operation, skipping");
                continue;
            }
            if deadline.is_expired() {
                warn!(%provider, attempted = attempts.len(), "Deadline passed, abandoning remaining providers");
                return WeatherOutcome::Unavailable(UnavailableReason::DeadlineExceeded);
            }

            let budget = deadline.cap(self.attempt_timeout);
            match tokio::time::timeout(budget, source.fetch(query)).await {
                Ok(Ok(bundle)) => {
                    info!(%provider, failed_before = attempts.len(), "Provider served weather data");
                    return WeatherOutcome::Available(
                        bundle.with_provenance(provider, source.reliability()),
                    );
                },
                Ok(Err(e)) => {
                    warn!(%provider, error = %e, "Provider failed, trying next");
                    attempts.push(ProviderFailure::from_error(provider, &e));
                },
                Err(_) if deadline.is_expired() => {
                    warn!(%provider, "Deadline passed during provider attempt");
                    return WeatherOutcome::Unavailable(UnavailableReason::DeadlineExceeded);
                },
                Err(_) => {
                    warn!(%provider, timeout_ms = budget.as_millis(), "Provider timed out, trying next");
                    attempts.push(ProviderFailure::timeout(provider));
                },
            }
        }

        if attempts.is_empty() {
            warn!("No configured provider supports this operation");
            return WeatherOutcome::Unavailable(UnavailableReason::NoProviderAttempted);
        }

        error!(attempts = attempts.len(), "All weather providers failed");
        WeatherOutcome::Unavailable(UnavailableReason::AllProvidersFailed { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApplicationError, outcome::FailureKind, ports::MockWeatherSourcePort};
    use chrono::Utc;
    use domain::{GeoLocation, LocationInfo, Observation, WeatherOperation};

    fn location() -> GeoLocation {
        GeoLocation::new(52.52, 13.40).unwrap()
    }

    fn bundle(source: ProviderId) -> ForecastBundle {
        let now = Utc::now();
        ForecastBundle::new(
            LocationInfo::from_coordinates(52.52, 13.40),
            Observation::new(source, now, 18.0),
            Vec::new(),
            Vec::new(),
            source,
            now,
        )
        .unwrap()
    }

    fn source(
        id: ProviderId,
        result: fn(ProviderId) -> Result<ForecastBundle, ApplicationError>,
        calls: usize,
    ) -> Arc<dyn WeatherSourcePort> {
        let mut mock = MockWeatherSourcePort::new();
        mock.expect_provider_id().return_const(id);
        mock.expect_reliability().return_const(id.reliability());
        mock.expect_supports().return_const(true);
        mock.expect_fetch()
            .times(calls)
            .returning(move |_| result(id));
        Arc::new(mock)
    }

    fn ok(id: ProviderId) -> Result<ForecastBundle, ApplicationError> {
        Ok(bundle(id))
    }

    fn unavailable(id: ProviderId) -> Result<ForecastBundle, ApplicationError> {
        Err(ApplicationError::ProviderUnavailable {
            provider: id,
            message: "HTTP 503".to_string(),
        })
    }

    fn malformed(id: ProviderId) -> Result<ForecastBundle, ApplicationError> {
        Err(ApplicationError::Parse {
            provider: id,
            message: "missing current".to_string(),
        })
    }

    #[tokio::test]
    async fn first_success_wins_and_later_sources_are_not_called() {
        let orchestrator = FallbackOrchestrator::new(vec![
            source(ProviderId::OpenWeatherMap, ok, 1),
            source(ProviderId::WeatherApi, ok, 0),
        ]);
        let outcome = orchestrator
            .fetch(&WeatherQuery::Current { location: location() }, Deadline::none())
            .await;
        let bundle = outcome.available().unwrap();
        assert_eq!(bundle.source(), ProviderId::OpenWeatherMap);
        assert!((bundle.reliability() - 0.90).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn falls_back_when_first_provider_fails() {
        let orchestrator = FallbackOrchestrator::new(vec![
            source(ProviderId::OpenWeatherMap, unavailable, 1),
            source(ProviderId::WeatherApi, ok, 1),
        ]);
        let outcome = orchestrator
            .fetch(&WeatherQuery::Current { location: location() }, Deadline::none())
            .await;
        let bundle = outcome.available().unwrap();
        assert_eq!(bundle.source(), ProviderId::WeatherApi);
        assert!((bundle.reliability() - 0.88).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn parse_errors_also_advance() {
        let orchestrator = FallbackOrchestrator::new(vec![
            source(ProviderId::OpenWeatherMap, malformed, 1),
            source(ProviderId::TomorrowIo, ok, 1),
        ]);
        let outcome = orchestrator
            .fetch(&WeatherQuery::Current { location: location() }, Deadline::none())
            .await;
        assert_eq!(outcome.available().unwrap().source(), ProviderId::TomorrowIo);
    }

    #[tokio::test]
    async fn all_failures_yield_unavailable_with_attempts() {
        let orchestrator = FallbackOrchestrator::new(vec![
            source(ProviderId::OpenWeatherMap, unavailable, 1),
            source(ProviderId::WeatherApi, malformed, 1),
        ]);
        let outcome = orchestrator
            .fetch(&WeatherQuery::Current { location: location() }, Deadline::none())
            .await;
        match outcome {
            WeatherOutcome::Unavailable(UnavailableReason::AllProvidersFailed { attempts }) => {
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].provider, ProviderId::OpenWeatherMap);
                assert_eq!(attempts[0].kind, FailureKind::Unavailable);
                assert_eq!(attempts[1].kind, FailureKind::Parse);
            },
            other => panic!("expected AllProvidersFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsupported_operations_are_skipped() {
        let mut mock = MockWeatherSourcePort::new();
        mock.expect_provider_id()
            .return_const(ProviderId::OpenWeatherMap);
        mock.expect_reliability().return_const(0.9);
        mock.expect_supports()
            .returning(|op| op != WeatherOperation::Historical);
        mock.expect_fetch().never();

        let orchestrator = FallbackOrchestrator::new(vec![Arc::new(mock)]);
        let range = domain::HistoricalRange::last_hours(Utc::now(), 48).unwrap();
        let outcome = orchestrator
            .fetch(
                &WeatherQuery::Historical {
                    location: location(),
                    range,
                },
                Deadline::none(),
            )
            .await;
        assert_eq!(
            outcome.reason(),
            Some(&UnavailableReason::NoProviderAttempted)
        );
    }

    #[tokio::test]
    async fn empty_orchestrator_attempts_nothing() {
        let orchestrator = FallbackOrchestrator::new(Vec::new());
        assert!(orchestrator.is_empty());
        let outcome = orchestrator
            .fetch(&WeatherQuery::Current { location: location() }, Deadline::none())
            .await;
        assert_eq!(
            outcome.reason(),
            Some(&UnavailableReason::NoProviderAttempted)
        );
    }

    /// Source that never answers within any reasonable time
    struct StalledSource(ProviderId);

    #[async_trait::async_trait]
    impl WeatherSourcePort for StalledSource {
        fn provider_id(&self) -> ProviderId {
            self.0
        }

        fn reliability(&self) -> f64 {
            self.0.reliability()
        }

        fn supports(&self, _operation: WeatherOperation) -> bool {
            true
        }

        async fn fetch(&self, _query: &WeatherQuery) -> Result<ForecastBundle, ApplicationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(bundle(self.0))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_attempt_advances_to_next_provider() {
        let orchestrator = FallbackOrchestrator::new(vec![
            Arc::new(StalledSource(ProviderId::OpenWeatherMap)),
            source(ProviderId::WeatherApi, ok, 1),
        ])
        .with_attempt_timeout(Duration::from_secs(2));

        let outcome = orchestrator
            .fetch(&WeatherQuery::Current { location: location() }, Deadline::none())
            .await;
        assert_eq!(outcome.available().unwrap().source(), ProviderId::WeatherApi);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_abandons_remaining_providers() {
        let orchestrator = FallbackOrchestrator::new(vec![
            Arc::new(StalledSource(ProviderId::OpenWeatherMap)),
            source(ProviderId::WeatherApi, ok, 0),
        ])
        .with_attempt_timeout(Duration::from_secs(10));

        let outcome = orchestrator
            .fetch(
                &WeatherQuery::Current { location: location() },
                Deadline::after(Duration::from_secs(3)),
            )
            .await;
        assert_eq!(outcome.reason(), Some(&UnavailableReason::DeadlineExceeded));
    }

    #[test]
    fn providers_report_priority_order() {
        let orchestrator = FallbackOrchestrator::new(vec![
            source(ProviderId::WeatherApi, ok, 0),
            source(ProviderId::VisualCrossing, ok, 0),
        ]);
        let providers = orchestrator.providers();
        assert_eq!(providers.len(), 2);
        assert_eq!(providers[0].priority, 1);
        assert_eq!(providers[0].provider, ProviderId::WeatherApi);
        assert_eq!(providers[1].provider, ProviderId::VisualCrossing);
        assert!((providers[1].reliability - 0.85).abs() < f64::EPSILON);
    }
}
