//! Forecast bundle aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DailyAggregate, DomainError, Observation, ProviderId, WeatherAlert};

/// Where a bundle applies, as resolved by the serving provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub name: String,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone name, e.g. `Europe/Berlin`
    pub timezone: String,
}

impl LocationInfo {
    /// Location known only by its coordinates
    #[must_use]
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            name: format!("{latitude:.4},{longitude:.4}"),
            country: None,
            latitude,
            longitude,
            timezone: "UTC".to_string(),
        }
    }
}

/// Everything one provider returned for one query, in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    location: LocationInfo,
    current: Observation,
    hourly: Vec<Observation>,
    daily: Vec<DailyAggregate>,
    #[serde(default)]
    alerts: Vec<WeatherAlert>,
    source: ProviderId,
    reliability: f64,
    last_updated: DateTime<Utc>,
}

impl ForecastBundle {
    /// Assemble a bundle, checking that hourly observations strictly increase in time
    ///
    /// The reliability starts at the source's static weight.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnorderedObservations` at the first hour that does
    /// not come after its predecessor
    pub fn new(
        location: LocationInfo,
        current: Observation,
        hourly: Vec<Observation>,
        daily: Vec<DailyAggregate>,
        source: ProviderId,
        last_updated: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if let Some(index) = hourly
            .windows(2)
            .position(|w| w[1].timestamp() <= w[0].timestamp())
        {
            return Err(DomainError::UnorderedObservations { index: index + 1 });
        }
        Ok(Self {
            location,
            current,
            hourly,
            daily,
            alerts: Vec::new(),
            source,
            reliability: source.reliability(),
            last_updated,
        })
    }

    #[must_use]
    pub fn with_alerts(mut self, alerts: Vec<WeatherAlert>) -> Self {
        self.alerts = alerts;
        self
    }

    /// Record which source served the bundle and its weight, clamped to `[0, 1]`
    #[must_use]
    pub fn with_provenance(mut self, source: ProviderId, reliability: f64) -> Self {
        self.source = source;
        self.reliability = if reliability.is_nan() {
            0.0
        } else {
            reliability.clamp(0.0, 1.0)
        };
        self
    }

    #[must_use]
    pub const fn location(&self) -> &LocationInfo {
        &self.location
    }

    #[must_use]
    pub const fn current(&self) -> &Observation {
        &self.current
    }

    #[must_use]
    pub fn hourly(&self) -> &[Observation] {
        &self.hourly
    }

    #[must_use]
    pub fn daily(&self) -> &[DailyAggregate] {
        &self.daily
    }

    #[must_use]
    pub fn alerts(&self) -> &[WeatherAlert] {
        &self.alerts
    }

    #[must_use]
    pub const fn source(&self) -> ProviderId {
        self.source
    }

    #[must_use]
    pub const fn reliability(&self) -> f64 {
        self.reliability
    }

    #[must_use]
    pub const fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Drop daily aggregates beyond the first `days`
    #[must_use]
    pub fn truncate_days(mut self, days: usize) -> Self {
        self.daily.truncate(days);
        self
    }

    /// Consume the bundle, keeping only the hourly series
    #[must_use]
    pub fn into_hourly(self) -> Vec<Observation> {
        self.hourly
    }
}
