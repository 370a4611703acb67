//! Deterministic synthetic weather for development
//!
//! Every value is a smooth function of the location and the instant, so two
//! requests for the same hour always agree. Never registered in production.

use std::f64::consts::TAU;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, DurationRound, NaiveDate, NaiveTime, Timelike, Utc};
use domain::{
    DailyAggregate, ForecastBundle, GeoLocation, LocationInfo, Observation, ProviderId,
    WeatherCondition, WeatherOperation, WeatherQuery,
};
use tracing::{debug, instrument};

use crate::{error::WeatherError, provider::WeatherProvider};

/// Hours of hourly outlook attached to current and extended answers
const OUTLOOK_HOURS: i64 = 48;

/// Days of daily outlook attached to a current-conditions answer
const CURRENT_DAYS: u8 = 3;

/// Synthetic provider
#[derive(Debug, Clone, Default)]
pub struct SimulationProvider {
    fixed_now: Option<DateTime<Utc>>,
}

impl SimulationProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the clock, for reproducible outlooks in tests and demos
    #[must_use]
    pub const fn with_fixed_now(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    /// Synthetic reading for one instant
    #[must_use]
    pub fn sample(location: GeoLocation, at: DateTime<Utc>) -> Observation {
        let lat = location.latitude();
        let lon = location.longitude();
        let hours = at.timestamp() as f64 / 3600.0;

        let seasonal_sign = if lat < 0.0 { -1.0 } else { 1.0 };
        let day_of_year = f64::from(at.ordinal());
        let seasonal = seasonal_sign * 8.0 * (TAU * (day_of_year - 200.0) / 365.0).cos();
        let local_hour = (f64::from(at.hour()) + lon / 15.0).rem_euclid(24.0);
        let diurnal = 5.0 * (TAU * (local_hour - 9.0) / 24.0).sin();
        let temperature = 0.4f64.mul_add(-lat.abs(), 26.0) + seasonal + diurnal;

        let cloud = 40.0f64.mul_add((TAU * hours / 72.0 + lat).sin(), 50.0);
        let precipitation = if cloud > 80.0 { (cloud - 80.0) / 10.0 } else { 0.0 };
        let condition = if precipitation > 2.0 {
            WeatherCondition::ModerateRain
        } else if precipitation > 0.0 {
            WeatherCondition::LightRain
        } else if cloud > 70.0 {
            WeatherCondition::Overcast
        } else if cloud > 30.0 {
            WeatherCondition::PartlyCloudy
        } else {
            WeatherCondition::Clear
        };

        Observation::new(ProviderId::Simulation, at, temperature)
            .with_humidity(2.0f64.mul_add(-diurnal, 0.3f64.mul_add(cloud, 45.0)))
            .with_pressure(4.0f64.mul_add((TAU * hours / 120.0).sin(), 1013.0))
            .with_wind(
                1.5f64.mul_add((TAU * hours / 30.0 + lon).sin(), 3.0),
                (hours * 7.5).rem_euclid(360.0),
            )
            .with_precipitation(precipitation, cloud.mul_add(1.1, -10.0).clamp(0.0, 100.0))
            .with_cloud_cover(cloud)
            .with_uv_index((diurnal + 5.0).max(0.0) * (1.0 - cloud / 150.0))
            .with_visibility(if precipitation > 0.0 { 6.0 } else { 10.0 })
            .with_condition(condition, condition.description(), None)
    }

    fn day(location: GeoLocation, date: NaiveDate) -> Result<DailyAggregate, WeatherError> {
        let midnight = date.and_time(NaiveTime::MIN).and_utc();
        let samples: Vec<Observation> = (0..24)
            .map(|h| Self::sample(location, midnight + Duration::hours(h)))
            .collect();
        let (min, max) = samples.iter().fold((f64::MAX, f64::MIN), |(lo, hi), o| {
            (lo.min(o.temperature()), hi.max(o.temperature()))
        });
        let humidity = samples.iter().map(Observation::humidity).sum::<f64>() / 24.0;
        let precipitation = samples.iter().map(Observation::precipitation).sum::<f64>();
        let probability = samples
            .iter()
            .map(Observation::precipitation_probability)
            .fold(0.0, f64::max);
        let wind = samples
            .iter()
            .map(Observation::wind_speed)
            .fold(0.0, f64::max);
        let condition = if precipitation > 0.0 {
            WeatherCondition::LightRain
        } else {
            WeatherCondition::PartlyCloudy
        };

        Ok(DailyAggregate::new(date, min, max)?
            .with_humidity(humidity)
            .with_precipitation(precipitation, probability)
            .with_max_wind(wind)
            .with_condition(condition, condition.description()))
    }

    fn hours_between(
        location: GeoLocation,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Observation> {
        let mut hourly = Vec::new();
        let mut at = from;
        while at < to {
            hourly.push(Self::sample(location, at));
            at += Duration::hours(1);
        }
        hourly
    }

    fn build(&self, query: &WeatherQuery) -> Result<ForecastBundle, WeatherError> {
        let location = query.location();
        let now = self.now();
        let hour = now
            .duration_trunc(Duration::hours(1))
            .map_err(|e| WeatherError::RequestFailed(e.to_string()))?;

        let (hourly, days) = match query {
            WeatherQuery::Current { .. } => (
                Self::hours_between(location, hour, hour + Duration::hours(OUTLOOK_HOURS)),
                CURRENT_DAYS,
            ),
            WeatherQuery::Extended { days, .. } => (
                Self::hours_between(location, hour, hour + Duration::hours(OUTLOOK_HOURS)),
                *days,
            ),
            WeatherQuery::Historical { range, .. } => {
                let start = range
                    .start()
                    .duration_trunc(Duration::hours(1))
                    .map_err(|e| WeatherError::RequestFailed(e.to_string()))?;
                (Self::hours_between(location, start, range.end()), 0)
            },
        };

        let daily = match query {
            WeatherQuery::Historical { range, .. } => range
                .days()
                .into_iter()
                .map(|d| Self::day(location, d))
                .collect::<Result<Vec<_>, _>>()?,
            WeatherQuery::Current { .. } | WeatherQuery::Extended { .. } => (0..i64::from(days))
                .map(|offset| Self::day(location, hour.date_naive() + Duration::days(offset)))
                .collect::<Result<Vec<_>, _>>()?,
        };

        let current = match query {
            WeatherQuery::Historical { .. } => hourly.last().cloned().ok_or_else(|| {
                WeatherError::RequestFailed("historical range covers no whole hour".to_string())
            })?,
            WeatherQuery::Current { .. } | WeatherQuery::Extended { .. } => {
                Self::sample(location, now)
            },
        };

        let mut info = LocationInfo::from_coordinates(location.latitude(), location.longitude());
        info.name = format!("Simulated {}", info.name);

        ForecastBundle::new(info, current, hourly, daily, ProviderId::Simulation, now)
            .map_err(WeatherError::from)
    }
}

#[async_trait]
impl WeatherProvider for SimulationProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Simulation
    }

    fn supports(&self, _operation: WeatherOperation) -> bool {
        true
    }

    #[instrument(
        skip(self),
        fields(
            provider = "simulation",
            lat = query.location().latitude(),
            lon = query.location().longitude()
        )
    )]
    async fn fetch(&self, query: &WeatherQuery) -> Result<ForecastBundle, WeatherError> {
        debug!("Generating simulated weather");
        self.build(query)
    }
}
