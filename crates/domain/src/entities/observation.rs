//! Point-in-time weather observation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ProviderId, WeatherCondition};

/// Standard sea-level pressure in hPa, used when a provider omits pressure
pub const STANDARD_PRESSURE_HPA: f64 = 1013.25;

/// A single weather reading or forecast hour in canonical units
///
/// Temperatures in Celsius, wind in m/s, pressure in hPa, precipitation in mm,
/// visibility in km, percentages in `[0, 100]`. Built with [`Observation::new`]
/// and the `with_*` methods; there are no mutators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    timestamp: DateTime<Utc>,
    temperature: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
    wind_speed: f64,
    wind_direction: f64,
    precipitation: f64,
    precipitation_probability: f64,
    cloud_cover: f64,
    uv_index: Option<f64>,
    visibility: Option<f64>,
    condition: WeatherCondition,
    description: String,
    condition_code: Option<i64>,
    source: ProviderId,
}

impl Observation {
    /// Create an observation with neutral defaults for everything but the temperature
    #[must_use]
    pub fn new(source: ProviderId, timestamp: DateTime<Utc>, temperature: f64) -> Self {
        Self {
            timestamp,
            temperature,
            feels_like: temperature,
            humidity: 0.0,
            pressure: STANDARD_PRESSURE_HPA,
            wind_speed: 0.0,
            wind_direction: 0.0,
            precipitation: 0.0,
            precipitation_probability: 0.0,
            cloud_cover: 0.0,
            uv_index: None,
            visibility: None,
            condition: WeatherCondition::Unknown,
            description: String::new(),
            condition_code: None,
            source,
        }
    }

    #[must_use]
    pub const fn with_feels_like(mut self, feels_like: f64) -> Self {
        self.feels_like = feels_like;
        self
    }

    /// Relative humidity in percent, clamped to `[0, 100]`
    #[must_use]
    pub fn with_humidity(mut self, humidity: f64) -> Self {
        self.humidity = clamp_percent(humidity);
        self
    }

    #[must_use]
    pub const fn with_pressure(mut self, pressure_hpa: f64) -> Self {
        self.pressure = pressure_hpa;
        self
    }

    /// Wind speed in m/s and direction in degrees
    #[must_use]
    pub fn with_wind(mut self, speed_ms: f64, direction_deg: f64) -> Self {
        self.wind_speed = speed_ms.max(0.0);
        self.wind_direction = direction_deg.rem_euclid(360.0);
        self
    }

    /// Precipitation in mm (negative values floor at 0) and probability in percent
    #[must_use]
    pub fn with_precipitation(mut self, amount_mm: f64, probability: f64) -> Self {
        self.precipitation = amount_mm.max(0.0);
        self.precipitation_probability = clamp_percent(probability);
        self
    }

    #[must_use]
    pub fn with_cloud_cover(mut self, cloud_cover: f64) -> Self {
        self.cloud_cover = clamp_percent(cloud_cover);
        self
    }

    #[must_use]
    pub const fn with_uv_index(mut self, uv_index: f64) -> Self {
        self.uv_index = Some(uv_index);
        self
    }

    #[must_use]
    pub const fn with_visibility(mut self, visibility_km: f64) -> Self {
        self.visibility = Some(visibility_km);
        self
    }

    /// Canonical condition plus the provider's own text and code
    #[must_use]
    pub fn with_condition(
        mut self,
        condition: WeatherCondition,
        description: impl Into<String>,
        code: Option<i64>,
    ) -> Self {
        self.condition = condition;
        self.description = description.into();
        self.condition_code = code;
        self
    }

    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }

    #[must_use]
    pub const fn feels_like(&self) -> f64 {
        self.feels_like
    }

    #[must_use]
    pub const fn humidity(&self) -> f64 {
        self.humidity
    }

    #[must_use]
    pub const fn pressure(&self) -> f64 {
        self.pressure
    }

    #[must_use]
    pub const fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    #[must_use]
    pub const fn wind_direction(&self) -> f64 {
        self.wind_direction
    }

    #[must_use]
    pub const fn precipitation(&self) -> f64 {
        self.precipitation
    }

    #[must_use]
    pub const fn precipitation_probability(&self) -> f64 {
        self.precipitation_probability
    }

    #[must_use]
    pub const fn cloud_cover(&self) -> f64 {
        self.cloud_cover
    }

    #[must_use]
    pub const fn uv_index(&self) -> Option<f64> {
        self.uv_index
    }

    #[must_use]
    pub const fn visibility(&self) -> Option<f64> {
        self.visibility
    }

    #[must_use]
    pub const fn condition(&self) -> WeatherCondition {
        self.condition
    }

    /// Provider-supplied condition text, or the canonical description when absent
    #[must_use]
    pub fn description(&self) -> &str {
        if self.description.is_empty() {
            self.condition.description()
        } else {
            &self.description
        }
    }

    #[must_use]
    pub const fn condition_code(&self) -> Option<i64> {
        self.condition_code
    }

    #[must_use]
    pub const fn source(&self) -> ProviderId {
        self.source
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn feels_like_defaults_to_temperature() {
        let obs = Observation::new(ProviderId::WeatherApi, ts(), 21.5);
        assert!((obs.feels_like() - 21.5).abs() < f64::EPSILON);
        assert!((obs.pressure() - STANDARD_PRESSURE_HPA).abs() < f64::EPSILON);
    }

    #[test]
    fn percentages_are_clamped() {
        let obs = Observation::new(ProviderId::WeatherApi, ts(), 20.0)
            .with_humidity(120.0)
            .with_cloud_cover(-5.0)
            .with_precipitation(-1.0, 150.0);
        assert!((obs.humidity() - 100.0).abs() < f64::EPSILON);
        assert!(obs.cloud_cover().abs() < f64::EPSILON);
        assert!(obs.precipitation().abs() < f64::EPSILON);
        assert!((obs.precipitation_probability() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wind_direction_wraps() {
        let obs = Observation::new(ProviderId::WeatherApi, ts(), 20.0).with_wind(3.0, 370.0);
        assert!((obs.wind_direction() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn description_falls_back_to_condition() {
        let obs = Observation::new(ProviderId::Simulation, ts(), 20.0).with_condition(
            WeatherCondition::Fog,
            "",
            None,
        );
        assert_eq!(obs.description(), "Fog");

        let obs = obs.with_condition(WeatherCondition::Fog, "Mist", Some(701));
        assert_eq!(obs.description(), "Mist");
        assert_eq!(obs.condition_code(), Some(701));
    }

    #[test]
    fn serde_round_trip_preserves_values() {
        let obs = Observation::new(ProviderId::TomorrowIo, ts(), 18.25)
            .with_humidity(64.0)
            .with_wind(4.2, 180.0)
            .with_visibility(9.5);
        let json = serde_json::to_string(&obs).unwrap();
        let back: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(obs, back);
    }
}
