//! Day-level weather summary

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, WeatherCondition, agronomy::thermal};

/// Base temperature for the aggregate's own growing degree days
pub const DEFAULT_GDD_BASE: f64 = 10.0;

/// Summary of one forecast or observed day
///
/// `growing_degree_days`, `heat_stress_hours` and `chill_hours` are derived
/// from the aggregate's min/max at construction and cannot be set. The
/// temperature range itself is fixed once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DailyAggregateFields")]
pub struct DailyAggregate {
    date: NaiveDate,
    temp_min: f64,
    temp_max: f64,
    humidity_avg: f64,
    precipitation_total: f64,
    precipitation_probability: f64,
    wind_speed_max: f64,
    condition: WeatherCondition,
    description: String,
    sunrise: Option<DateTime<Utc>>,
    sunset: Option<DateTime<Utc>>,
    growing_degree_days: f64,
    heat_stress_hours: f64,
    chill_hours: f64,
}

impl DailyAggregate {
    /// Create an aggregate for `date` with the given temperature range
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTemperatureRange` if `min > max` or either
    /// value is not a number
    pub fn new(date: NaiveDate, temp_min: f64, temp_max: f64) -> Result<Self, DomainError> {
        if temp_min.is_nan() || temp_max.is_nan() || temp_min > temp_max {
            return Err(DomainError::InvalidTemperatureRange {
                min: temp_min,
                max: temp_max,
            });
        }
        Ok(Self {
            date,
            temp_min,
            temp_max,
            humidity_avg: 0.0,
            precipitation_total: 0.0,
            precipitation_probability: 0.0,
            wind_speed_max: 0.0,
            condition: WeatherCondition::Unknown,
            description: String::new(),
            sunrise: None,
            sunset: None,
            growing_degree_days: thermal::growing_degree_days(temp_min, temp_max, DEFAULT_GDD_BASE),
            heat_stress_hours: thermal::heat_stress_hours(temp_min, temp_max),
            chill_hours: thermal::chill_hours(temp_min, temp_max),
        })
    }

    #[must_use]
    pub fn with_humidity(mut self, humidity_avg: f64) -> Self {
        self.humidity_avg = humidity_avg.clamp(0.0, 100.0);
        self
    }

    /// Total precipitation in mm and the day's chance of precipitation in percent
    #[must_use]
    pub fn with_precipitation(mut self, total_mm: f64, probability: f64) -> Self {
        self.precipitation_total = total_mm.max(0.0);
        self.precipitation_probability = probability.clamp(0.0, 100.0);
        self
    }

    #[must_use]
    pub fn with_max_wind(mut self, wind_speed_max: f64) -> Self {
        self.wind_speed_max = wind_speed_max.max(0.0);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: WeatherCondition, description: impl Into<String>) -> Self {
        self.condition = condition;
        self.description = description.into();
        self
    }

    #[must_use]
    pub const fn with_sun(
        mut self,
        sunrise: Option<DateTime<Utc>>,
        sunset: Option<DateTime<Utc>>,
    ) -> Self {
        self.sunrise = sunrise;
        self.sunset = sunset;
        self
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub const fn temp_min(&self) -> f64 {
        self.temp_min
    }

    #[must_use]
    pub const fn temp_max(&self) -> f64 {
        self.temp_max
    }

    #[must_use]
    pub fn temp_mean(&self) -> f64 {
        (self.temp_min + self.temp_max) / 2.0
    }

    #[must_use]
    pub const fn humidity_avg(&self) -> f64 {
        self.humidity_avg
    }

    #[must_use]
    pub const fn precipitation_total(&self) -> f64 {
        self.precipitation_total
    }

    #[must_use]
    pub const fn precipitation_probability(&self) -> f64 {
        self.precipitation_probability
    }

    #[must_use]
    pub const fn wind_speed_max(&self) -> f64 {
        self.wind_speed_max
    }

    #[must_use]
    pub const fn condition(&self) -> WeatherCondition {
        self.condition
    }

    #[must_use]
    pub fn description(&self) -> &str {
        if self.description.is_empty() {
            self.condition.description()
        } else {
            &self.description
        }
    }

    #[must_use]
    pub const fn sunrise(&self) -> Option<DateTime<Utc>> {
        self.sunrise
    }

    #[must_use]
    pub const fn sunset(&self) -> Option<DateTime<Utc>> {
        self.sunset
    }

    /// Growing degree days over the default 10 °C base
    #[must_use]
    pub const fn growing_degree_days(&self) -> f64 {
        self.growing_degree_days
    }

    #[must_use]
    pub const fn heat_stress_hours(&self) -> f64 {
        self.heat_stress_hours
    }

    #[must_use]
    pub const fn chill_hours(&self) -> f64 {
        self.chill_hours
    }
}

/// Wire shape accepted on deserialization; derived values are recomputed
#[derive(Deserialize)]
struct DailyAggregateFields {
    date: NaiveDate,
    temp_min: f64,
    temp_max: f64,
    #[serde(default)]
    humidity_avg: f64,
    #[serde(default)]
    precipitation_total: f64,
    #[serde(default)]
    precipitation_probability: f64,
    #[serde(default)]
    wind_speed_max: f64,
    #[serde(default)]
    condition: WeatherCondition,
    #[serde(default)]
    description: String,
    #[serde(default)]
    sunrise: Option<DateTime<Utc>>,
    #[serde(default)]
    sunset: Option<DateTime<Utc>>,
}

impl TryFrom<DailyAggregateFields> for DailyAggregate {
    type Error = DomainError;

    fn try_from(f: DailyAggregateFields) -> Result<Self, Self::Error> {
        Ok(Self::new(f.date, f.temp_min, f.temp_max)?
            .with_humidity(f.humidity_avg)
            .with_precipitation(f.precipitation_total, f.precipitation_probability)
            .with_max_wind(f.wind_speed_max)
            .with_condition(f.condition, f.description)
            .with_sun(f.sunrise, f.sunset))
    }
}
