//! Feature extraction from hourly history

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Observation;

/// Fewest contiguous hours a prediction can be built from
pub const MIN_HISTORY_HOURS: usize = 24;

/// Hourly temperatures fed to the temperature model
pub const TEMPERATURE_WINDOW: usize = 24;

/// Hourly multivariate rows fed to the precipitation model
pub const PRECIPITATION_WINDOW: usize = 36;

/// Largest gap between consecutive hours still treated as contiguous
pub const MAX_GAP_MINUTES: i64 = 90;

/// Column order of a [`FeatureRow`]
pub const PRECIPITATION_FEATURES: [&str; 6] = [
    "temperature",
    "humidity",
    "pressure",
    "wind_speed",
    "precipitation",
    "cloud_cover",
];

/// One hour of `[temperature, humidity, pressure, wind_speed, precipitation, cloud_cover]`
pub type FeatureRow = [f64; 6];

/// Not enough contiguous history to build feature windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("insufficient history: {available_hours} contiguous hours, {required_hours} required")]
pub struct InsufficientHistory {
    pub available_hours: usize,
    pub required_hours: usize,
}

/// Model inputs derived from recent history, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Last 24 hourly temperatures
    pub temperature_window: Vec<f64>,
    /// Up to the last 36 hourly rows, never fewer than 24
    pub precipitation_window: Vec<FeatureRow>,
    pub last_temperature: f64,
    pub last_humidity: f64,
    pub last_pressure: f64,
    /// Pressure change over the last three hours in hPa
    pub pressure_tendency: f64,
    pub wind_mean: f64,
    pub wind_std: f64,
}

impl FeatureSet {
    /// Mean of one column of the precipitation window
    #[must_use]
    pub fn column_mean(&self, column: usize) -> f64 {
        mean(self.precipitation_window.iter().map(|row| row[column]))
    }

    /// Sum of precipitation over the last `hours` rows
    #[must_use]
    pub fn recent_precipitation(&self, hours: usize) -> f64 {
        let start = self.precipitation_window.len().saturating_sub(hours);
        self.precipitation_window[start..]
            .iter()
            .map(|row| row[4])
            .sum()
    }
}

/// Sort, collapse duplicate hours and keep the trailing contiguous run
///
/// When an hour appears more than once, the last reading given wins. The run ends at the newest
/// observation and extends back while consecutive hours are no more than
/// [`MAX_GAP_MINUTES`] apart.
#[must_use]
pub fn contiguous_history(observations: &[Observation]) -> Vec<Observation> {
    let mut sorted: Vec<&Observation> = observations.iter().collect();
    sorted.sort_by_key(|o| o.timestamp());

    let mut hourly: Vec<&Observation> = Vec::with_capacity(sorted.len());
    for obs in sorted {
        let hour = obs.timestamp().timestamp().div_euclid(3600);
        match hourly.last_mut() {
            Some(prev) if prev.timestamp().timestamp().div_euclid(3600) == hour => *prev = obs,
            _ => hourly.push(obs),
        }
    }

    let max_gap = Duration::minutes(MAX_GAP_MINUTES);
    let mut start = hourly.len();
    while start > 0 {
        if start < hourly.len() && hourly[start].timestamp() - hourly[start - 1].timestamp() > max_gap
        {
            break;
        }
        start -= 1;
    }
    hourly[start..].iter().map(|o| (*o).clone()).collect()
}

/// Build feature windows from raw hourly history
///
/// # Errors
///
/// Returns [`InsufficientHistory`] when the trailing contiguous run is
/// shorter than [`MIN_HISTORY_HOURS`]
pub fn build_features(observations: &[Observation]) -> Result<FeatureSet, InsufficientHistory> {
    let history = contiguous_history(observations);
    let available = history.len();
    let Some(last) = history.last().filter(|_| available >= MIN_HISTORY_HOURS) else {
        return Err(InsufficientHistory {
            available_hours: available,
            required_hours: MIN_HISTORY_HOURS,
        });
    };

    let temperature_window = history[available - TEMPERATURE_WINDOW..]
        .iter()
        .map(Observation::temperature)
        .collect();

    let rows = available.min(PRECIPITATION_WINDOW);
    let precipitation_window: Vec<FeatureRow> = history[available - rows..]
        .iter()
        .map(|o| {
            [
                o.temperature(),
                o.humidity(),
                o.pressure(),
                o.wind_speed(),
                o.precipitation(),
                o.cloud_cover(),
            ]
        })
        .collect();

    let three_hours_ago = &history[available - 4];
    let winds: Vec<f64> = precipitation_window.iter().map(|row| row[3]).collect();
    let wind_mean = mean(winds.iter().copied());
    let wind_std = mean(winds.iter().map(|w| (w - wind_mean).powi(2))).sqrt();

    Ok(FeatureSet {
        temperature_window,
        precipitation_window,
        last_temperature: last.temperature(),
        last_humidity: last.humidity(),
        last_pressure: last.pressure(),
        pressure_tendency: last.pressure() - three_hours_ago.pressure(),
        wind_mean,
        wind_std,
    })
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
