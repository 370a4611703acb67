//! Secondary metrics and confidence for a prediction horizon

use super::FeatureSet;

pub const CONFIDENCE_START: f64 = 0.9;
pub const CONFIDENCE_STEP: f64 = 0.02;
pub const CONFIDENCE_FLOOR: f64 = 0.4;

/// Humidity, wind and pressure filled in from the primary model outputs
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryMetrics {
    pub humidity: Vec<f64>,
    pub wind_speed: Vec<f64>,
    pub pressure: Vec<f64>,
}

/// Per-step confidence: `max(0.9 - 0.02 * i, 0.4)` for `i` in `0..horizon`
#[must_use]
pub fn confidence_schedule(horizon: usize) -> Vec<f64> {
    (0..horizon)
        .map(|i| (CONFIDENCE_STEP.mul_add(-(i as f64), CONFIDENCE_START)).max(CONFIDENCE_FLOOR))
        .collect()
}

/// Derive humidity, wind and pressure from predicted temperatures and the
/// precipitation likelihood `p` in `[0, 1]`
///
/// Lower-fidelity placeholders for the secondary metrics. Warmer hours dry
/// the air and a likely shower lowers pressure across the horizon. The recent
/// pressure tendency is carried at half strength.
#[must_use]
pub fn synthesize_secondary(features: &FeatureSet, temperatures: &[f64], p: f64) -> SecondaryMetrics {
    let horizon = temperatures.len();
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    let tendency_per_hour = features.pressure_tendency / 3.0;

    let humidity = temperatures
        .iter()
        .map(|t| {
            let delta = t - features.last_temperature;
            (features.last_humidity - 2.0 * delta + 20.0 * (p - 0.5)).clamp(0.0, 100.0)
        })
        .collect();

    let wind = features.wind_std.mul_add(p - 0.5, features.wind_mean).max(0.0);
    let wind_speed = vec![wind; horizon];

    let pressure = (1..=horizon)
        .map(|step| {
            let step = step as f64;
            let drop = 1.5 * p * (step / horizon as f64);
            features.last_pressure + 0.5 * tendency_per_hour * step - drop
        })
        .collect();

    SecondaryMetrics {
        humidity,
        wind_speed,
        pressure,
    }
}
