//! Temperature-driven indices

/// Below this air temperature no heat stress is accrued
pub const HEAT_STRESS_THRESHOLD: f64 = 26.0;

/// Hours above this temperature count as heat-stress hours
pub const HEAT_STRESS_HOURS_ABOVE: f64 = 30.0;

/// Upper bound of the chilling band; the lower bound is freezing
pub const CHILL_UPPER: f64 = 7.2;

const HOURS_PER_DAY: f64 = 24.0;

/// Growing degree days: `max(0, (min + max) / 2 - base)`
#[must_use]
pub fn growing_degree_days(temp_min: f64, temp_max: f64, base: f64) -> f64 {
    ((temp_min + temp_max) / 2.0 - base).max(0.0)
}

/// Heat index in Celsius from the Rothfusz regression
#[must_use]
pub fn heat_index(temp: f64, humidity: f64) -> f64 {
    let t = temp;
    let r = humidity;
    -8.784_694_755_56 + 1.611_394_11 * t + 2.338_548_838_89 * r
        - 0.146_116_05 * t * r
        - 0.012_308_094 * t * t
        - 0.016_424_827_777_8 * r * r
        + 0.002_211_732 * t * t * r
        + 0.000_725_46 * t * r * r
        - 0.000_003_582 * t * t * r * r
}

/// Heat stress above the 26 °C threshold, never negative
#[must_use]
pub fn heat_stress_index(temp: f64, humidity: f64) -> f64 {
    if temp < HEAT_STRESS_THRESHOLD {
        return 0.0;
    }
    (heat_index(temp, humidity) - HEAT_STRESS_THRESHOLD).max(0.0)
}

/// Hours of a 24-hour day spent in `[low, high]`
///
/// Assumes temperature sweeps linearly across `[min, max]`. A flat day is
/// either entirely inside the band or entirely outside it.
fn hours_in_band(temp_min: f64, temp_max: f64, low: f64, high: f64) -> f64 {
    let span = temp_max - temp_min;
    if span <= f64::EPSILON {
        return if (low..=high).contains(&temp_min) {
            HOURS_PER_DAY
        } else {
            0.0
        };
    }
    let overlap = (high.min(temp_max) - low.max(temp_min)).max(0.0);
    HOURS_PER_DAY * overlap / span
}

/// Estimated hours in the 0 to 7.2 °C chilling band
#[must_use]
pub fn chill_hours(temp_min: f64, temp_max: f64) -> f64 {
    hours_in_band(temp_min, temp_max, 0.0, CHILL_UPPER)
}

/// Estimated hours above 30 °C
#[must_use]
pub fn heat_stress_hours(temp_min: f64, temp_max: f64) -> f64 {
    hours_in_band(temp_min, temp_max, HEAT_STRESS_HOURS_ABOVE, f64::INFINITY)
}

#[must_use]
pub fn soil_temperature_estimate(mean_air_temp: f64) -> f64 {
    mean_air_temp * 0.9
}
