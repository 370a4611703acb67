//! Per-day index derivation over a forecast bundle

use crate::{AgronomicIndices, CropType, DailyAggregate, ForecastBundle};

use super::{biotic, suitability, thermal, water};

/// Visibility assumed when no hourly reading for the day carries one
const DEFAULT_VISIBILITY_KM: f64 = 10.0;

/// Compute agronomic indices for every day of `bundle`
///
/// GDD uses the crop's base temperature (`Other` when no crop is given) and
/// accumulates from the first day in the bundle.
#[must_use]
pub fn derive_indices(bundle: &ForecastBundle, crop: Option<CropType>) -> Vec<AgronomicIndices> {
    let crop = crop.unwrap_or_default();
    let base = crop.base_temperature();
    let mut cumulative = 0.0;

    bundle
        .daily()
        .iter()
        .map(|day| {
            let gdd = thermal::growing_degree_days(day.temp_min(), day.temp_max(), base);
            cumulative += gdd;
            day_indices(day, crop, gdd, cumulative, day_visibility(bundle, day))
        })
        .collect()
}

fn day_indices(
    day: &DailyAggregate,
    crop: CropType,
    gdd: f64,
    cumulative_gdd: f64,
    visibility: f64,
) -> AgronomicIndices {
    let (min, max, mean) = (day.temp_min(), day.temp_max(), day.temp_mean());
    let humidity = day.humidity_avg();
    let precip = day.precipitation_total();
    let wind = day.wind_speed_max();

    let et = water::evapotranspiration(max, min, humidity, wind);

    AgronomicIndices {
        date: day.date(),
        crop,
        growing_degree_days: gdd,
        cumulative_gdd,
        heat_stress_index: thermal::heat_stress_index(max, humidity),
        heat_stress_hours: day.heat_stress_hours(),
        chill_hours: day.chill_hours(),
        evapotranspiration: et,
        soil_temperature: thermal::soil_temperature_estimate(mean),
        soil_moisture_index: water::soil_moisture_index(precip, et),
        disease_pressure: biotic::disease_pressure_index(mean, humidity, precip),
        pest_activity: biotic::pest_activity_index(max, min, humidity),
        irrigation: water::irrigation_recommendation(precip, et),
        planting: suitability::planting_suitability(min, max, precip, humidity),
        spraying: suitability::spraying_suitability(
            mean,
            wind,
            day.precipitation_probability(),
            humidity,
        ),
        harvest: suitability::harvest_suitability(
            precip,
            day.precipitation_probability(),
            humidity,
            wind,
            visibility,
        ),
    }
}

/// Mean visibility of the day's hourly observations that report one
fn day_visibility(bundle: &ForecastBundle, day: &DailyAggregate) -> f64 {
    let readings: Vec<f64> = bundle
        .hourly()
        .iter()
        .filter(|o| o.timestamp().date_naive() == day.date())
        .filter_map(crate::Observation::visibility)
        .collect();
    if readings.is_empty() {
        DEFAULT_VISIBILITY_KM
    } else {
        readings.iter().sum::<f64>() / readings.len() as f64
    }
}
