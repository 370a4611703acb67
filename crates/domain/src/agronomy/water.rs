//! Water balance: evapotranspiration, soil moisture and irrigation

use crate::IrrigationTier;

/// Mid-latitude extraterrestrial radiation in MJ/m²/day
const EXTRATERRESTRIAL_RADIATION: f64 = 25.0;

/// Hargreaves-style reference evapotranspiration in mm/day
///
/// Radiation is estimated from the diurnal range, scaled by the mean
/// temperature, then reduced by humidity and increased by wind.
#[must_use]
pub fn evapotranspiration(temp_max: f64, temp_min: f64, humidity: f64, wind_speed: f64) -> f64 {
    let mean = (temp_max + temp_min) / 2.0;
    let solar = 0.16 * (temp_max - temp_min).max(0.0).sqrt() * EXTRATERRESTRIAL_RADIATION;
    let base = 0.0135 * (mean + 17.8) * solar * 0.408;
    let humidity_factor = (100.0 - humidity) / 100.0;
    let wind_factor = 1.0 + wind_speed * 0.1;
    (base * humidity_factor * wind_factor).max(0.0)
}

/// Soil moisture index in `[0, 100]`; 50 is balanced
#[must_use]
pub fn soil_moisture_index(precipitation: f64, evapotranspiration: f64) -> f64 {
    let index = 50.0 + (precipitation - evapotranspiration) * 2.0;
    if index.is_nan() {
        return 50.0;
    }
    index.clamp(0.0, 100.0)
}

#[must_use]
pub fn irrigation_recommendation(precipitation: f64, evapotranspiration: f64) -> IrrigationTier {
    let deficit = evapotranspiration - precipitation;
    if deficit <= 0.0 {
        IrrigationTier::None
    } else if deficit <= 2.0 {
        IrrigationTier::Light
    } else if deficit <= 5.0 {
        IrrigationTier::Moderate
    } else {
        IrrigationTier::Heavy
    }
}
