//! Field-operation suitability ratings
//!
//! Each rating sums weighted points out of 100 and buckets the total with
//! [`Suitability::from_score`].

use crate::Suitability;

/// Points for sowing conditions
#[must_use]
pub fn planting_score(temp_min: f64, temp_max: f64, precipitation: f64, humidity: f64) -> f64 {
    let mean = (temp_min + temp_max) / 2.0;
    let mut score = 0.0;

    if (15.0..=25.0).contains(&mean) {
        score += 30.0;
    } else if (10.0..=30.0).contains(&mean) {
        score += 15.0;
    }

    if (2.0..=10.0).contains(&precipitation) {
        score += 30.0;
    } else if precipitation < 2.0 {
        score += 15.0;
    } else if precipitation <= 20.0 {
        score += 10.0;
    }

    if (40.0..=80.0).contains(&humidity) {
        score += 20.0;
    }
    if temp_min > 5.0 {
        score += 20.0;
    }
    score
}

#[must_use]
pub fn planting_suitability(
    temp_min: f64,
    temp_max: f64,
    precipitation: f64,
    humidity: f64,
) -> Suitability {
    Suitability::from_score(planting_score(temp_min, temp_max, precipitation, humidity))
}

/// Points for pesticide or fertiliser application; wind carries the most weight
#[must_use]
pub fn spraying_score(
    temp_mean: f64,
    wind_speed: f64,
    precipitation_probability: f64,
    humidity: f64,
) -> f64 {
    let mut score = 0.0;

    if wind_speed < 3.0 {
        score += 35.0;
    } else if wind_speed < 5.0 {
        score += 20.0;
    }

    if precipitation_probability < 20.0 {
        score += 30.0;
    } else if precipitation_probability < 40.0 {
        score += 15.0;
    }

    if (10.0..=25.0).contains(&temp_mean) {
        score += 20.0;
    } else if (5.0..=30.0).contains(&temp_mean) {
        score += 10.0;
    }

    if (40.0..=80.0).contains(&humidity) {
        score += 15.0;
    }
    score
}

#[must_use]
pub fn spraying_suitability(
    temp_mean: f64,
    wind_speed: f64,
    precipitation_probability: f64,
    humidity: f64,
) -> Suitability {
    Suitability::from_score(spraying_score(
        temp_mean,
        wind_speed,
        precipitation_probability,
        humidity,
    ))
}

/// Points for harvesting; visibility in km
#[must_use]
pub fn harvest_score(
    precipitation: f64,
    precipitation_probability: f64,
    humidity: f64,
    wind_speed: f64,
    visibility: f64,
) -> f64 {
    let mut score = 0.0;

    if precipitation < 1.0 {
        score += 30.0;
    } else if precipitation < 3.0 {
        score += 15.0;
    }

    if precipitation_probability < 20.0 {
        score += 25.0;
    } else if precipitation_probability < 40.0 {
        score += 10.0;
    }

    if humidity < 60.0 {
        score += 20.0;
    } else if humidity < 75.0 {
        score += 10.0;
    }

    if wind_speed < 8.0 {
        score += 15.0;
    }
    if visibility >= 5.0 {
        score += 10.0;
    }
    score
}

#[must_use]
pub fn harvest_suitability(
    precipitation: f64,
    precipitation_probability: f64,
    humidity: f64,
    wind_speed: f64,
    visibility: f64,
) -> Suitability {
    Suitability::from_score(harvest_score(
        precipitation,
        precipitation_probability,
        humidity,
        wind_speed,
        visibility,
    ))
}
