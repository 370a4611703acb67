//! Disease and pest pressure scores

/// Fungal disease pressure in `[0, 100]` from mean temperature, humidity and rain
#[must_use]
pub fn disease_pressure_index(temp: f64, humidity: f64, precipitation: f64) -> f64 {
    let mut score: f64 = 0.0;
    if humidity > 70.0 {
        score += 30.0;
    }
    if humidity > 85.0 {
        score += 20.0;
    }
    if (15.0..=25.0).contains(&temp) {
        score += 25.0;
    }
    if precipitation > 5.0 {
        score += 15.0;
    }
    if temp >= 20.0 && humidity > 75.0 {
        score += 10.0;
    }
    score.clamp(0.0, 100.0)
}

/// Insect activity in `[0, 100]` from the day's temperature range and humidity
#[must_use]
pub fn pest_activity_index(temp_max: f64, temp_min: f64, humidity: f64) -> f64 {
    let mean = (temp_max + temp_min) / 2.0;
    let mut score: f64 = 0.0;
    if (20.0..=30.0).contains(&mean) {
        score += 40.0;
    } else if mean > 30.0 {
        score += 20.0;
    }
    if humidity > 60.0 {
        score += 30.0;
    }
    if temp_min > 15.0 {
        score += 20.0;
    }
    if mean >= 25.0 && humidity > 70.0 {
        score += 10.0;
    }
    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disease_pressure_reference_day() {
        // day of 15-30 °C averages 22.5
        let mean = (15.0 + 30.0) / 2.0;
        assert!((disease_pressure_index(mean, 80.0, 8.0) - 80.0).abs() < 1e-12);
    }

    #[test]
    fn disease_pressure_maximum_is_capped() {
        assert!((disease_pressure_index(22.0, 95.0, 20.0) - 100.0).abs() < 1e-12);
    }

    #[test]
    fn disease_pressure_dry_cold_is_zero() {
        assert!(disease_pressure_index(5.0, 30.0, 0.0).abs() < 1e-12);
    }

    #[test]
    fn pest_activity_warm_humid() {
        assert!((pest_activity_index(30.0, 20.0, 75.0) - 100.0).abs() < 1e-12);
    }

    #[test]
    fn pest_activity_hot_branch() {
        // mean 32 takes the hot branch only
        assert!((pest_activity_index(36.0, 28.0, 50.0) - 40.0).abs() < 1e-12);
    }

    #[test]
    fn pest_activity_cold_dry_is_zero() {
        assert!(pest_activity_index(10.0, 2.0, 40.0).abs() < 1e-12);
    }
}
