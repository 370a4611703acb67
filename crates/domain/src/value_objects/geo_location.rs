//! Geographic location value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// A geographic location with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in degrees (-90 to 90)
    latitude: f64,
    /// Longitude in degrees (-180 to 180)
    longitude: f64,
}

impl GeoLocation {
    /// Create a new location with validation
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinates` if latitude is not in [-90, 90]
    /// or longitude is not in [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidCoordinates);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a location without validation (for trusted sources)
    ///
    /// Caller must ensure latitude is in [-90, 90] and longitude in [-180, 180]
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Get the latitude
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Get the longitude
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Coordinates formatted at a fixed number of decimals, e.g. `52.52:13.41`
    ///
    /// Nearby points collapse onto the same string, which is what the cache
    /// keys on.
    #[must_use]
    pub fn rounded_key(&self, decimals: usize) -> String {
        // -0.00 and 0.00 must produce the same key
        let lat = normalize_zero(self.latitude, decimals);
        let lon = normalize_zero(self.longitude, decimals);
        format!("{lat:.decimals$}:{lon:.decimals$}")
    }
}

fn normalize_zero(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        let loc = GeoLocation::new(52.52, 13.405).expect("valid coordinates");
        assert!((loc.latitude() - 52.52).abs() < f64::EPSILON);
        assert!((loc.longitude() - 13.405).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boundary_coordinates() {
        assert!(GeoLocation::new(90.0, 180.0).is_ok());
        assert!(GeoLocation::new(-90.0, -180.0).is_ok());
        assert!(GeoLocation::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        assert_eq!(
            GeoLocation::new(91.0, 0.0),
            Err(DomainError::InvalidCoordinates)
        );
        assert!(GeoLocation::new(0.0, -181.0).is_err());
        assert!(GeoLocation::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn rounded_key_collapses_nearby_points() {
        let a = GeoLocation::new(52.5201, 13.4049).expect("valid");
        let b = GeoLocation::new(52.5249, 13.4012).expect("valid");
        assert_eq!(a.rounded_key(2), "52.52:13.40");
        assert_eq!(a.rounded_key(2), b.rounded_key(2));
    }

    #[test]
    fn rounded_key_rounds_to_nearest_cell() {
        let below = GeoLocation::new(52.52, 13.4049).expect("valid");
        let above = GeoLocation::new(52.52, 13.4051).expect("valid");
        assert_eq!(below.rounded_key(2), "52.52:13.40");
        assert_eq!(above.rounded_key(2), "52.52:13.41");
        assert_eq!(above.rounded_key(3), "52.520:13.405");
    }

    #[test]
    fn rounded_key_normalizes_negative_zero() {
        let loc = GeoLocation::new(-0.001, 0.001).expect("valid");
        assert_eq!(loc.rounded_key(2), "0.00:0.00");
    }

    #[test]
    fn test_display() {
        let loc = GeoLocation::new(52.52, 13.405).expect("valid");
        let display = format!("{loc}");
        assert!(display.contains("52.52"));
        assert!(display.contains("13.405"));
    }

    #[test]
    fn test_serialization() {
        let loc = GeoLocation::new(52.52, 13.405).expect("valid");
        let json = serde_json::to_string(&loc).expect("serialize");
        let deserialized: GeoLocation = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(loc, deserialized);
    }
}
