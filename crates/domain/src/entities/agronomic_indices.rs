//! Per-day agronomic decision indices

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CropType;

/// How much irrigation a day's water balance calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IrrigationTier {
    None,
    Light,
    Moderate,
    Heavy,
}

impl fmt::Display for IrrigationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
        })
    }
}

/// Ordered suitability rating for a field operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suitability {
    Unsuitable,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Suitability {
    /// Bucket a 0-100 point score
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Fair
        } else if score >= 20.0 {
            Self::Poor
        } else {
            Self::Unsuitable
        }
    }
}

impl fmt::Display for Suitability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unsuitable => "unsuitable",
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        })
    }
}

/// Agronomic indices for one forecast day
///
/// Always derived from a fresh forecast; never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgronomicIndices {
    pub date: NaiveDate,
    pub crop: CropType,
    /// Growing degree days over the crop's base temperature
    pub growing_degree_days: f64,
    /// Running sum of `growing_degree_days` from the first forecast day
    pub cumulative_gdd: f64,
    pub heat_stress_index: f64,
    pub heat_stress_hours: f64,
    pub chill_hours: f64,
    /// Reference evapotranspiration in mm/day
    pub evapotranspiration: f64,
    pub soil_temperature: f64,
    pub soil_moisture_index: f64,
    pub disease_pressure: f64,
    pub pest_activity: f64,
    pub irrigation: IrrigationTier,
    pub planting: Suitability,
    pub spraying: Suitability,
    pub harvest: Suitability,
}
