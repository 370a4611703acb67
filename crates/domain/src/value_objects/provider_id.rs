//! Weather provider identifiers

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::DomainError;

/// Identifies an upstream weather source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// OpenWeatherMap One Call 3.0
    #[serde(rename = "openweathermap")]
    OpenWeatherMap,
    /// WeatherAPI.com
    #[serde(rename = "weatherapi")]
    WeatherApi,
    /// Tomorrow.io v4
    TomorrowIo,
    /// Visual Crossing Timeline
    VisualCrossing,
    /// Deterministic synthetic data for development and tests
    Simulation,
}

impl ProviderId {
    /// Default priority order of the credentialed providers
    pub const DEFAULT_PRIORITY: [Self; 4] = [
        Self::OpenWeatherMap,
        Self::WeatherApi,
        Self::TomorrowIo,
        Self::VisualCrossing,
    ];

    /// Config and cache identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenWeatherMap => "openweathermap",
            Self::WeatherApi => "weatherapi",
            Self::TomorrowIo => "tomorrow_io",
            Self::VisualCrossing => "visual_crossing",
            Self::Simulation => "simulation",
        }
    }

    /// Human-readable service name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::OpenWeatherMap => "OpenWeatherMap",
            Self::WeatherApi => "WeatherAPI.com",
            Self::TomorrowIo => "Tomorrow.io",
            Self::VisualCrossing => "Visual Crossing",
            Self::Simulation => "Simulation",
        }
    }

    /// Static reliability weight reported alongside a served answer
    #[must_use]
    pub const fn reliability(self) -> f64 {
        match self {
            Self::OpenWeatherMap => 0.90,
            Self::WeatherApi => 0.88,
            Self::TomorrowIo => 0.87,
            Self::VisualCrossing => 0.85,
            Self::Simulation => 0.10,
        }
    }

    #[must_use]
    pub const fn is_simulation(self) -> bool {
        matches!(self, Self::Simulation)
    }
}

impl FromStr for ProviderId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "openweathermap" | "owm" => Ok(Self::OpenWeatherMap),
            "weatherapi" => Ok(Self::WeatherApi),
            "tomorrow_io" | "tomorrowio" | "tomorrow" => Ok(Self::TomorrowIo),
            "visual_crossing" | "visualcrossing" => Ok(Self::VisualCrossing),
            "simulation" => Ok(Self::Simulation),
            other => Err(DomainError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reliability_of_real_providers_is_in_documented_band() {
        for id in ProviderId::DEFAULT_PRIORITY {
            let r = id.reliability();
            assert!((0.85..=0.90).contains(&r), "{id}: {r}");
        }
    }

    #[test]
    fn default_priority_is_descending_reliability() {
        let weights: Vec<f64> = ProviderId::DEFAULT_PRIORITY
            .iter()
            .map(|p| p.reliability())
            .collect();
        assert!(weights.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!("tomorrow-io".parse(), Ok(ProviderId::TomorrowIo));
        assert_eq!("VisualCrossing".parse(), Ok(ProviderId::VisualCrossing));
        assert_eq!("owm".parse(), Ok(ProviderId::OpenWeatherMap));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(
            "darksky".parse::<ProviderId>(),
            Err(DomainError::UnknownProvider("darksky".to_string()))
        );
    }

    #[test]
    fn serde_uses_config_identifiers() {
        let json = serde_json::to_string(&ProviderId::TomorrowIo).unwrap();
        assert_eq!(json, "\"tomorrow_io\"");
        let back: ProviderId = serde_json::from_str("\"visual_crossing\"").unwrap();
        assert_eq!(back, ProviderId::VisualCrossing);
        for id in ProviderId::DEFAULT_PRIORITY {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
    }
}
