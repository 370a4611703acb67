//! Severe weather alerts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    #[default]
    Unknown,
    Minor,
    Moderate,
    Severe,
    Extreme,
}

impl AlertSeverity {
    /// Parse a CAP-style severity label (case-insensitive)
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "minor" => Self::Minor,
            "moderate" => Self::Moderate,
            "severe" => Self::Severe,
            "extreme" => Self::Extreme,
            _ => Self::Unknown,
        }
    }
}

/// A weather warning issued by an upstream agency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherAlert {
    /// Headline or event name
    pub title: String,
    pub description: String,
    pub severity: AlertSeverity,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    /// Issuing agency as reported by the provider
    pub source: String,
}

impl WeatherAlert {
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: AlertSeverity::Unknown,
            starts_at: None,
            ends_at: None,
            source: String::new(),
        }
    }

    #[must_use]
    pub const fn with_severity(mut self, severity: AlertSeverity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub const fn with_window(
        mut self,
        starts_at: Option<DateTime<Utc>>,
        ends_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.starts_at = starts_at;
        self.ends_at = ends_at;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Whether the alert is in effect at `at`; open-ended bounds count as active
    #[must_use]
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.starts_at.is_none_or(|s| s <= at) && self.ends_at.is_none_or(|e| at < e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn severity_ordering() {
        assert!(AlertSeverity::Extreme > AlertSeverity::Severe);
        assert!(AlertSeverity::Minor > AlertSeverity::Unknown);
    }

    #[test]
    fn severity_from_label() {
        assert_eq!(AlertSeverity::from_label("Severe"), AlertSeverity::Severe);
        assert_eq!(AlertSeverity::from_label("??"), AlertSeverity::Unknown);
    }

    #[test]
    fn active_window() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let alert = WeatherAlert::new("Frost", "Ground frost expected")
            .with_window(Some(start), Some(start + Duration::hours(6)));
        assert!(alert.is_active_at(start));
        assert!(alert.is_active_at(start + Duration::hours(5)));
        assert!(!alert.is_active_at(start + Duration::hours(6)));
        assert!(!alert.is_active_at(start - Duration::hours(1)));

        let open = WeatherAlert::new("Heat", "");
        assert!(open.is_active_at(start));
    }
}
