//! Weather queries and their parameters

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{DomainError, GeoLocation};

/// The three fetch operations a provider can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherOperation {
    Current,
    Extended,
    Historical,
}

impl WeatherOperation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Extended => "extended",
            Self::Historical => "historical",
        }
    }
}

impl fmt::Display for WeatherOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open time range `[start, end)` for historical lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoricalRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl HistoricalRange {
    /// Longest range a single request may cover
    pub const MAX_DAYS: i64 = 30;

    /// Create a validated range
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimeRange` if `start >= end` or the range
    /// spans more than [`Self::MAX_DAYS`]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidTimeRange(format!(
                "start {start} is not before end {end}"
            )));
        }
        if end - start > Duration::days(Self::MAX_DAYS) {
            return Err(DomainError::InvalidTimeRange(format!(
                "range exceeds {} days",
                Self::MAX_DAYS
            )));
        }
        Ok(Self { start, end })
    }

    /// The `hours` hours leading up to `now`
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`]
    pub fn last_hours(now: DateTime<Utc>, hours: u32) -> Result<Self, DomainError> {
        Self::new(now - Duration::hours(i64::from(hours)), now)
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Calendar days touched by the range, inclusive of both ends
    #[must_use]
    pub fn days(&self) -> Vec<chrono::NaiveDate> {
        let first = self.start.date_naive();
        let last = self.end.date_naive();
        first
            .iter_days()
            .take_while(|d| *d <= last)
            .collect()
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// A single request to an upstream weather source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum WeatherQuery {
    /// Current conditions plus the short-range hourly and daily outlook
    Current { location: GeoLocation },
    /// Multi-day forecast
    Extended { location: GeoLocation, days: u8 },
    /// Past hourly observations
    Historical {
        location: GeoLocation,
        range: HistoricalRange,
    },
}

impl WeatherQuery {
    #[must_use]
    pub const fn operation(&self) -> WeatherOperation {
        match self {
            Self::Current { .. } => WeatherOperation::Current,
            Self::Extended { .. } => WeatherOperation::Extended,
            Self::Historical { .. } => WeatherOperation::Historical,
        }
    }

    #[must_use]
    pub const fn location(&self) -> GeoLocation {
        match self {
            Self::Current { location }
            | Self::Extended { location, .. }
            | Self::Historical { location, .. } => *location,
        }
    }

    /// Operation parameters as a stable string; empty for current conditions
    #[must_use]
    pub fn parameters(&self) -> String {
        match self {
            Self::Current { .. } => String::new(),
            Self::Extended { days, .. } => format!("days={days}"),
            Self::Historical { range, .. } => format!(
                "{}..{}",
                range.start().format("%Y%m%dT%H"),
                range.end().format("%Y%m%dT%H")
            ),
        }
    }
}
