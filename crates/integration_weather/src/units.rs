//! Unit and time conversions shared by the adapters

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::WeatherError;

#[must_use]
pub fn kph_to_ms(kph: f64) -> f64 {
    kph / 3.6
}

#[must_use]
pub fn metres_to_km(metres: f64) -> f64 {
    metres / 1000.0
}

/// Probability given as a `[0, 1]` fraction, expressed in percent
#[must_use]
pub fn fraction_to_percent(fraction: f64) -> f64 {
    fraction * 100.0
}

/// Unix seconds to UTC
pub fn epoch_to_utc(secs: i64) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| WeatherError::ParseError(format!("timestamp out of range: {secs}")))
}

/// RFC 3339 timestamp to UTC
pub fn rfc3339_to_utc(value: &str) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| WeatherError::ParseError(format!("invalid timestamp {value:?}: {e}")))
}

/// `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, WeatherError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| WeatherError::ParseError(format!("invalid date {value:?}: {e}")))
}

/// IANA timezone by name, UTC when unknown
#[must_use]
pub fn resolve_timezone(name: &str) -> Tz {
    name.parse().unwrap_or(Tz::UTC)
}

/// Calendar date of a UTC instant in the given zone
#[must_use]
pub fn local_date(at: DateTime<Utc>, tz: Tz) -> NaiveDate {
    at.with_timezone(&tz).date_naive()
}

/// A wall-clock time such as `05:42 AM` on `date` in `tz`, as UTC
///
/// Returns `None` for unparseable text (WeatherAPI reports `No sunrise`
/// during polar day) or a local time that does not exist.
#[must_use]
pub fn local_clock_to_utc(date: NaiveDate, clock: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let time = NaiveTime::parse_from_str(clock.trim(), "%I:%M %p").ok()?;
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_conversion() {
        assert!((kph_to_ms(36.0) - 10.0).abs() < 1e-12);
        assert!(kph_to_ms(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn visibility_conversion() {
        assert!((metres_to_km(10_000.0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn probability_conversion() {
        assert!((fraction_to_percent(0.35) - 35.0).abs() < 1e-9);
    }

    #[test]
    fn epoch_round_trips() {
        let at = epoch_to_utc(1_717_243_200).unwrap();
        assert_eq!(at.to_rfc3339(), "2024-06-01T12:00:00+00:00");
    }

    #[test]
    fn rfc3339_with_offset_is_normalized() {
        let at = rfc3339_to_utc("2024-06-01T14:00:00+02:00").unwrap();
        assert_eq!(at, epoch_to_utc(1_717_243_200).unwrap());
        assert!(rfc3339_to_utc("yesterday").unwrap_err().is_parse_error());
    }

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        assert_eq!(resolve_timezone("Mars/Olympus"), Tz::UTC);
        assert_eq!(resolve_timezone("Europe/Berlin"), Tz::Europe__Berlin);
    }

    #[test]
    fn local_date_uses_the_zone() {
        let late_utc = rfc3339_to_utc("2024-06-01T23:30:00Z").unwrap();
        assert_eq!(
            local_date(late_utc, Tz::Europe__Berlin),
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
        );
    }

    #[test]
    fn sunrise_text_is_localized() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let sunrise = local_clock_to_utc(date, "04:45 AM", Tz::Europe__Berlin).unwrap();
        assert_eq!(sunrise.to_rfc3339(), "2024-06-01T02:45:00+00:00");

        let sunset = local_clock_to_utc(date, "09:24 PM", Tz::UTC).unwrap();
        assert_eq!(sunset.to_rfc3339(), "2024-06-01T21:24:00+00:00");

        assert!(local_clock_to_utc(date, "No sunrise", Tz::UTC).is_none());
    }
}
