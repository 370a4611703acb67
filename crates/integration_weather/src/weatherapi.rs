//! WeatherAPI.com adapter
//!
//! Uses `/forecast.json` for current and extended queries and `/history.json`
//! for past days. Wind arrives in km/h; sunrise and sunset are local
//! wall-clock strings resolved through the location's `tz_id`.

use async_trait::async_trait;
use chrono_tz::Tz;
use domain::{
    AlertSeverity, DailyAggregate, ForecastBundle, LocationInfo, Observation, ProviderId,
    WeatherAlert, WeatherOperation, WeatherQuery,
};
use reqwest::Client;
use std::fmt;
use tracing::{debug, instrument};

use crate::{
    conditions, config::ProviderConfig, error::WeatherError, http, provider::WeatherProvider,
    units,
};

/// Days requested for a current-conditions query
const CURRENT_QUERY_DAYS: u8 = 3;

mod api {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Response {
        pub location: Location,
        pub current: Option<Reading>,
        pub forecast: Option<Forecast>,
        pub alerts: Option<Alerts>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Location {
        pub name: String,
        pub country: Option<String>,
        pub lat: f64,
        pub lon: f64,
        pub tz_id: Option<String>,
    }

    /// Shape shared by `current` and `forecastday[].hour[]`
    #[derive(Debug, Deserialize)]
    pub struct Reading {
        #[serde(alias = "last_updated_epoch")]
        pub time_epoch: i64,
        pub temp_c: f64,
        pub feelslike_c: Option<f64>,
        pub humidity: Option<f64>,
        pub pressure_mb: Option<f64>,
        pub wind_kph: Option<f64>,
        pub wind_degree: Option<f64>,
        pub precip_mm: Option<f64>,
        pub chance_of_rain: Option<f64>,
        pub cloud: Option<f64>,
        pub uv: Option<f64>,
        pub vis_km: Option<f64>,
        pub condition: Option<Condition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        #[serde(default)]
        pub text: String,
        pub code: i64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Forecast {
        #[serde(default)]
        pub forecastday: Vec<ForecastDay>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastDay {
        pub date: String,
        pub day: Day,
        pub astro: Option<Astro>,
        #[serde(default)]
        pub hour: Vec<Reading>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Day {
        pub mintemp_c: f64,
        pub maxtemp_c: f64,
        pub avghumidity: Option<f64>,
        pub totalprecip_mm: Option<f64>,
        pub daily_chance_of_rain: Option<f64>,
        pub maxwind_kph: Option<f64>,
        pub condition: Option<Condition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Astro {
        pub sunrise: Option<String>,
        pub sunset: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Alerts {
        #[serde(default)]
        pub alert: Vec<Alert>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Alert {
        pub headline: Option<String>,
        pub event: Option<String>,
        pub severity: Option<String>,
        pub effective: Option<String>,
        pub expires: Option<String>,
        pub desc: Option<String>,
    }
}

/// WeatherAPI.com adapter
pub struct WeatherApiProvider {
    client: Client,
    config: ProviderConfig,
}

impl fmt::Debug for WeatherApiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherApiProvider")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl WeatherApiProvider {
    /// Create a new adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ProviderConfig) -> Result<Self, WeatherError> {
        let client = http::build_client(&config)?;
        Ok(Self { client, config })
    }

    fn observation(reading: &api::Reading) -> Result<Observation, WeatherError> {
        let timestamp = units::epoch_to_utc(reading.time_epoch)?;
        let mut observation = Observation::new(ProviderId::WeatherApi, timestamp, reading.temp_c)
            .with_feels_like(reading.feelslike_c.unwrap_or(reading.temp_c))
            .with_humidity(reading.humidity.unwrap_or_default())
            .with_wind(
                units::kph_to_ms(reading.wind_kph.unwrap_or_default()),
                reading.wind_degree.unwrap_or_default(),
            )
            .with_precipitation(
                reading.precip_mm.unwrap_or_default(),
                reading.chance_of_rain.unwrap_or_default(),
            )
            .with_cloud_cover(reading.cloud.unwrap_or_default());
        if let Some(pressure) = reading.pressure_mb {
            observation = observation.with_pressure(pressure);
        }
        if let Some(uv) = reading.uv {
            observation = observation.with_uv_index(uv);
        }
        if let Some(visibility) = reading.vis_km {
            observation = observation.with_visibility(visibility);
        }
        if let Some(condition) = &reading.condition {
            observation = observation.with_condition(
                conditions::from_weatherapi(condition.code),
                condition.text.clone(),
                Some(condition.code),
            );
        }
        Ok(observation)
    }

    fn day(forecast_day: &api::ForecastDay, tz: Tz) -> Result<DailyAggregate, WeatherError> {
        let date = units::parse_date(&forecast_day.date)?;
        let day = &forecast_day.day;
        let (sunrise, sunset) = forecast_day.astro.as_ref().map_or((None, None), |astro| {
            (
                astro
                    .sunrise
                    .as_deref()
                    .and_then(|s| units::local_clock_to_utc(date, s, tz)),
                astro
                    .sunset
                    .as_deref()
                    .and_then(|s| units::local_clock_to_utc(date, s, tz)),
            )
        });
        let mut aggregate = DailyAggregate::new(date, day.mintemp_c, day.maxtemp_c)?
            .with_humidity(day.avghumidity.unwrap_or_default())
            .with_precipitation(
                day.totalprecip_mm.unwrap_or_default(),
                day.daily_chance_of_rain.unwrap_or_default(),
            )
            .with_max_wind(units::kph_to_ms(day.maxwind_kph.unwrap_or_default()))
            .with_sun(sunrise, sunset);
        if let Some(condition) = &day.condition {
            aggregate = aggregate
                .with_condition(conditions::from_weatherapi(condition.code), condition.text.clone());
        }
        Ok(aggregate)
    }

    fn alert(alert: &api::Alert) -> WeatherAlert {
        let title = alert
            .headline
            .clone()
            .or_else(|| alert.event.clone())
            .unwrap_or_default();
        let parse = |value: Option<&str>| value.and_then(|s| units::rfc3339_to_utc(s).ok());
        WeatherAlert::new(title, alert.desc.clone().unwrap_or_default())
            .with_severity(
                alert
                    .severity
                    .as_deref()
                    .map_or(AlertSeverity::Unknown, AlertSeverity::from_label),
            )
            .with_window(
                parse(alert.effective.as_deref()),
                parse(alert.expires.as_deref()),
            )
            .with_source(alert.event.clone().unwrap_or_default())
    }

    /// Convert a forecast or history payload to a bundle
    ///
    /// History payloads carry no `current` block; the latest hour stands in.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::ParseError` when the payload is malformed or has
    /// neither current conditions nor hourly readings.
    pub fn normalize(body: &[u8]) -> Result<ForecastBundle, WeatherError> {
        let response: api::Response = serde_json::from_slice(body)?;
        let tz_name = response
            .location
            .tz_id
            .clone()
            .unwrap_or_else(|| "UTC".to_string());
        let tz = units::resolve_timezone(&tz_name);

        let forecast_days = response
            .forecast
            .as_ref()
            .map_or(&[][..], |f| f.forecastday.as_slice());
        let hourly = forecast_days
            .iter()
            .flat_map(|d| d.hour.iter())
            .map(Self::observation)
            .collect::<Result<Vec<_>, _>>()?;
        let daily = forecast_days
            .iter()
            .map(|d| Self::day(d, tz))
            .collect::<Result<Vec<_>, _>>()?;

        let current = match &response.current {
            Some(reading) => Self::observation(reading)?,
            None => hourly.last().cloned().ok_or_else(|| {
                WeatherError::ParseError("no current conditions or hourly readings".to_string())
            })?,
        };

        let alerts = response
            .alerts
            .as_ref()
            .map(|a| a.alert.iter().map(Self::alert).collect())
            .unwrap_or_default();

        let location = LocationInfo {
            name: response.location.name.clone(),
            country: response.location.country.clone(),
            latitude: response.location.lat,
            longitude: response.location.lon,
            timezone: tz_name,
        };
        let last_updated = current.timestamp();

        Ok(ForecastBundle::new(
            location,
            current,
            hourly,
            daily,
            ProviderId::WeatherApi,
            last_updated,
        )?
        .with_alerts(alerts))
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    fn supports(&self, _operation: WeatherOperation) -> bool {
        true
    }

    #[instrument(
        skip(self),
        fields(
            provider = "weatherapi",
            lat = query.location().latitude(),
            lon = query.location().longitude()
        )
    )]
    async fn fetch(&self, query: &WeatherQuery) -> Result<ForecastBundle, WeatherError> {
        let location = query.location();
        let q = format!("{},{}", location.latitude(), location.longitude());
        let mut params = vec![("key", self.config.api_key.clone()), ("q", q)];

        let endpoint = match query {
            WeatherQuery::Current { .. } => {
                params.push(("days", CURRENT_QUERY_DAYS.to_string()));
                params.push(("alerts", "yes".to_string()));
                "forecast.json"
            },
            WeatherQuery::Extended { days, .. } => {
                params.push(("days", days.to_string()));
                params.push(("alerts", "yes".to_string()));
                "forecast.json"
            },
            WeatherQuery::Historical { range, .. } => {
                params.push(("dt", range.start().format("%Y-%m-%d").to_string()));
                params.push(("end_dt", range.end().format("%Y-%m-%d").to_string()));
                "history.json"
            },
        };
        params.push(("aqi", "no".to_string()));

        let url = format!("{}/{endpoint}", self.config.base_url);
        debug!(url = %url, "Sending WeatherAPI request");

        let request = self.client.get(&url).query(&params);
        let body = http::send(request, self.config.timeout_secs).await?;
        Self::normalize(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::WeatherCondition;

    const HISTORY: &str = r#"{
        "location": {"name": "Ames", "country": "United States of America",
                     "lat": 42.03, "lon": -93.62, "tz_id": "America/Chicago"},
        "forecast": {"forecastday": [{
            "date": "2024-06-01",
            "day": {"maxtemp_c": 27.0, "mintemp_c": 15.0, "avghumidity": 70,
                    "totalprecip_mm": 1.2, "maxwind_kph": 18.0,
                    "condition": {"text": "Patchy rain possible", "code": 1063}},
            "astro": {"sunrise": "05:33 AM", "sunset": "08:45 PM"},
            "hour": [
                {"time_epoch": 1717218000, "temp_c": 16.1, "humidity": 82, "wind_kph": 7.2,
                 "wind_degree": 180, "pressure_mb": 1012, "precip_mm": 0.0, "cloud": 40,
                 "vis_km": 10, "condition": {"text": "Partly cloudy", "code": 1003}},
                {"time_epoch": 1717221600, "temp_c": 15.6, "humidity": 85, "wind_kph": 9.0,
                 "wind_degree": 190, "pressure_mb": 1012, "precip_mm": 0.1, "cloud": 55,
                 "vis_km": 9, "condition": {"text": "Light drizzle", "code": 1153}}
            ]
        }]}
    }"#;

    #[test]
    fn history_uses_latest_hour_as_current() {
        let bundle = WeatherApiProvider::normalize(HISTORY.as_bytes()).unwrap();
        assert_eq!(bundle.hourly().len(), 2);
        assert!((bundle.current().temperature() - 15.6).abs() < f64::EPSILON);
        assert_eq!(bundle.current().condition(), WeatherCondition::Drizzle);
    }

    #[test]
    fn wind_is_converted_to_metres_per_second() {
        let bundle = WeatherApiProvider::normalize(HISTORY.as_bytes()).unwrap();
        assert!((bundle.hourly()[0].wind_speed() - 2.0).abs() < 1e-12);
        assert!((bundle.daily()[0].wind_speed_max() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn astro_times_are_resolved_in_local_zone() {
        let bundle = WeatherApiProvider::normalize(HISTORY.as_bytes()).unwrap();
        let day = &bundle.daily()[0];
        // Chicago is UTC-5 in June
        assert_eq!(
            day.sunrise().unwrap().to_rfc3339(),
            "2024-06-01T10:33:00+00:00"
        );
        assert_eq!(
            day.sunset().unwrap().to_rfc3339(),
            "2024-06-02T01:45:00+00:00"
        );
        assert_eq!(bundle.location().name, "Ames");
        assert_eq!(bundle.location().timezone, "America/Chicago");
    }

    #[test]
    fn alerts_carry_severity() {
        let body = r#"{
            "location": {"name": "X", "lat": 1.0, "lon": 2.0},
            "current": {"last_updated_epoch": 1717243200, "temp_c": 30.0,
                        "condition": {"text": "Sunny", "code": 1000}},
            "alerts": {"alert": [{"headline": "Heat advisory", "severity": "Moderate",
                                  "event": "Heat", "effective": "2024-06-01T10:00:00+00:00",
                                  "expires": "2024-06-02T10:00:00+00:00", "desc": "Hot"}]}
        }"#;
        let bundle = WeatherApiProvider::normalize(body.as_bytes()).unwrap();
        assert!(bundle.hourly().is_empty());
        let alert = &bundle.alerts()[0];
        assert_eq!(alert.title, "Heat advisory");
        assert_eq!(alert.severity, AlertSeverity::Moderate);
        assert!(alert.starts_at.is_some());
    }

    #[test]
    fn empty_payload_is_a_parse_error() {
        let body = r#"{"location": {"name": "X", "lat": 1.0, "lon": 2.0}}"#;
        let err = WeatherApiProvider::normalize(body.as_bytes()).unwrap_err();
        assert!(err.is_parse_error());
    }
}
