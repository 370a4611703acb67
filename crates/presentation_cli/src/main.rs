//! AgriWeather CLI
//!
//! One-shot access to the aggregation engine: current conditions, forecasts,
//! history, agronomic indices and short-horizon predictions.

#![allow(clippy::print_stdout)]

mod render;

use std::{path::PathBuf, process::ExitCode, time::Duration};

use application::{Deadline, WeatherOutcome};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use domain::{CropType, GeoLocation, HistoricalRange};
use infrastructure::{AppConfig, build_weather_service, init_logging};
use serde::Serialize;

/// Exit status when the engine produced no value
const UNAVAILABLE_EXIT: u8 = 2;

/// AgriWeather CLI
#[derive(Parser, Debug)]
#[command(name = "agriweather-cli")]
#[command(author, version, about = "Agricultural weather aggregation CLI", long_about = None)]
struct Cli {
    /// Verbosity level (overrides `logging.filter`)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (default: ./config.toml when present)
    #[arg(short, long, env = "AGRIWEATHER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Overall deadline in seconds (default: `request.default_deadline_secs`)
    #[arg(long, global = true)]
    deadline_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Coordinates in decimal degrees
#[derive(Args, Debug, Clone, Copy)]
struct LocationArgs {
    /// Latitude in [-90, 90]
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude in [-180, 180]
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
}

impl LocationArgs {
    fn location(self) -> anyhow::Result<GeoLocation> {
        Ok(GeoLocation::new(self.lat, self.lon)?)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Current conditions with the short-range outlook
    Current {
        #[command(flatten)]
        at: LocationArgs,
    },

    /// Multi-day forecast
    Forecast {
        #[command(flatten)]
        at: LocationArgs,

        /// Number of days, clamped to 1..=14
        #[arg(short, long, default_value_t = 7)]
        days: u8,
    },

    /// Hourly observations over a past window
    ///
    /// Example: agriweather-cli history --lat 52.52 --lon 13.40 --hours 48
    /// Example: agriweather-cli history --lat 52.52 --lon 13.40 --start 2024-06-01T00:00:00Z --end 2024-06-02T00:00:00Z
    History {
        #[command(flatten)]
        at: LocationArgs,

        /// Hours back from now
        #[arg(long, default_value_t = 24, conflicts_with_all = ["start", "end"])]
        hours: u32,

        /// Window start (RFC 3339)
        #[arg(long, requires = "end")]
        start: Option<DateTime<Utc>>,

        /// Window end (RFC 3339)
        #[arg(long, requires = "start")]
        end: Option<DateTime<Utc>>,
    },

    /// Agronomic indices for the next seven days
    Agri {
        #[command(flatten)]
        at: LocationArgs,

        /// Crop profile (corn, wheat, rice, soybean, cotton, potato, tomato, coffee)
        #[arg(long)]
        crop: Option<CropType>,
    },

    /// Short-horizon prediction from recent history
    Predict {
        #[command(flatten)]
        at: LocationArgs,

        /// Hours ahead, clamped to 1..=48
        #[arg(long, default_value_t = 24)]
        horizon: usize,
    },

    /// List configured providers in fallback order
    Providers,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

fn history_range(
    hours: u32,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> anyhow::Result<HistoricalRange> {
    Ok(match (start, end) {
        (Some(start), Some(end)) => HistoricalRange::new(start, end)?,
        _ => HistoricalRange::last_hours(Utc::now(), hours)?,
    })
}

/// Print an outcome and report whether it carried a value
fn emit<T: Serialize>(
    outcome: &WeatherOutcome<T>,
    json: bool,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(outcome.is_available());
    }
    match outcome {
        WeatherOutcome::Available(value) => {
            print!("{}", text(value));
            Ok(true)
        },
        WeatherOutcome::Unavailable(reason) => {
            print!("{}", render::unavailable(reason));
            Ok(false)
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    let mut logging = config.logging.clone();
    if let Some(filter) = log_filter_from_verbosity(cli.verbose) {
        logging.filter = filter.to_string();
    }
    init_logging(&logging)?;

    let service = build_weather_service(&config)?;
    let budget = cli
        .deadline_secs
        .map_or_else(|| config.request.default_deadline(), Duration::from_secs);
    let deadline = Deadline::after(budget);

    let available = match cli.command {
        Commands::Current { at } => {
            let outcome = service.current_weather(at.location()?, deadline).await;
            emit(&outcome, cli.json, render::current)?
        },

        Commands::Forecast { at, days } => {
            let outcome = service
                .extended_forecast(at.location()?, days, deadline)
                .await;
            emit(&outcome, cli.json, render::forecast)?
        },

        Commands::History {
            at,
            hours,
            start,
            end,
        } => {
            let range = history_range(hours, start, end)?;
            let outcome = service
                .historical_weather(at.location()?, range, deadline)
                .await;
            emit(&outcome, cli.json, |hourly| render::history(hourly))?
        },

        Commands::Agri { at, crop } => {
            let outcome = service
                .agriculture_forecast(at.location()?, crop, deadline)
                .await;
            emit(&outcome, cli.json, |days| render::agriculture(days))?
        },

        Commands::Predict { at, horizon } => {
            let outcome = service
                .generate_prediction(at.location()?, horizon, deadline)
                .await;
            emit(&outcome, cli.json, render::prediction)?
        },

        Commands::Providers => {
            let statuses = service.provider_status();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                print!("{}", render::providers(&statuses));
            }
            true
        },
    };

    Ok(if available {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(UNAVAILABLE_EXIT)
    })
}
