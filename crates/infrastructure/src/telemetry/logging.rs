//! Subscriber setup

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for log output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "agriweather=debug,integration_weather=debug")
    ///
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit one JSON object per event instead of text
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Filter to install: `RUST_LOG` if present, otherwise the configured one
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::Filter` when the configured directive does not parse.
    pub fn env_filter(&self) -> Result<EnvFilter, TelemetryError> {
        EnvFilter::try_from_default_env().or_else(|_| {
            EnvFilter::try_new(&self.filter).map_err(|e| TelemetryError::Filter(e.to_string()))
        })
    }
}

/// Install the global subscriber
///
/// Can succeed once per process; a second call returns `TelemetryError::Init`.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))?;

    info!(filter = %config.filter, json = config.json, "Logging initialized");
    Ok(())
}

/// Error type for logging initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),

    /// Filter directive did not parse
    #[error("Invalid log filter: {0}")]
    Filter(String),
}
