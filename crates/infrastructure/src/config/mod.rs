//! Application configuration
//!
//! Split into focused sub-modules:
//! - `providers`: upstream credentials, fallback order, attempt budgets
//! - `cache`: backend selection, TTLs, key precision
//! - `prediction`: forecast model version and coefficients
//!
//! Values come from an optional `config.toml` overridden by `AGRIWEATHER_*`
//! environment variables, with `__` separating nested keys
//! (e.g. `AGRIWEATHER_PROVIDERS__WEATHERAPI__API_KEY`).

mod cache;
mod prediction;
mod providers;

use std::{fmt, path::Path, time::Duration};

use domain::ProviderId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use cache::CacheConfig;
pub use prediction::PredictionConfig;
pub use providers::{ProviderCredentials, ProvidersConfig};

use crate::telemetry::LoggingConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "AGRIWEATHER";

/// Largest accepted cache-key precision, about 11 cm of latitude
const MAX_COORDINATE_PRECISION: usize = 6;

/// Startup configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Sources could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// No provider has a key and simulation is off
    #[error("No weather provider configured: set at least one API key or enable simulation")]
    NoProvidersConfigured,

    /// The synthetic provider must not serve production traffic
    #[error("The simulation provider cannot be enabled in production")]
    SimulationInProduction,

    /// Priority list names an unknown provider or repeats one
    #[error("Invalid provider priority: {0}")]
    InvalidPriority(String),

    /// An adapter could not be constructed
    #[error("Failed to initialize weather provider: {0}")]
    ProviderInit(#[from] integration_weather::WeatherError),

    /// A setting is outside its accepted range
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

/// Application environment (development or production)
///
/// Controls whether the simulation provider may be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Synthetic provider switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// Per-request defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Deadline applied when a caller gives none, in seconds (default: 30)
    #[serde(default = "default_deadline_secs")]
    pub default_deadline_secs: u64,
}

const fn default_deadline_secs() -> u64 {
    30
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            default_deadline_secs: default_deadline_secs(),
        }
    }
}

impl RequestConfig {
    #[must_use]
    pub const fn default_deadline(&self) -> Duration {
        Duration::from_secs(self.default_deadline_secs)
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub prediction: PredictionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub request: RequestConfig,
}

impl AppConfig {
    /// Load from `config.toml` in the working directory (if present) and
    /// the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` when a source cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(config::File::with_name("config").required(false))
    }

    /// Load from an explicit file, still honouring environment overrides
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` when the file is missing or malformed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with(config::File::from(path).required(true))
    }

    fn load_with<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            // e.g. AGRIWEATHER_CACHE__BACKEND=moka
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("providers.priority")
                    .try_parsing(true),
            )
            .build()?;
        let app: Self = config.try_deserialize()?;
        debug!(environment = %app.environment, "Configuration loaded");
        Ok(app)
    }

    /// Check cross-field constraints before anything is wired
    ///
    /// # Errors
    ///
    /// - `NoProvidersConfigured` when no key is set and simulation is off
    /// - `SimulationInProduction` when simulation is on in production
    /// - `InvalidPriority` for unknown or repeated ids
    /// - `InvalidValue` for zero TTLs or timeouts, or an excessive key precision
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.enabled && self.environment == Environment::Production {
            return Err(ConfigError::SimulationInProduction);
        }
        if !self.providers.any_credentials() && !self.simulation.enabled {
            return Err(ConfigError::NoProvidersConfigured);
        }

        let priority = self.providers.priority_ids()?;
        for id in ProviderId::DEFAULT_PRIORITY {
            let configured = self
                .providers
                .credentials(id)
                .is_some_and(ProviderCredentials::has_key);
            if configured && !priority.contains(&id) {
                warn!(provider = %id, "Provider has a key but is missing from the priority list");
            }
        }

        if self.providers.attempt_timeout_secs == 0 {
            return Err(invalid("providers.attempt_timeout_secs", "must be positive"));
        }
        if self.request.default_deadline_secs == 0 {
            return Err(invalid("request.default_deadline_secs", "must be positive"));
        }
        for (field, secs) in [
            ("cache.ttl_current_secs", self.cache.ttl_current_secs),
            ("cache.ttl_extended_secs", self.cache.ttl_extended_secs),
            ("cache.ttl_historical_secs", self.cache.ttl_historical_secs),
        ] {
            if secs == 0 {
                return Err(invalid(field, "must be positive"));
            }
        }
        if self.cache.coordinate_precision > MAX_COORDINATE_PRECISION {
            return Err(invalid(
                "cache.coordinate_precision",
                format!("must be at most {MAX_COORDINATE_PRECISION}"),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        message: message.into(),
    }
}
