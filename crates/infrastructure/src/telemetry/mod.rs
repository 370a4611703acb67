//! Logging initialization
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either
//! human-readable or JSON output on stderr.

mod logging;

pub use logging::{LoggingConfig, TelemetryError, init_logging};
