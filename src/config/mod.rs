//! Application configuration loading, validation, and management.
//!
//! The top-level `Config` aggregates logging, rabbitmqctl invocation,
//! collection timing and sink settings. It is loaded once from a TOML file
//! at startup and is read-only afterwards.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::{logger::LoggerConfig, metrics::MetricsConfig, rabbitmq::RabbitmqConfig, sink::SinkConfig};

pub mod logger;
pub mod metrics;
pub mod rabbitmq;
pub mod sink;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "RABBITBEE_CONFIG";

/// Configuration file used when `RABBITBEE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/rabbitbee/config.toml";

/// Timestamped messages printed to stderr before the tracing subscriber is
/// initialized, during early configuration loading.
#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        $crate::config::print_early($crate::config::EarlyLevel::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! print_warn {
    ($($arg:tt)*) => {
        $crate::config::print_early($crate::config::EarlyLevel::Warn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        $crate::config::print_early($crate::config::EarlyLevel::Error, format_args!($($arg)*))
    };
}

#[doc(hidden)]
#[derive(Debug, Clone, Copy)]
pub enum EarlyLevel {
    Info,
    Warn,
    Error,
}

#[doc(hidden)]
pub fn print_early(level: EarlyLevel, message: std::fmt::Arguments<'_>) {
    let level = match level {
        EarlyLevel::Info => console::style("INFO").green(),
        EarlyLevel::Warn => console::style("WARN").yellow(),
        EarlyLevel::Error => console::style("ERROR").red(),
    };
    let timestamp = time::format_description::parse(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z",
    )
    .ok()
    .and_then(|format| time::OffsetDateTime::now_utc().format(&format).ok())
    .unwrap_or_default();
    eprintln!("{}  {} {}", console::style(timestamp).dim(), level, message);
}

/// Errors that can occur during configuration loading, parsing or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error while reading configuration: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error while reading configuration: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Top-level application configuration.
#[derive(Serialize, Deserialize, Debug, Validate, Clone, Default)]
#[serde(default)]
pub struct Config {
    #[validate(nested)]
    pub logger: LoggerConfig,

    #[validate(nested)]
    pub rabbitmq: RabbitmqConfig,

    #[validate(nested)]
    pub metrics: MetricsConfig,

    #[validate(nested)]
    pub sink: SinkConfig,
}

impl Config {
    /// Locates and loads the configuration file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration file cannot be found,
    /// read, parsed, or validated.
    pub fn new() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path()?;
        Self::load(&config_path)
    }

    /// Determines the configuration file path.
    ///
    /// Priority:
    /// 1. `RABBITBEE_CONFIG` environment variable
    /// 2. `/etc/rabbitbee/config.toml`
    fn get_config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(config_path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(config_path);
            print_info!("Using config from {}: {}", CONFIG_ENV, path.display());
            return Ok(path);
        }

        let fallback = Path::new(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            print_info!("Using default config path: {}", fallback.display());
            return Ok(fallback.to_path_buf());
        }

        Err(ConfigError::Config(format!(
            "No configuration file found. Set {} or create {}",
            CONFIG_ENV, DEFAULT_CONFIG_PATH
        )))
    }

    /// Loads and validates configuration from the specified path.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        print_info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::Config(format!(
                "Configuration file does not exist: {}",
                path.display()
            )));
        }

        let config_str = fs::read_to_string(path)?;
        let config = Self::from_toml(&config_str)?;

        print_info!("Successfully loaded config from: {}", path.display());
        Ok(config)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(source: &str) -> Result<Config, ConfigError> {
        let config: Config =
            toml::from_str(source).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(config)
    }
}
