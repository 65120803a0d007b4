//! Configuration for embedding the replicated set
//!
//! Covers the ambient pieces an application picks once at startup: how
//! logging is set up and which clock stamps `add_now` / `remove_now`.
//! Values come from defaults, a TOML file, or `LWWSET_*` environment
//! variables.

use crate::core_store::crdt::{AnyClock, ClockKind};
use crate::logging::{LogConfig, LogLevel};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

mod error;

pub use error::ConfigError;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub clock: ClockConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include timestamps
    pub with_timestamp: bool,

    /// Include target module
    pub with_target: bool,
}

/// Clock used for locally stamped operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub kind: ClockKind,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Convert into the logging subsystem's configuration
    pub fn to_log_config(&self) -> Result<LogConfig, ConfigError> {
        let level: LogLevel = self
            .level
            .parse()
            .map_err(|e| ConfigError::InvalidValue(format!("Invalid log level: {}", e)))?;

        Ok(LogConfig::new(level)
            .with_timestamp(self.with_timestamp)
            .with_target(self.with_target)
            .json_format(self.json_format))
    }
}

impl ClockConfig {
    pub fn build(&self) -> AnyClock {
        self.kind.build()
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Recognized variables:
    /// - `LWWSET_LOG_LEVEL`
    /// - `LWWSET_LOG_JSON`
    /// - `LWWSET_LOG_TIMESTAMP`
    /// - `LWWSET_CLOCK` (`system` or `lamport`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup("LWWSET_LOG_LEVEL") {
            config.logging.level = level.to_lowercase();
        }
        if let Some(json) = lookup("LWWSET_LOG_JSON") {
            config.logging.json_format = json
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid JSON flag: {}", e)))?;
        }
        if let Some(timestamp) = lookup("LWWSET_LOG_TIMESTAMP") {
            config.logging.with_timestamp = timestamp
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid timestamp flag: {}", e)))?;
        }
        if let Some(clock) = lookup("LWWSET_CLOCK") {
            config.clock.kind = ClockKind::parse(&clock)
                .ok_or_else(|| ConfigError::InvalidValue(format!("Invalid clock: {}", clock)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWriteError(e.to_string()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level.parse::<LogLevel>().is_err() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }
}
