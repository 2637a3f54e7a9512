#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for banker
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/banker/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod demand;
pub mod settings;

pub use demand::assign_maxima;
pub use settings::{DemandConfig, MaximumPolicy, OutputConfig, SimulationConfig};

use banker_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub demand: DemandConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("banker").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml(&contents).map_err(Into::into)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` on malformed TOML or unknown values.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;
        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Some(consumers) = env_parse("BANKER_CONSUMERS")? {
            self.simulation.consumers = consumers;
        }

        if let Some(hold_ms) = env_parse("BANKER_HOLD_MS")? {
            self.simulation.hold_ms = hold_ms;
        }

        if let Some(pause_ms) = env_parse("BANKER_PAUSE_MS")? {
            self.simulation.pause_ms = pause_ms;
        }

        if let Some(seed) = env_parse("BANKER_SEED")? {
            self.simulation.seed = Some(seed);
        }

        // BANKER_JSON
        if let Ok(json) = std::env::var("BANKER_JSON") {
            self.output.json = match json.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "BANKER_JSON".to_string(),
                        value: json,
                    }
                    .into())
                }
            };
        }

        Ok(())
    }

    /// Check settings that serde alone cannot enforce
    ///
    /// # Errors
    ///
    /// Returns an error for a zero consumer count or a maxima table whose
    /// row count disagrees with it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.consumers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "simulation.consumers".to_string(),
                value: "0".to_string(),
            });
        }

        match self.demand.policy {
            MaximumPolicy::Table if self.demand.maxima.is_empty() => {
                Err(ConfigError::MissingField {
                    field: "demand.maxima".to_string(),
                })
            }
            MaximumPolicy::Table if self.demand.maxima.len() != self.simulation.consumers => {
                Err(ConfigError::Invalid {
                    message: format!(
                        "demand.maxima has {} rows but simulation.consumers is {}",
                        self.demand.maxima.len(),
                        self.simulation.consumers
                    ),
                })
            }
            _ => Ok(()),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                field: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
