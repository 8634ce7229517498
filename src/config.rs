//! # Configuration Module
//!
//! TOML configuration for the demo runtime.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration. Values are validated after loading; a nonsense
//! value fails startup instead of misbehaving later.

use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use crate::error::{PadlinkError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Controller device selection.
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Tick loop timing.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Binding profile persistence.
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Controller device selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    /// Index into the list of detected gamepads.
    #[serde(default = "default_device_index")]
    pub device_index: usize,
}

/// Tick loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Client and decay tick rate in Hz.
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: u64,

    /// Seconds between status log lines.
    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,
}

/// Binding profile persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Path of the JSON record the profile is stored in.
    #[serde(default = "default_profile_path")]
    pub path: String,
}

fn default_device_index() -> usize {
    0
}

fn default_tick_rate_hz() -> u64 {
    20
}

fn default_status_interval_secs() -> u64 {
    10
}

fn default_profile_path() -> String {
    "padlink-profile.json".to_string()
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            device_index: default_device_index(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate_hz(),
            status_interval_secs: default_status_interval_secs(),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            path: default_profile_path(),
        }
    }
}

impl Config {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, fails to parse, or
    /// fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates field ranges.
    pub fn validate(&self) -> Result<()> {
        if self.runtime.tick_rate_hz == 0 || self.runtime.tick_rate_hz > 250 {
            return Err(config_error(format!(
                "tick_rate_hz must be 1-250, got {}",
                self.runtime.tick_rate_hz
            )));
        }
        if self.runtime.status_interval_secs == 0 {
            return Err(config_error("status_interval_secs must be at least 1"));
        }
        if self.profile.path.is_empty() {
            return Err(config_error("profile path must not be empty"));
        }
        Ok(())
    }
}

fn config_error(message: impl std::fmt::Display) -> PadlinkError {
    PadlinkError::Config(toml::de::Error::custom(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.runtime.tick_rate_hz, 20);
        assert_eq!(config.controller.device_index, 0);
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.profile.path, "padlink-profile.json");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[runtime]\ntick_rate_hz = 50\n").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.runtime.tick_rate_hz, 50);
        assert_eq!(config.runtime.status_interval_secs, 10);
    }

    #[test]
    fn test_invalid_tick_rate_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[runtime]\ntick_rate_hz = 0\n").unwrap();
        assert!(Config::load(file.path()).is_err());

        let config = Config {
            runtime: RuntimeConfig {
                tick_rate_hz: 1000,
                ..RuntimeConfig::default()
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[runtime]\nspeed = 9\n").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::load("/nonexistent/padlink.toml").is_err());
    }
}
