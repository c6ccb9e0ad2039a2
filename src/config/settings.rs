//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::lamp::DEFAULT_SYSFS_ROOT;

/// Accepted values for `logging.level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// GPIO output settings.
    #[serde(default)]
    pub gpio: GpioConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gpio.backend == PinBackend::Sysfs && self.gpio.sysfs_root.as_os_str().is_empty() {
            return Err(ConfigError::InvalidGpio {
                field: "sysfs_root",
                reason: "must not be empty with the sysfs backend".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel {
                level: self.logging.level.clone(),
            });
        }

        Ok(())
    }
}

/// Which output driver backs the lamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinBackend {
    /// Linux `/sys/class/gpio`.
    #[default]
    Sysfs,
    /// In-memory pin, no hardware access.
    Simulated,
}

/// GPIO output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GpioConfig {
    /// Output driver.
    #[serde(default)]
    pub backend: PinBackend,

    /// GPIO line number.
    /// Default: 2
    #[serde(default = "default_pin")]
    pub pin: u32,

    /// Drive the line LOW to switch the lamp on (typical relay boards).
    #[serde(default = "default_true")]
    pub active_low: bool,

    /// sysfs GPIO class directory.
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            backend: PinBackend::default(),
            pin: default_pin(),
            active_low: default_true(),
            sysfs_root: default_sysfs_root(),
        }
    }
}

const fn default_pin() -> u32 {
    2
}

const fn default_true() -> bool {
    true
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from(DEFAULT_SYSFS_ROOT)
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.gpio.backend, PinBackend::Sysfs);
        assert_eq!(config.gpio.pin, 2);
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Relay on GPIO17",
            "gpio": {
                "backend": "simulated",
                "pin": 17,
                "active_low": false,
                "sysfs_root": "/tmp/gpio"
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.gpio.backend, PinBackend::Simulated);
        assert_eq!(config.gpio.pin, 17);
        assert!(!config.gpio.active_low);
        assert_eq!(config.gpio.sysfs_root, PathBuf::from("/tmp/gpio"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn gpio_config_defaults() {
        let config = GpioConfig::default();
        assert_eq!(config.backend, PinBackend::Sysfs);
        assert_eq!(config.pin, 2);
        assert!(config.active_low);
        assert_eq!(config.sysfs_root, PathBuf::from("/sys/class/gpio"));
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_empty_sysfs_root() {
        let json = r#"{ "gpio": { "sysfs_root": "" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGpio { field: "sysfs_root", .. })
        ));
    }

    #[test]
    fn empty_sysfs_root_allowed_when_simulated() {
        let json = r#"{ "gpio": { "backend": "simulated", "sysfs_root": "" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reject_invalid_log_level() {
        let json = r#"{ "logging": { "level": "loud" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel { ref level }) if level == "loud"
        ));
    }

    #[test]
    fn reject_unknown_backend() {
        let json = r#"{ "gpio": { "backend": "gpiod" } }"#;
        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
