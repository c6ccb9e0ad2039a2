//! Configuration file loading and parsing.
//!
//! This module handles loading the configuration file from disk and parsing
//! it into validated, type-safe structures.
//!
//! # Configuration File Locations
//!
//! 1. Path given on the command line (must exist)
//! 2. Default location, used only if present:
//!    - **Linux/macOS:** `~/.lamp-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.lamp-mcp\config.json`
//!
//! Without either, built-in defaults apply (sysfs GPIO 2, active-low).

mod settings;

pub use settings::{Config, GpioConfig, LoggingConfig, PinBackend};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.lamp-mcp/`
/// - **Windows:** `%USERPROFILE%\.lamp-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".lamp-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads and parses the configuration file.
///
/// If `path` is `None`, uses the platform-specific default location and
/// falls back to [`Config::default`] when no file is there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given file does not exist
/// - The file cannot be read
/// - The JSON is malformed
/// - Fields are invalid
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound {
                    path: p.to_path_buf(),
                });
            }
            p.to_path_buf()
        }
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };

    let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Unreadable {
        path: config_path.clone(),
        source: e,
    })?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| ConfigError::Malformed {
        path: config_path.clone(),
        source: e,
    })?;

    config.validate()?;

    Ok(config)
}
