//! Error types for lamp-mcp.
//!
//! Output driver failures live in [`crate::lamp::PinError`]; protocol
//! failures are values ([`crate::mcp::McpError`]), not Rust errors.

use std::path::PathBuf;

use thiserror::Error;

/// Why the lamp configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("cannot read config file {path}")]
    Unreadable {
        /// Path to the config file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON or has unknown keys.
    #[error("invalid config file {path}: {source}")]
    Malformed {
        /// Path to the config file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An explicitly named config file does not exist.
    #[error("config file {path} does not exist")]
    NotFound {
        /// Path given on the command line.
        path: PathBuf,
    },

    /// A `gpio` setting cannot drive the lamp.
    #[error("invalid gpio.{field}: {reason}")]
    InvalidGpio {
        /// Key inside the `gpio` section.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// `logging.level` is not a tracing level name.
    #[error("unknown logging.level '{level}' (expected one of: trace, debug, info, warn, error)")]
    InvalidLogLevel {
        /// The rejected value.
        level: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_path() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/etc/lamp-mcp/config.json"),
        };
        assert_eq!(
            error.to_string(),
            "config file /etc/lamp-mcp/config.json does not exist"
        );
    }

    #[test]
    fn malformed_includes_cause() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = ConfigError::Malformed {
            path: PathBuf::from("config.json"),
            source,
        };
        assert!(error.to_string().starts_with("invalid config file config.json: "));
        assert!(error.to_string().contains("EOF"));
    }

    #[test]
    fn gpio_errors_name_the_key() {
        let error = ConfigError::InvalidGpio {
            field: "sysfs_root",
            reason: "must not be empty with the sysfs backend".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "invalid gpio.sysfs_root: must not be empty with the sysfs backend"
        );

        let error = ConfigError::InvalidLogLevel {
            level: "loud".to_string(),
        };
        assert!(error.to_string().contains("'loud'"));
    }
}
