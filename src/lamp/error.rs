//! Error types for lamp output operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pin operations.
pub type PinResult<T> = Result<T, PinError>;

/// Errors that can occur while driving the lamp output.
#[derive(Debug, Error)]
pub enum PinError {
    /// A sysfs GPIO file could not be written.
    #[error("GPIO I/O failed on {path}: {source}")]
    Io {
        /// Path of the sysfs attribute.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The output rejected the write for another reason.
    #[error("GPIO fault on pin {pin}: {message}")]
    Fault {
        /// GPIO line number.
        pin: u32,
        /// Description of what's wrong.
        message: String,
    },
}

impl PinError {
    /// Creates an I/O error for the given sysfs path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a generic fault error.
    pub fn fault(pin: u32, message: impl Into<String>) -> Self {
        Self::Fault {
            pin,
            message: message.into(),
        }
    }
}
