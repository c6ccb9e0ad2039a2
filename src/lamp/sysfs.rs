//! Linux sysfs GPIO output driver.
//!
//! Uses the classic `/sys/class/gpio` interface:
//!
//! - `export`: writing a line number makes `gpio<N>/` appear
//! - `gpio<N>/direction`: `out` configures the line as an output
//! - `gpio<N>/value`: `0` or `1` sets the level

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::{PinError, PinResult};
use super::{Level, OutputPin};

/// Default sysfs GPIO class directory.
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/gpio";

/// An output line driven through sysfs.
#[derive(Debug)]
pub struct SysfsPin {
    pin: u32,
    value_path: PathBuf,
}

impl SysfsPin {
    /// Exports `pin` (if needed) under `root` and configures it as an output.
    ///
    /// # Errors
    ///
    /// Returns an error if any sysfs attribute cannot be written.
    pub fn open(root: &Path, pin: u32) -> PinResult<Self> {
        let line_dir = root.join(format!("gpio{pin}"));

        if !line_dir.exists() {
            let export = root.join("export");
            fs::write(&export, pin.to_string()).map_err(|e| PinError::io(&export, e))?;
            info!(pin, "Exported GPIO line");
        }

        let direction = line_dir.join("direction");
        fs::write(&direction, "out").map_err(|e| PinError::io(&direction, e))?;
        debug!(pin, path = %line_dir.display(), "GPIO line configured as output");

        Ok(Self {
            pin,
            value_path: line_dir.join("value"),
        })
    }

    /// Returns the GPIO line number.
    #[must_use]
    pub const fn pin(&self) -> u32 {
        self.pin
    }
}

impl OutputPin for SysfsPin {
    fn write(&mut self, level: Level) -> PinResult<()> {
        let raw = match level {
            Level::Low => "0",
            Level::High => "1",
        };
        fs::write(&self.value_path, raw).map_err(|e| PinError::io(&self.value_path, e))?;
        debug!(pin = self.pin, level = %level, "GPIO write");
        Ok(())
    }
}
