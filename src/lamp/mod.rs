//! Lamp actuator facade.
//!
//! A [`Lamp`] wraps a single digital output and remembers the state it was
//! last commanded to. The physical output is abstracted behind
//! [`OutputPin`] so the same facade drives the sysfs GPIO driver on real
//! hardware and the in-memory pin under test or in simulation.
//!
//! # Wiring
//!
//! Relay boards commonly switch on the LOW level. The facade therefore maps
//! logical on/off to a physical [`Level`] through its `active_low` flag.

mod error;
mod memory;
mod sysfs;

pub use error::{PinError, PinResult};
pub use memory::MemoryPin;
pub use sysfs::{SysfsPin, DEFAULT_SYSFS_ROOT};

use tracing::{debug, info};

use crate::config::{GpioConfig, PinBackend};

/// Physical logic level of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Logic low (0).
    Low,
    /// Logic high (1).
    High,
}

impl Level {
    /// Returns the opposite level.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A digital output line.
pub trait OutputPin: Send {
    /// Drives the line to `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying output cannot be written.
    fn write(&mut self, level: Level) -> PinResult<()>;
}

impl<P: OutputPin + ?Sized> OutputPin for Box<P> {
    fn write(&mut self, level: Level) -> PinResult<()> {
        (**self).write(level)
    }
}

/// Stateful facade over the lamp output.
pub struct Lamp {
    pin: Box<dyn OutputPin>,
    on_level: Level,
    is_on: bool,
}

impl Lamp {
    /// Creates the facade and forces the output to the off level.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial write fails.
    pub fn new(pin: impl OutputPin + 'static, active_low: bool) -> PinResult<Self> {
        let on_level = if active_low { Level::Low } else { Level::High };
        let mut lamp = Self {
            pin: Box::new(pin),
            on_level,
            is_on: false,
        };
        lamp.pin.write(on_level.inverted())?;
        debug!(on_level = %on_level, "Lamp output initialised to off");
        Ok(lamp)
    }

    /// Opens the configured output and wraps it in a lamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be opened or initialised.
    pub fn open(config: &GpioConfig) -> PinResult<Self> {
        let pin: Box<dyn OutputPin> = match config.backend {
            PinBackend::Sysfs => Box::new(SysfsPin::open(&config.sysfs_root, config.pin)?),
            PinBackend::Simulated => Box::new(MemoryPin::new(config.pin)),
        };
        info!(
            pin = config.pin,
            backend = ?config.backend,
            active_low = config.active_low,
            "Lamp output opened"
        );
        Self::new(pin, config.active_low)
    }

    /// Switches the lamp on.
    ///
    /// The write is always issued, even if the lamp is already on.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written; the recorded state
    /// is left unchanged in that case.
    pub fn turn_on(&mut self) -> PinResult<()> {
        self.pin.write(self.on_level)?;
        self.is_on = true;
        info!("Lamp on");
        Ok(())
    }

    /// Switches the lamp off.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written; the recorded state
    /// is left unchanged in that case.
    pub fn turn_off(&mut self) -> PinResult<()> {
        self.pin.write(self.on_level.inverted())?;
        self.is_on = false;
        info!("Lamp off");
        Ok(())
    }

    /// Returns the last commanded state. Does not touch the hardware.
    #[must_use]
    pub const fn status(&self) -> bool {
        self.is_on
    }
}

impl std::fmt::Debug for Lamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lamp")
            .field("on_level", &self.on_level)
            .field("is_on", &self.is_on)
            .finish_non_exhaustive()
    }
}
