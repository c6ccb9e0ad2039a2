//! In-memory output pin for simulation and tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::error::{PinError, PinResult};
use super::{Level, OutputPin};

#[derive(Debug, Default)]
struct PinLog {
    writes: Vec<Level>,
    faulted: bool,
}

/// A simulated output pin that records every write.
///
/// Clones share the same log, so a test can hand one clone to a [`super::Lamp`]
/// and inspect the writes through another.
#[derive(Debug, Clone)]
pub struct MemoryPin {
    pin: u32,
    log: Arc<Mutex<PinLog>>,
}

impl MemoryPin {
    /// Creates a simulated pin with an empty write log.
    #[must_use]
    pub fn new(pin: u32) -> Self {
        Self {
            pin,
            log: Arc::default(),
        }
    }

    fn log(&self) -> MutexGuard<'_, PinLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns every level written so far, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<Level> {
        self.log().writes.clone()
    }

    /// Returns the number of writes issued so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.log().writes.len()
    }

    /// Returns the most recently written level.
    #[must_use]
    pub fn level(&self) -> Option<Level> {
        self.log().writes.last().copied()
    }

    /// Makes subsequent writes fail until cleared.
    pub fn set_faulted(&self, faulted: bool) {
        self.log().faulted = faulted;
    }
}

impl OutputPin for MemoryPin {
    fn write(&mut self, level: Level) -> PinResult<()> {
        let mut log = self.log();
        if log.faulted {
            return Err(PinError::fault(self.pin, "simulated output fault"));
        }
        log.writes.push(level);
        debug!(pin = self.pin, level = %level, "Simulated GPIO write");
        Ok(())
    }
}
