//! Per-handle access statistics.

use std::fmt;

/// Cumulative access counters of a channel or peripheral handle.
///
/// Units are bytes for byte-oriented peripherals and words for SSI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessCounters {
    pub errors: u64,
    pub read_accesses: u64,
    pub write_accesses: u64,
    pub units_read: u64,
    pub units_written: u64,
}

impl AccessCounters {
    pub fn record_read(&mut self, units: usize) {
        self.read_accesses += 1;
        self.units_read += units as u64;
    }

    pub fn record_write(&mut self, units: usize) {
        self.write_accesses += 1;
        self.units_written += units as u64;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for AccessCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "errors: {}, read accesses: {}, write accesses: {}, read: {}, written: {}",
            self.errors, self.read_accesses, self.write_accesses, self.units_read, self.units_written
        )
    }
}
