//! Byte transports between the host and the board.
//!
//! A transport moves command bytes to the device and hands back reply text
//! one fragment at a time: either a complete line (terminator included) or,
//! when a read times out, whatever partial text was pending. The prompt
//! `"> "` has no newline and always arrives that second way.

mod scripted;
mod serial;
mod simulated;

use std::io;
use std::time::Duration;

use tracing::info;

use crate::config::SerialSettings;
use crate::error::LinkResult;

pub use scripted::{CommandLog, ScriptedTransport};
pub use serial::SerialTransport;
pub use simulated::SimulatedTransport;

/// A character-oriented link to the board.
pub trait Transport: Send {
    /// Write and flush `data`.
    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read the next fragment, waiting at most `timeout`.
    ///
    /// Returns `None` when nothing arrived.
    fn read_line(&mut self, timeout: Duration) -> io::Result<Option<String>>;

    /// Drop any buffered input.
    fn discard_input(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// True when no hardware is attached.
    fn is_simulated(&self) -> bool {
        false
    }

    /// Human readable description of the link settings.
    fn describe(&self) -> String;
}

/// Open the transport for `path`.
///
/// An absent or empty path selects the simulated transport.
pub fn open_transport(path: Option<&str>, settings: &SerialSettings) -> LinkResult<Box<dyn Transport>> {
    match path.filter(|p| !p.is_empty()) {
        Some(path) => Ok(Box::new(SerialTransport::open(path, settings)?)),
        None => {
            info!("No serial device configured, simulating hardware access");
            Ok(Box::new(SimulatedTransport::new()))
        }
    }
}
