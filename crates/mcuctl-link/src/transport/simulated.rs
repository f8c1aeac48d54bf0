use std::io;
use std::time::Duration;

use tracing::trace;

use super::Transport;

/// Transport used when no device is configured.
///
/// Writes are dropped and nothing is ever received; the command channel
/// answers every command with the canned simulated reply instead.
#[derive(Debug, Default)]
pub struct SimulatedTransport;

impl SimulatedTransport {
    pub fn new() -> Self {
        SimulatedTransport
    }
}

impl Transport for SimulatedTransport {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        trace!("Simulated write of {} bytes", data.len());
        Ok(())
    }

    fn read_line(&mut self, _timeout: Duration) -> io::Result<Option<String>> {
        Ok(None)
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        "simulated hardware".to_string()
    }
}
