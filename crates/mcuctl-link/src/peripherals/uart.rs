//! UART passthrough ports.

use mcuctl_protocol::{parse_data, Command, Severity, UartSettings, DATA_MARKER, SHORT_READ_MARKER};
use tracing::{debug, warn};

use super::{decoded, send, send_ok};
use crate::channel::SharedChannel;
use crate::counters::AccessCounters;
use crate::error::{LinkError, LinkResult};

/// One UART port of the board, driven through the shell.
pub struct UartMaster {
    channel: SharedChannel,
    port: u8,
    settings: UartSettings,
    counters: AccessCounters,
}

impl UartMaster {
    pub fn new(channel: SharedChannel, port: u8) -> Self {
        UartMaster {
            channel,
            port,
            settings: UartSettings::default(),
            counters: AccessCounters::default(),
        }
    }

    pub fn port(&self) -> u8 {
        self.port
    }

    pub fn settings(&self) -> UartSettings {
        self.settings
    }

    pub fn counters(&self) -> AccessCounters {
        self.counters
    }

    pub fn setup(&mut self, settings: UartSettings) -> LinkResult<()> {
        let command = Command::UartSetup {
            port: self.port,
            settings,
        };
        send_ok(&self.channel, &mut self.counters, &command)?;
        debug!(
            "UART{}: {} baud, parity {}, loopback {}",
            self.port,
            settings.baud_rate(),
            settings.parity().as_str(),
            settings.loopback()
        );
        self.settings = settings;
        Ok(())
    }

    pub fn write(&mut self, data: &[u8]) -> LinkResult<()> {
        let command = Command::uart_write(self.port, data)?;
        send_ok(&self.channel, &mut self.counters, &command)?;
        self.counters.record_write(data.len());
        Ok(())
    }

    pub fn read(&mut self, count: usize) -> LinkResult<Vec<u8>> {
        let command = Command::uart_read(self.port, count)?;
        let response = send_ok(&self.channel, &mut self.counters, &command)?;
        let data: Vec<u8> = decoded(&mut self.counters, &command, parse_data(response.body()))?;
        self.counters.record_read(data.len());
        Ok(data)
    }

    /// Read everything the port has received.
    ///
    /// Asks for the maximum byte count, so the firmware normally answers with
    /// a short-read ERROR that still carries the bytes it got; that reply is
    /// decoded like an OK one. A WARNING reply or a reply without data means
    /// nothing was pending. Any other non-OK reply is an error.
    pub fn read_all(&mut self) -> LinkResult<Vec<u8>> {
        let command = Command::uart_read_all(self.port);
        let response = send(&self.channel, &mut self.counters, &command)?;
        let short_read = response.severity() == Severity::Error && response.body().starts_with(SHORT_READ_MARKER);
        match response.severity() {
            Severity::Ok => {}
            Severity::Warning => return Ok(Vec::new()),
            _ if short_read => debug!("UART{}: {}", self.port, response.body()),
            _ => {
                self.counters.record_error();
                warn!("`{}` failed: {}", command.to_command_string(), response.full());
                return Err(LinkError::device(&command, &response));
            }
        }
        if !response.body().contains(DATA_MARKER) {
            return Ok(Vec::new());
        }
        let data: Vec<u8> = decoded(&mut self.counters, &command, parse_data(response.body()))?;
        self.counters.record_read(data.len());
        Ok(data)
    }

    /// Drop pending receive data, ignoring what the device reports.
    pub fn clear(&mut self) -> LinkResult<()> {
        send(&self.channel, &mut self.counters, &Command::uart_read_all(self.port))?;
        Ok(())
    }

    /// Send the bytes of `text`.
    pub fn write_str(&mut self, text: &str) -> LinkResult<()> {
        self.write(text.as_bytes())
    }

    /// Read `count` bytes as characters; 0 reads everything pending.
    pub fn read_str(&mut self, count: usize) -> LinkResult<String> {
        let data = if count == 0 {
            self.read_all()?
        } else {
            self.read(count)?
        };
        Ok(data.into_iter().map(char::from).collect())
    }
}
