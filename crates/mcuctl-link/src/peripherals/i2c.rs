//! I2C master ports.

use std::sync::Arc;

use mcuctl_protocol::{parse_data, parse_detected_addresses, Command, I2cAccessMode, Response};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{decoded, send_ok};
use crate::channel::SharedChannel;
use crate::counters::AccessCounters;
use crate::error::{LinkError, LinkResult};

/// An I2C master shared by the devices on its bus.
pub type SharedI2cMaster = Arc<Mutex<I2cMaster>>;

/// One I2C master port of the board.
pub struct I2cMaster {
    channel: SharedChannel,
    port: u8,
    counters: AccessCounters,
}

impl I2cMaster {
    pub fn new(channel: SharedChannel, port: u8) -> Self {
        I2cMaster {
            channel,
            port,
            counters: AccessCounters::default(),
        }
    }

    pub fn into_shared(self) -> SharedI2cMaster {
        Arc::new(Mutex::new(self))
    }

    pub fn port(&self) -> u8 {
        self.port
    }

    pub fn counters(&self) -> AccessCounters {
        self.counters
    }

    /// Write `data` with a start and a stop condition.
    pub fn write(&mut self, address: u8, data: &[u8]) -> LinkResult<()> {
        self.write_with(address, data, false, true)
    }

    /// Write `data` with explicit bus framing.
    pub fn write_with(&mut self, address: u8, data: &[u8], repeated_start: bool, stop: bool) -> LinkResult<()> {
        let mode = I2cAccessMode::write(repeated_start, stop);
        let command = Command::i2c_write(self.port, address, mode, data)?;
        send_ok(&self.channel, &mut self.counters, &command)?;
        self.counters.record_write(data.len());
        Ok(())
    }

    /// Read `count` bytes with a start and a stop condition.
    pub fn read(&mut self, address: u8, count: usize) -> LinkResult<Vec<u8>> {
        self.read_with(address, count, false, true)
    }

    /// Read `count` bytes with explicit bus framing.
    pub fn read_with(&mut self, address: u8, count: usize, repeated_start: bool, stop: bool) -> LinkResult<Vec<u8>> {
        let mode = I2cAccessMode::read(repeated_start, stop);
        let command = Command::i2c_read(self.port, address, mode, count)?;
        let response = send_ok(&self.channel, &mut self.counters, &command)?;
        let data: Vec<u8> = decoded(&mut self.counters, &command, parse_data(response.body()))?;
        self.counters.record_read(data.len());
        Ok(data)
    }

    /// Address-only transaction; succeeds when the slave acknowledges.
    pub fn quick_command(&mut self, address: u8, read: bool) -> LinkResult<()> {
        self.quick_command_with(address, read, false)
    }

    pub fn quick_command_with(&mut self, address: u8, read: bool, repeated_start: bool) -> LinkResult<()> {
        let command = Command::I2cQuick {
            port: self.port,
            address,
            mode: I2cAccessMode::quick(read, repeated_start),
        };
        self.send_slow(&command)?;
        if read {
            self.counters.record_read(0);
        } else {
            self.counters.record_write(0);
        }
        Ok(())
    }

    /// Scan the bus and return the addresses that answered.
    pub fn detect(&mut self) -> LinkResult<Vec<u8>> {
        let command = Command::I2cDetect { port: self.port };
        let response = self.send_slow(&command)?;
        let addresses = decoded(
            &mut self.counters,
            &command,
            parse_detected_addresses(response.body()),
        )?;
        debug!("I2C{}: {} device(s) found", self.port, addresses.len());
        Ok(addresses)
    }

    /// Send with the channel's extended poll timeout and require OK.
    fn send_slow(&mut self, command: &Command) -> LinkResult<Response> {
        let result = {
            let mut channel = self.channel.lock();
            let timeout = channel.config().extended_timeout();
            channel.send_with_poll_timeout(command, timeout)
        };
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.counters.record_error();
                return Err(e);
            }
        };
        if !response.is_ok() {
            self.counters.record_error();
            warn!("`{}` failed: {}", command.to_command_string(), response.full());
            return Err(LinkError::device(command, &response));
        }
        Ok(response)
    }
}
