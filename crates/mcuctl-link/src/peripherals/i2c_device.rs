//! A slave device on an I2C bus.

use mcuctl_protocol::{Command, DecodeError, I2cAccessMode};
use tracing::trace;

use super::i2c::SharedI2cMaster;
use crate::counters::AccessCounters;
use crate::error::{LinkError, LinkResult, SensorStep};

/// Address and name of a slave on a shared I2C master.
pub struct I2cDevice {
    master: SharedI2cMaster,
    address: u8,
    name: &'static str,
    counters: AccessCounters,
}

impl I2cDevice {
    pub fn new(master: SharedI2cMaster, address: u8, name: &'static str) -> Self {
        I2cDevice {
            master,
            address,
            name,
            counters: AccessCounters::default(),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn counters(&self) -> AccessCounters {
        self.counters
    }

    pub fn write(&mut self, data: &[u8]) -> LinkResult<()> {
        let result = self.master.lock().write(self.address, data);
        self.track(result, |c| c.record_write(data.len()))
    }

    pub fn read(&mut self, count: usize) -> LinkResult<Vec<u8>> {
        let result = self.master.lock().read(self.address, count);
        let data = self.track(result, |_| ())?;
        self.counters.record_read(data.len());
        Ok(data)
    }

    /// Write without releasing the bus, then read with a repeated start.
    pub fn write_read(&mut self, data: &[u8], count: usize) -> LinkResult<Vec<u8>> {
        let written = self.master.lock().write_with(self.address, data, false, false);
        self.track(written, |c| c.record_write(data.len()))?;
        let result = self.master.lock().read_with(self.address, count, true, true);
        let data = self.track(result, |_| ())?;
        self.counters.record_read(data.len());
        Ok(data)
    }

    /// Write `data` to another address, keeping this device's address.
    pub fn write_to(&mut self, address: u8, data: &[u8]) -> LinkResult<()> {
        let original = std::mem::replace(&mut self.address, address);
        let result = self.write(data);
        self.address = original;
        result
    }

    /// Read a 16-bit big-endian register: write the pointer, then read two bytes.
    pub fn read_register(&mut self, pointer: u8, register: &'static str) -> LinkResult<u16> {
        let name = self.name;
        let sensor_error = |step, source| LinkError::Sensor {
            device: name,
            register,
            step,
            source: Box::new(source),
        };

        self.write(&[pointer])
            .map_err(|e| sensor_error(SensorStep::SetPointer, e))?;
        let data = self
            .read(2)
            .map_err(|e| sensor_error(SensorStep::ReadData, e))?;

        match data[..] {
            [msb, lsb] => {
                let value = u16::from_be_bytes([msb, lsb]);
                trace!("{}: {} register = 0x{:04x}", name, register, value);
                Ok(value)
            }
            _ => {
                self.counters.record_error();
                let port = self.master.lock().port();
                let command = Command::I2cRead {
                    port,
                    address: self.address,
                    mode: I2cAccessMode::read(false, true),
                    count: 2,
                };
                let source = LinkError::decode(
                    &command,
                    DecodeError::TokenCount {
                        expected: 2,
                        actual: data.len(),
                    },
                );
                Err(sensor_error(SensorStep::ReadData, source))
            }
        }
    }

    fn track<T>(&mut self, result: LinkResult<T>, on_ok: impl FnOnce(&mut AccessCounters)) -> LinkResult<T> {
        match result {
            Ok(value) => {
                on_ok(&mut self.counters);
                Ok(value)
            }
            Err(e) => {
                self.counters.record_error();
                Err(e)
            }
        }
    }
}
