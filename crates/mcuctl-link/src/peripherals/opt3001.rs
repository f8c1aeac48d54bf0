//! OPT3001 ambient light sensor.

use tracing::debug;

use super::i2c::SharedI2cMaster;
use super::i2c_device::I2cDevice;
use crate::counters::AccessCounters;
use crate::error::LinkResult;

/// Default bus address of the OPT3001 on the sensor booster pack.
pub const OPT3001_ADDRESS: u8 = 0x44;

const REG_RESULT: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;
const REG_MANUFACTURER_ID: u8 = 0x7e;
const REG_DEVICE_ID: u8 = 0x7f;

/// Automatic full-scale range, 800 ms conversion, continuous mode.
const CONFIG_INIT: u16 = 0xce10;

const GENERAL_CALL_ADDRESS: u8 = 0x00;
const GENERAL_CALL_RESET: u8 = 0x06;

/// Illuminance in lux from the raw result register.
///
/// The low 12 bits are the mantissa, the high 4 bits the exponent:
/// lux = mantissa * 0.01 * 2^exponent.
pub fn illuminance_lux(raw: u16) -> f64 {
    let mantissa = raw & 0x0fff;
    let exponent = raw >> 12;
    f64::from(mantissa) * 0.01 * f64::from(1u32 << exponent)
}

/// OPT3001 driver over an I2C master.
pub struct Opt3001 {
    device: I2cDevice,
}

impl Opt3001 {
    pub fn new(master: SharedI2cMaster, address: u8) -> Self {
        Opt3001 {
            device: I2cDevice::new(master, address, "OPT3001"),
        }
    }

    /// Start continuous conversion.
    pub fn init(&mut self) -> LinkResult<()> {
        let [msb, lsb] = CONFIG_INIT.to_be_bytes();
        self.device.write(&[REG_CONFIG, msb, lsb])
    }

    /// Reset through the I2C general call. This resets every device on the bus
    /// that honours the general call.
    pub fn reset(&mut self) -> LinkResult<()> {
        self.device
            .write_to(GENERAL_CALL_ADDRESS, &[GENERAL_CALL_RESET])
    }

    pub fn read_illuminance(&mut self) -> LinkResult<f64> {
        let raw = self.device.read_register(REG_RESULT, "result")?;
        let lux = illuminance_lux(raw);
        debug!("OPT3001 illuminance {:.2} lux", lux);
        Ok(lux)
    }

    pub fn read_manufacturer_id(&mut self) -> LinkResult<u16> {
        self.device.read_register(REG_MANUFACTURER_ID, "manufacturer ID")
    }

    pub fn read_device_id(&mut self) -> LinkResult<u16> {
        self.device.read_register(REG_DEVICE_ID, "device ID")
    }

    pub fn counters(&self) -> AccessCounters {
        self.device.counters()
    }
}
