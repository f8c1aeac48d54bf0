//! TMP006 infrared thermopile sensor.

use tracing::debug;

use super::i2c::SharedI2cMaster;
use super::i2c_device::I2cDevice;
use crate::counters::AccessCounters;
use crate::error::LinkResult;

/// Default bus address of the TMP006 on the sensor booster pack.
pub const TMP006_ADDRESS: u8 = 0x40;

const REG_VOLTAGE: u8 = 0x00;
const REG_TEMPERATURE: u8 = 0x01;
const REG_CONFIG: u8 = 0x02;
const REG_MANUFACTURER_ID: u8 = 0xfe;
const REG_DEVICE_ID: u8 = 0xff;

/// Continuous conversion, 4 samples per result.
const CONFIG_INIT: u16 = 0x7500;
const CONFIG_RESET: u16 = 0x8000;

/// Sensor voltage resolution in nanovolts per LSB.
const VOLTAGE_LSB_NV: f64 = 156.25;

/// Die temperature in °C from the raw temperature register.
///
/// The value is left-justified 14-bit two's complement, 1/32 °C per LSB.
pub fn temperature_celsius(raw: u16) -> f64 {
    let [msb, lsb] = raw.to_be_bytes();
    let value = (u16::from(msb) << 6) | (u16::from(lsb) >> 2);
    if value & 0x2000 != 0 {
        -f64::from((!value).wrapping_add(1) & 0x3fff) / 32.0
    } else {
        f64::from(value) / 32.0
    }
}

/// Sensor voltage in nV from the raw voltage register.
pub fn sensor_voltage_nv(raw: u16) -> f64 {
    f64::from(raw as i16) * VOLTAGE_LSB_NV
}

/// TMP006 driver over an I2C master.
pub struct Tmp006 {
    device: I2cDevice,
}

impl Tmp006 {
    pub fn new(master: SharedI2cMaster, address: u8) -> Self {
        Tmp006 {
            device: I2cDevice::new(master, address, "TMP006"),
        }
    }

    /// Start continuous conversion.
    pub fn init(&mut self) -> LinkResult<()> {
        let [msb, lsb] = CONFIG_INIT.to_be_bytes();
        self.device.write(&[REG_CONFIG, msb, lsb])
    }

    /// Software reset.
    pub fn reset(&mut self) -> LinkResult<()> {
        let [msb, lsb] = CONFIG_RESET.to_be_bytes();
        self.device.write(&[REG_CONFIG, msb, lsb])
    }

    pub fn read_temperature(&mut self) -> LinkResult<f64> {
        let raw = self.device.read_register(REG_TEMPERATURE, "temperature")?;
        let celsius = temperature_celsius(raw);
        debug!("TMP006 temperature {:.2} °C", celsius);
        Ok(celsius)
    }

    pub fn read_voltage_nv(&mut self) -> LinkResult<f64> {
        let raw = self.device.read_register(REG_VOLTAGE, "sensor voltage")?;
        Ok(sensor_voltage_nv(raw))
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_temperature_conversion() {
        assert_relative_eq!(temperature_celsius(0x1900), 50.0);
        assert_relative_eq!(temperature_celsius(0xe700), -50.0);
        assert_relative_eq!(temperature_celsius(0x0000), 0.0);
        assert_relative_eq!(temperature_celsius(0x0004), 1.0 / 32.0);
        assert_relative_eq!(temperature_celsius(0xfffc), -1.0 / 32.0);
    }

    #[test]
    fn test_sensor_voltage() {
        assert_relative_eq!(sensor_voltage_nv(0x0001), 156.25);
        assert_relative_eq!(sensor_voltage_nv(0xffff), -156.25);
        assert_relative_eq!(sensor_voltage_nv(0x8000), -32768.0 * 156.25);
    }
}
