//! All peripherals of the demo board behind one channel.

use mcuctl_protocol::Command;

use crate::channel::SharedChannel;
use crate::error::{LinkError, LinkResult};
use crate::peripherals::{
    Adc, GpioButton, GpioLed, I2cMaster, Lcd, Opt3001, RgbLed, SharedI2cMaster, SsiMaster, Tmp006, UartMaster,
    OPT3001_ADDRESS, TMP006_ADDRESS,
};

/// I2C port wired to the booster pack sensors.
pub const I2C_PORT: u8 = 2;
/// SSI port of the booster pack header.
pub const SSI_PORT: u8 = 2;
/// UART port of the booster pack header.
pub const UART_PORT: u8 = 6;

/// Handles for every peripheral the firmware exposes.
pub struct Board {
    channel: SharedChannel,
    pub led: GpioLed,
    pub button: GpioButton,
    pub rgb: RgbLed,
    pub adc: Adc,
    pub i2c: SharedI2cMaster,
    pub ssi: SsiMaster,
    pub uart: UartMaster,
    pub lcd: Lcd,
    pub tmp006: Tmp006,
    pub opt3001: Opt3001,
}

impl Board {
    pub fn new(channel: SharedChannel) -> Self {
        let i2c = I2cMaster::new(channel.clone(), I2C_PORT).into_shared();
        Board {
            led: GpioLed::new(channel.clone()),
            button: GpioButton::new(channel.clone()),
            rgb: RgbLed::new(channel.clone()),
            adc: Adc::new(channel.clone()),
            ssi: SsiMaster::new(channel.clone(), SSI_PORT),
            uart: UartMaster::new(channel.clone(), UART_PORT),
            lcd: Lcd::new(channel.clone()),
            tmp006: Tmp006::new(i2c.clone(), TMP006_ADDRESS),
            opt3001: Opt3001::new(i2c.clone(), OPT3001_ADDRESS),
            i2c,
            channel,
        }
    }

    pub fn channel(&self) -> &SharedChannel {
        &self.channel
    }

    /// Firmware and board information.
    pub fn info(&self) -> LinkResult<String> {
        self.query(&Command::Info)
    }

    /// Command overview of the firmware shell.
    pub fn help(&self) -> LinkResult<String> {
        self.query(&Command::Help)
    }

    fn query(&self, command: &Command) -> LinkResult<String> {
        let response = self.channel.lock().send(command)?;
        if !response.is_ok() {
            return Err(LinkError::device(command, &response));
        }
        Ok(response.body().to_string())
    }
}
