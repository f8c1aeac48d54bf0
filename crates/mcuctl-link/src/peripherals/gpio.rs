//! User LEDs and buttons.

use mcuctl_protocol::{parse_led_value, ButtonStatus, Command};
use tracing::debug;

use super::{decoded, send_ok};
use crate::channel::SharedChannel;
use crate::counters::AccessCounters;
use crate::error::LinkResult;

/// The four user LEDs.
pub struct GpioLed {
    channel: SharedChannel,
    counters: AccessCounters,
}

impl GpioLed {
    pub fn new(channel: SharedChannel) -> Self {
        GpioLed {
            channel,
            counters: AccessCounters::default(),
        }
    }

    /// Switch the LEDs; bit n drives LED n, only the low four bits are used.
    pub fn set(&mut self, value: u8) -> LinkResult<()> {
        let command = Command::led_set(value);
        send_ok(&self.channel, &mut self.counters, &command)?;
        self.counters.record_write(1);
        Ok(())
    }

    /// Read back the LED state.
    pub fn get(&mut self) -> LinkResult<u8> {
        let command = Command::LedGet;
        let response = send_ok(&self.channel, &mut self.counters, &command)?;
        let value = decoded(&mut self.counters, &command, parse_led_value(response.body()))?;
        self.counters.record_read(1);
        debug!("LED value 0x{:02x}", value);
        Ok(value)
    }

    pub fn counters(&self) -> AccessCounters {
        self.counters
    }
}

/// The four user buttons.
pub struct GpioButton {
    channel: SharedChannel,
    counters: AccessCounters,
}

impl GpioButton {
    pub fn new(channel: SharedChannel) -> Self {
        GpioButton {
            channel,
            counters: AccessCounters::default(),
        }
    }

    /// Status and press/release counts of button `index` (0..=3).
    pub fn get(&mut self, index: u8) -> LinkResult<ButtonStatus> {
        let command = Command::button(index)?;
        let response = send_ok(&self.channel, &mut self.counters, &command)?;
        let status = decoded(&mut self.counters, &command, ButtonStatus::parse(response.body()))?;
        self.counters.record_read(1);
        Ok(status)
    }

    pub fn counters(&self) -> AccessCounters {
        self.counters
    }
}
