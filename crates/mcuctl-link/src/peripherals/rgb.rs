use mcuctl_protocol::Command;

use super::send_ok;
use crate::channel::SharedChannel;
use crate::counters::AccessCounters;
use crate::error::LinkResult;

/// The RGB LED.
pub struct RgbLed {
    channel: SharedChannel,
    counters: AccessCounters,
}

impl RgbLed {
    pub fn new(channel: SharedChannel) -> Self {
        RgbLed {
            channel,
            counters: AccessCounters::default(),
        }
    }

    pub fn set(&mut self, red: u8, green: u8, blue: u8) -> LinkResult<()> {
        send_ok(&self.channel, &mut self.counters, &Command::rgb(red, green, blue))?;
        self.counters.record_write(3);
        Ok(())
    }

    /// Set the LED from a `0xRRGGBB` value.
    pub fn set_color(&mut self, color: u32) -> LinkResult<()> {
        let [_, red, green, blue] = color.to_be_bytes();
        self.set(red, green, blue)
    }

    pub fn counters(&self) -> AccessCounters {
        self.counters
    }
}
