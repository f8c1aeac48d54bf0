use mcuctl_protocol::{AdcReading, Command};

use super::{decoded, send_ok};
use crate::channel::SharedChannel;
use crate::counters::AccessCounters;
use crate::error::LinkResult;

/// Joystick and accelerometer channels of the ADC.
pub struct Adc {
    channel: SharedChannel,
    counters: AccessCounters,
}

impl Adc {
    pub fn new(channel: SharedChannel) -> Self {
        Adc {
            channel,
            counters: AccessCounters::default(),
        }
    }

    pub fn read(&mut self) -> LinkResult<AdcReading> {
        let command = Command::Adc;
        let response = send_ok(&self.channel, &mut self.counters, &command)?;
        let reading = decoded(&mut self.counters, &command, AdcReading::parse(response.body()))?;
        self.counters.record_read(5);
        Ok(reading)
    }

    pub fn counters(&self) -> AccessCounters {
        self.counters
    }
}
