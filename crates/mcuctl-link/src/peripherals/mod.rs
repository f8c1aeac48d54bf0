//! Peripheral handles.
//!
//! Every handle validates its parameters, builds a [`Command`], sends it over
//! the shared channel and decodes the reply body. Replies with a severity
//! other than OK are reported as [`LinkError::Device`] unless a handle
//! documents otherwise. Each handle keeps its own [`AccessCounters`].

mod adc;
mod gpio;
mod i2c;
mod i2c_device;
mod lcd;
mod opt3001;
mod rgb;
mod ssi;
mod tmp006;
mod uart;

pub use adc::Adc;
pub use gpio::{GpioButton, GpioLed};
pub use i2c::{I2cMaster, SharedI2cMaster};
pub use i2c_device::I2cDevice;
pub use lcd::Lcd;
pub use opt3001::{illuminance_lux, Opt3001, OPT3001_ADDRESS};
pub use rgb::RgbLed;
pub use ssi::SsiMaster;
pub use tmp006::{sensor_voltage_nv, temperature_celsius, Tmp006, TMP006_ADDRESS};
pub use uart::UartMaster;

use mcuctl_protocol::{Command, DecodeResult, Response, Severity};
use tracing::warn;

use crate::channel::SharedChannel;
use crate::counters::AccessCounters;
use crate::error::{LinkError, LinkResult};

/// Send `command`, counting transport failures as errors.
pub(crate) fn send(channel: &SharedChannel, counters: &mut AccessCounters, command: &Command) -> LinkResult<Response> {
    let result = channel.lock().send(command);
    if result.is_err() {
        counters.record_error();
    }
    result
}

/// Send `command` and require an OK reply.
pub(crate) fn send_ok(channel: &SharedChannel, counters: &mut AccessCounters, command: &Command) -> LinkResult<Response> {
    send_tolerant(channel, counters, command, Severity::Ok)
}

/// Send `command` and accept any severity up to `worst`.
pub(crate) fn send_tolerant(
    channel: &SharedChannel,
    counters: &mut AccessCounters,
    command: &Command,
    worst: Severity,
) -> LinkResult<Response> {
    let response = send(channel, counters, command)?;
    if response.severity() > worst {
        counters.record_error();
        warn!("`{}` failed: {}", command.to_command_string(), response.full());
        return Err(LinkError::device(command, &response));
    }
    Ok(response)
}

/// Attach the command to a decode failure.
pub(crate) fn decoded<T>(counters: &mut AccessCounters, command: &Command, result: DecodeResult<T>) -> LinkResult<T> {
    result.map_err(|source| {
        counters.record_error();
        LinkError::decode(command, source)
    })
}
