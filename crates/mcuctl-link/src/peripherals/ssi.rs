//! SSI (SPI) master ports.

use mcuctl_protocol::{parse_data, Command, Severity, SsiSettings, DATA_MARKER, SSI_CLEAR_COUNT};
use tracing::debug;

use super::{decoded, send, send_ok, send_tolerant};
use crate::channel::SharedChannel;
use crate::counters::AccessCounters;
use crate::error::LinkResult;

/// One SSI master port of the board. Data is exchanged in words of up to
/// 16 bits.
///
/// Creating the handle does not touch the device; call [`SsiMaster::setup`]
/// to configure the port.
pub struct SsiMaster {
    channel: SharedChannel,
    port: u8,
    settings: SsiSettings,
    counters: AccessCounters,
}

impl SsiMaster {
    pub fn new(channel: SharedChannel, port: u8) -> Self {
        SsiMaster {
            channel,
            port,
            settings: SsiSettings::default(),
            counters: AccessCounters::default(),
        }
    }

    pub fn port(&self) -> u8 {
        self.port
    }

    /// Settings of the last successful setup (defaults before that).
    pub fn settings(&self) -> SsiSettings {
        self.settings
    }

    pub fn counters(&self) -> AccessCounters {
        self.counters
    }

    pub fn setup(&mut self, settings: SsiSettings) -> LinkResult<()> {
        let command = Command::SsiSetup {
            port: self.port,
            settings,
        };
        send_ok(&self.channel, &mut self.counters, &command)?;
        debug!(
            "SSI{}: {} Hz, {}, {} bit",
            self.port,
            settings.frequency(),
            settings.format().description(),
            settings.data_width()
        );
        self.settings = settings;
        Ok(())
    }

    pub fn write(&mut self, data: &[u16]) -> LinkResult<()> {
        let command = Command::ssi_write(self.port, data)?;
        send_ok(&self.channel, &mut self.counters, &command)?;
        self.counters.record_write(data.len());
        Ok(())
    }

    pub fn read(&mut self, count: usize) -> LinkResult<Vec<u16>> {
        let command = Command::ssi_read(self.port, count)?;
        let response = send_ok(&self.channel, &mut self.counters, &command)?;
        let data: Vec<u16> = decoded(&mut self.counters, &command, parse_data(response.body()))?;
        self.counters.record_read(data.len());
        Ok(data)
    }

    /// Read whatever is in the receive FIFO.
    ///
    /// A WARNING reply means the FIFO was empty and yields an empty result,
    /// as does an OK reply without data.
    pub fn read_all(&mut self) -> LinkResult<Vec<u16>> {
        let command = Command::SsiReadAll { port: self.port };
        let response = send_tolerant(&self.channel, &mut self.counters, &command, Severity::Warning)?;
        if !response.is_ok() || !response.body().contains(DATA_MARKER) {
            return Ok(Vec::new());
        }
        let data: Vec<u16> = decoded(&mut self.counters, &command, parse_data(response.body()))?;
        self.counters.record_read(data.len());
        Ok(data)
    }

    /// Drain the receive FIFO, ignoring what the device reports.
    pub fn clear(&mut self) -> LinkResult<()> {
        let command = Command::SsiRead {
            port: self.port,
            count: SSI_CLEAR_COUNT,
        };
        send(&self.channel, &mut self.counters, &command)?;
        Ok(())
    }
}
