use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use mcuctl_protocol::LineCodec;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, trace};

use super::Transport;
use crate::config::{SerialParity, SerialSettings};
use crate::error::{LinkError, LinkResult};

/// Transport over a physical or virtual serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    path: String,
    settings: SerialSettings,
    codec: LineCodec,
}

impl SerialTransport {
    /// Open `path` with `settings`.
    pub fn open(path: &str, settings: &SerialSettings) -> LinkResult<Self> {
        settings.validate()?;
        let port = serialport::new(path, settings.baud_rate)
            .data_bits(data_bits(settings.data_bits))
            .parity(match settings.parity {
                SerialParity::None => Parity::None,
                SerialParity::Even => Parity::Even,
                SerialParity::Odd => Parity::Odd,
            })
            .stop_bits(if settings.stop_bits == 2 {
                StopBits::Two
            } else {
                StopBits::One
            })
            .flow_control(FlowControl::None)
            .timeout(settings.write_timeout())
            .open()
            .map_err(|source| LinkError::Open {
                path: path.to_string(),
                source,
            })?;
        debug!("Opened serial port {} at {} baud", path, settings.baud_rate);

        Ok(SerialTransport {
            port,
            path: path.to_string(),
            settings: settings.clone(),
            codec: LineCodec::new(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn data_bits(bits: u8) -> DataBits {
    match bits {
        5 => DataBits::Five,
        6 => DataBits::Six,
        7 => DataBits::Seven,
        _ => DataBits::Eight,
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.set_timeout(self.settings.write_timeout())?;
        self.port.write_all(data)?;
        self.port.flush()
    }

    fn read_line(&mut self, timeout: Duration) -> io::Result<Option<String>> {
        let deadline = Instant::now() + timeout;
        let mut chunk = [0u8; 256];
        loop {
            if let Some(line) = self.codec.decode_line() {
                return Ok(Some(line));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(self.codec.take_partial());
            }
            self.port.set_timeout(deadline - now)?;
            match self.port.read(&mut chunk) {
                Ok(n) => {
                    trace!("Serial read {} bytes", n);
                    self.codec.push(&chunk[..n]);
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
                Err(e) => return Err(e),
            }
        }
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.codec.clear();
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn describe(&self) -> String {
        let parity = match self.settings.parity {
            SerialParity::None => "none",
            SerialParity::Even => "even",
            SerialParity::Odd => "odd",
        };
        format!(
            "port: {}, baud rate: {}, data bits: {}, parity: {}, stop bits: {}",
            self.path, self.settings.baud_rate, self.settings.data_bits, parity, self.settings.stop_bits
        )
    }
}
