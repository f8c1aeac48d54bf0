//! # mcuctl-link
//!
//! Host side of the serial link to the TM4C1294 hardware demo firmware.
//!
//! ## Features
//!
//! - **Transports**: serial port, simulated hardware and a scripted stand-in shell
//! - **Command Channel**: echo suppression, reply accumulation until the prompt,
//!   framing fault detection
//! - **Peripherals**: LEDs, buttons, RGB LED, ADC, I2C, SSI, UART, LCD
//! - **Sensors**: TMP006 temperature and OPT3001 illuminance drivers
//!
//! ## Example
//!
//! ```rust,ignore
//! use mcuctl_link::{Board, CommandChannel, LinkConfig};
//!
//! let channel = CommandChannel::open(&LinkConfig::default())?.into_shared();
//! let mut board = Board::new(channel);
//! board.led.set(0x05)?;
//! let lux = board.opt3001.read_illuminance()?;
//! ```

mod board;
mod channel;
mod config;
mod counters;
mod error;
pub mod peripherals;
pub mod transport;

pub use board::{Board, I2C_PORT, SSI_PORT, UART_PORT};
pub use channel::{ChannelState, CommandChannel, SharedChannel};
pub use config::{
    ChannelConfig, LinkConfig, SerialParity, SerialSettings, BATCH_MAX_LINES, BATCH_POLL_TIMEOUT_US, DEFAULT_DEVICE,
};
pub use counters::AccessCounters;
pub use error::{LinkError, LinkResult, SensorStep};
pub use transport::{open_transport, Transport};

// Re-export the protocol types handles hand back
pub use mcuctl_protocol::{AdcReading, ButtonStatus, Response, Severity, SsiFrameFormat, SsiSettings, UartParity, UartSettings};
