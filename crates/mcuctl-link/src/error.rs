//! Error types for the command link.

use std::fmt;

use mcuctl_protocol::{Command, CommandError, DecodeError, Response, Severity};
use thiserror::Error;

/// Step of a two-step sensor register read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorStep {
    /// Writing the register pointer byte.
    SetPointer,
    /// Reading the two register bytes.
    ReadData,
}

impl fmt::Display for SensorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorStep::SetPointer => f.write_str("setting the register pointer"),
            SensorStep::ReadData => f.write_str("reading the register data"),
        }
    }
}

/// Errors that can occur while talking to the board.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The serial port could not be opened.
    #[error("cannot open serial port `{path}`: {source}")]
    Open {
        /// Port path as configured.
        path: String,
        #[source]
        source: serialport::Error,
    },

    /// Writing to or reading from the transport failed.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No prompt arrived within the read bound.
    #[error("no prompt after {lines} reads in reply to `{command}`")]
    IncompleteResponse {
        /// Command line that was sent.
        command: String,
        /// Read attempts made.
        lines: usize,
        /// Text received before giving up.
        partial: String,
    },

    /// The device answered with a severity other than OK.
    #[error("`{command}` failed with {severity}: {response}")]
    Device {
        command: String,
        severity: Severity,
        /// Full reply text.
        response: String,
    },

    /// The reply could not be decoded.
    #[error("cannot decode reply to `{command}`: {source}")]
    Decode {
        command: String,
        #[source]
        source: DecodeError,
    },

    /// The command was rejected before reaching the device.
    #[error("invalid command: {0}")]
    Command(#[from] CommandError),

    /// A sensor register read failed.
    #[error("{device}: {step} of the {register} register failed: {source}")]
    Sensor {
        device: &'static str,
        register: &'static str,
        step: SensorStep,
        #[source]
        source: Box<LinkError>,
    },

    /// The configuration is invalid or unreadable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LinkError {
    pub(crate) fn device(command: &Command, response: &Response) -> Self {
        LinkError::Device {
            command: command.to_command_string(),
            severity: response.severity(),
            response: response.full().to_string(),
        }
    }

    pub(crate) fn decode(command: &Command, source: DecodeError) -> Self {
        LinkError::Decode {
            command: command.to_command_string(),
            source,
        }
    }

    /// True for the missing-prompt framing fault.
    pub fn is_framing_fault(&self) -> bool {
        matches!(self, LinkError::IncompleteResponse { .. })
    }

    /// Severity reported by the device, if the device answered.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            LinkError::Device { severity, .. } => Some(*severity),
            LinkError::Sensor { source, .. } => source.severity(),
            _ => None,
        }
    }
}

/// Result type for link operations.
pub type LinkResult<T> = Result<T, LinkError>;
