//! Error types for the shell protocol.

use thiserror::Error;

/// Errors raised while decoding a reply body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The reply did not contain the expected marker.
    #[error("marker `{0}` not found in reply")]
    MissingMarker(&'static str),

    /// A token could not be parsed as an integer literal.
    #[error("invalid integer literal `{0}`")]
    InvalidInteger(String),

    /// The reply carried a different number of values than expected.
    #[error("expected {expected} values, got {actual}")]
    TokenCount {
        /// Number of values the decoder needs.
        expected: usize,
        /// Number of values found in the reply.
        actual: usize,
    },

    /// A marker was found but no value followed it.
    #[error("no value after marker `{0}`")]
    MissingValue(&'static str),

    /// A value does not fit the target type.
    #[error("value {0} out of range")]
    ValueOutOfRange(i64),
}

/// Errors raised while building a command, before any device access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A numeric parameter is outside of its valid range.
    #[error("{name} {value} outside of valid range {min}..={max}")]
    OutOfRange {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: i64,
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },

    /// A write was requested without any data.
    #[error("at least one data {unit} must be provided")]
    EmptyData {
        /// `"byte"` or `"word"`.
        unit: &'static str,
    },

    /// A read was requested for zero items.
    #[error("at least one data {unit} must be read")]
    ZeroCount {
        /// `"byte"` or `"word"`.
        unit: &'static str,
    },

    /// Command lines are terminated by the channel and must not carry their own.
    #[error("command contains a line break: {0:?}")]
    EmbeddedNewline(String),
}

impl CommandError {
    pub(crate) fn check_range(name: &'static str, value: i64, min: i64, max: i64) -> Result<(), Self> {
        if value < min || value > max {
            return Err(CommandError::OutOfRange { name, value, min, max });
        }
        Ok(())
    }
}

/// Result type for reply decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for command building.
pub type CommandResult<T> = Result<T, CommandError>;
