//! Reply parsing for the firmware shell.
//!
//! Every reply starts with a severity word:
//! - `OK` for success, optionally followed by data (`OK. Data: 0x12 0x34`)
//! - `WARNING` when the command ran but something looks off
//! - `ERROR` / `FATAL` when the command failed
//!
//! Anything else is classified as [`Severity::Unknown`].

use std::fmt;

use crate::constants::*;
use crate::error::{DecodeError, DecodeResult};
use crate::scanner::ReplyScanner;

/// Device-reported outcome of a command.
///
/// Ordered so that `Ok < Warning < Error < Fatal < Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Ok,
    Warning,
    Error,
    Fatal,
    Unknown,
}

impl Severity {
    const PREFIXES: [(Severity, &'static str); 4] = [
        (Severity::Ok, "OK"),
        (Severity::Warning, "WARNING"),
        (Severity::Error, "ERROR"),
        (Severity::Fatal, "FATAL"),
    ];

    /// Classify a reply by its leading severity word.
    pub fn classify(reply: &str) -> Self {
        Self::PREFIXES
            .iter()
            .find(|(_, prefix)| reply.starts_with(*prefix))
            .map(|(severity, _)| *severity)
            .unwrap_or(Severity::Unknown)
    }

    /// The word a reply of this severity starts with.
    pub fn prefix(&self) -> Option<&'static str> {
        Self::PREFIXES
            .iter()
            .find(|(severity, _)| severity == self)
            .map(|(_, prefix)| *prefix)
    }

    pub fn is_ok(&self) -> bool {
        *self == Severity::Ok
    }

    pub fn as_str(&self) -> &'static str {
        self.prefix().unwrap_or("UNKNOWN")
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete reply: the text between the echo and the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    severity: Severity,
    text: String,
}

impl Response {
    /// Parse accumulated reply text.
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        Response {
            severity: Severity::classify(&text),
            text,
        }
    }

    /// The reply produced without hardware.
    pub fn simulated() -> Self {
        Self::parse(SIMULATED_REPLY)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_ok(&self) -> bool {
        self.severity.is_ok()
    }

    /// Whole reply without trailing line terminators.
    pub fn full(&self) -> &str {
        self.text.trim_end_matches(['\n', '\r'])
    }

    /// Reply without the severity word and the separator character after it.
    pub fn body(&self) -> &str {
        let rest = match self.severity.prefix() {
            Some(prefix) => {
                let mut chars = self.text[prefix.len()..].chars();
                chars.next();
                chars.as_str()
            }
            None => self.text.as_str(),
        };
        rest.trim()
    }

    /// A scanner over the body.
    pub fn scanner(&self) -> ReplyScanner<'_> {
        ReplyScanner::new(self.body())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full())
    }
}

// ========== Decoded Payloads ==========

/// State of one user button as reported by `button <index>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonStatus {
    /// 1 while the button is held down.
    pub status: i64,
    /// Number of presses since reset.
    pub pressed: i64,
    /// Number of releases since reset.
    pub released: i64,
}

impl ButtonStatus {
    /// Parse a button reply body.
    ///
    /// Expected format: `Button 2 status: 1, pressed count: 4, released count: 3`
    pub fn parse(body: &str) -> DecodeResult<Self> {
        let scanner = ReplyScanner::new(body);
        let status = scanner.between(BUTTON_STATUS_MARKER, BUTTON_PRESSED_MARKER)?;
        let pressed = scanner.between(BUTTON_PRESSED_MARKER, BUTTON_RELEASED_MARKER)?;
        let released = scanner.after(BUTTON_RELEASED_MARKER)?;

        let field = |text: &str, marker: &'static str| {
            ReplyScanner::new(&text.replace(',', "")).first_integer(marker)
        };
        Ok(ButtonStatus {
            status: field(status, BUTTON_STATUS_MARKER)?,
            pressed: field(pressed, BUTTON_PRESSED_MARKER)?,
            released: field(released.as_str(), BUTTON_RELEASED_MARKER)?,
        })
    }
}

/// One `adc` sample: joystick and accelerometer raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdcReading {
    pub joystick_x: i64,
    pub joystick_y: i64,
    pub accel_x: i64,
    pub accel_y: i64,
    pub accel_z: i64,
}

impl AdcReading {
    /// Parse an `adc` reply body.
    ///
    /// Expected format:
    /// `Joystick: X = 2048 Y = 2047 ; Accelerometer: X = 2050 Y = 2045 Z = 2900`
    pub fn parse(body: &str) -> DecodeResult<Self> {
        let values = ReplyScanner::new(body).decimal_digits()?;
        match values[..] {
            [joystick_x, joystick_y, accel_x, accel_y, accel_z] => Ok(AdcReading {
                joystick_x,
                joystick_y,
                accel_x,
                accel_y,
                accel_z,
            }),
            _ => Err(DecodeError::TokenCount {
                expected: ADC_VALUE_COUNT,
                actual: values.len(),
            }),
        }
    }

    pub fn joystick(&self) -> (i64, i64) {
        (self.joystick_x, self.joystick_y)
    }

    pub fn accelerometer(&self) -> (i64, i64, i64) {
        (self.accel_x, self.accel_y, self.accel_z)
    }
}

/// Parse the reply of `led` without argument.
pub fn parse_led_value(body: &str) -> DecodeResult<u8> {
    let value = ReplyScanner::new(body)
        .after(LED_VALUE_MARKER)?
        .first_integer(LED_VALUE_MARKER)?;
    u8::try_from(value).map_err(|_| DecodeError::ValueOutOfRange(value))
}

/// Parse the data tokens after `Data:` of a bus read.
pub fn parse_data<T: TryFrom<i64>>(body: &str) -> DecodeResult<Vec<T>> {
    ReplyScanner::new(body).after(DATA_MARKER)?.values()
}

/// Parse the addresses reported by `i2c-det`.
pub fn parse_detected_addresses(body: &str) -> DecodeResult<Vec<u8>> {
    ReplyScanner::new(body).after(I2C_DETECT_MARKER)?.values()
}
