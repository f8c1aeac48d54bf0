//! Link configuration.
//!
//! Configuration can be built in code or loaded from YAML:
//!
//! ```yaml
//! device: /dev/ttyUSB0
//! serial:
//!   baud_rate: 115200
//! channel:
//!   max_lines: 100
//!   poll_timeout_us: 100
//! ```
//!
//! Missing fields fall back to their defaults. An empty or missing `device`
//! selects the simulated transport.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, LinkResult};

/// Default serial device of the board's debug UART.
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Read bound of batch sessions, which may see long multi-line replies.
pub const BATCH_MAX_LINES: usize = 200;
/// Poll timeout of batch sessions in microseconds.
pub const BATCH_POLL_TIMEOUT_US: u64 = 50_000;

/// Parity of the host serial port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialParity {
    #[default]
    None,
    Even,
    Odd,
}

/// Host serial port settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: SerialParity,
    pub stop_bits: u8,
    /// Write timeout in milliseconds.
    pub write_timeout_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        SerialSettings {
            baud_rate: 115_200,
            data_bits: 8,
            parity: SerialParity::None,
            stop_bits: 1,
            write_timeout_ms: 2_000,
        }
    }
}

impl SerialSettings {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn validate(&self) -> LinkResult<()> {
        if !(5..=8).contains(&self.data_bits) {
            return Err(LinkError::Config(format!(
                "data_bits must be 5..=8, got {}",
                self.data_bits
            )));
        }
        if !(1..=2).contains(&self.stop_bits) {
            return Err(LinkError::Config(format!(
                "stop_bits must be 1 or 2, got {}",
                self.stop_bits
            )));
        }
        if self.baud_rate == 0 {
            return Err(LinkError::Config("baud_rate must not be 0".to_string()));
        }
        Ok(())
    }
}

/// Command channel timing and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Read attempts allowed for one command, echo included.
    pub max_lines: usize,
    /// Read timeout while waiting for the echo, in microseconds.
    pub response_timeout_us: u64,
    /// Read timeout while collecting the reply, in microseconds.
    pub poll_timeout_us: u64,
    /// Poll timeout for slow commands (I2C quick command and bus scan).
    pub extended_timeout_us: u64,
    /// 0 = quiet .. 4 = everything. At 3 and above full replies are logged.
    pub verbosity: u8,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            max_lines: 100,
            response_timeout_us: 50_000,
            poll_timeout_us: 100,
            extended_timeout_us: 20_000,
            verbosity: 1,
        }
    }
}

impl ChannelConfig {
    /// These settings with the read bound and poll timeout of batch sessions.
    pub fn for_batch(&self) -> Self {
        ChannelConfig {
            max_lines: BATCH_MAX_LINES,
            poll_timeout_us: BATCH_POLL_TIMEOUT_US,
            ..self.clone()
        }
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_micros(self.response_timeout_us)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_micros(self.poll_timeout_us)
    }

    pub fn extended_timeout(&self) -> Duration {
        Duration::from_micros(self.extended_timeout_us)
    }

    pub fn validate(&self) -> LinkResult<()> {
        if self.max_lines == 0 {
            return Err(LinkError::Config("max_lines must be at least 1".to_string()));
        }
        if self.verbosity > 4 {
            return Err(LinkError::Config(format!(
                "verbosity must be 0..=4, got {}",
                self.verbosity
            )));
        }
        Ok(())
    }
}

/// Complete link configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Serial device path. `None` or empty selects the simulated transport.
    pub device: Option<String>,
    pub serial: SerialSettings,
    pub channel: ChannelConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            device: Some(DEFAULT_DEVICE.to_string()),
            serial: SerialSettings::default(),
            channel: ChannelConfig::default(),
        }
    }
}

impl LinkConfig {
    /// Parse a YAML configuration.
    pub fn from_yaml_str(text: &str) -> LinkResult<Self> {
        let config: LinkConfig =
            serde_yaml::from_str(text).map_err(|e| LinkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> LinkResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| LinkError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> LinkResult<()> {
        self.serial.validate()?;
        self.channel.validate()
    }

    /// Device path, with an empty path treated as absent.
    pub fn device_path(&self) -> Option<&str> {
        self.device.as_deref().filter(|path| !path.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.device_path(), Some(DEFAULT_DEVICE));
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.channel.max_lines, 100);
        assert_eq!(config.channel.poll_timeout(), Duration::from_micros(100));
        assert_eq!(config.channel.response_timeout(), Duration::from_millis(50));
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = r#"
device: /dev/ttyACM0
channel:
  max_lines: 200
  verbosity: 3
"#;
        let config = LinkConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.device_path(), Some("/dev/ttyACM0"));
        assert_eq!(config.channel.max_lines, 200);
        assert_eq!(config.channel.verbosity, 3);
        assert_eq!(config.channel.poll_timeout_us, 100);
        assert_eq!(config.serial, SerialSettings::default());
    }

    #[test]
    fn test_empty_device_is_simulated() {
        let config = LinkConfig::from_yaml_str("device: \"\"\n").unwrap();
        assert_eq!(config.device_path(), None);
        let config = LinkConfig::from_yaml_str("device: null\n").unwrap();
        assert_eq!(config.device_path(), None);
    }

    #[test]
    fn test_invalid_config() {
        assert!(LinkConfig::from_yaml_str("channel:\n  max_lines: 0\n").is_err());
        assert!(LinkConfig::from_yaml_str("serial:\n  data_bits: 9\n").is_err());
        assert!(LinkConfig::from_yaml_str("serial:\n  parity: mark\n").is_err());
    }

    #[test]
    fn test_batch_settings() {
        let config = ChannelConfig {
            verbosity: 3,
            ..Default::default()
        };
        let batch = config.for_batch();
        assert_eq!(batch.max_lines, 200);
        assert_eq!(batch.poll_timeout(), Duration::from_millis(50));
        assert_eq!(batch.verbosity, 3);
        assert_eq!(batch.response_timeout(), config.response_timeout());
    }
}
