//! Commands understood by the hardware demo firmware.
//!
//! The shell supports several categories of commands:
//! - GPIO commands (`led`, `button`, `rgb`)
//! - Analog sampling (`adc`)
//! - Bus transfers (`i2c`, `i2c-det`, `ssi-set`, `ssi`, `uart-s`, `uart`)
//! - Display drawing (`lcd ...`)
//! - Firmware information (`info`, `help`)
//!
//! Parameters are validated when a command is built, so a rejected command
//! never reaches the device.

use std::fmt::Write as _;

use crate::codec::LineCodec;
use crate::constants::*;
use crate::error::{CommandError, CommandResult};

// ========== I2C ==========

/// Access mode bit field of the `i2c` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I2cAccessMode {
    /// Read from the slave (bit 0x01).
    pub read: bool,
    /// Start with a repeated start condition (bit 0x02).
    pub repeated_start: bool,
    /// Do not release the bus with a stop condition (bit 0x04).
    pub no_stop: bool,
    /// Send only the address byte and R/W bit (bit 0x08).
    pub quick_command: bool,
}

impl I2cAccessMode {
    pub const READ: u8 = 0x01;
    pub const REPEATED_START: u8 = 0x02;
    pub const NO_STOP: u8 = 0x04;
    pub const QUICK_COMMAND: u8 = 0x08;

    /// Mode of a data write.
    pub fn write(repeated_start: bool, stop: bool) -> Self {
        I2cAccessMode {
            read: false,
            repeated_start,
            no_stop: !stop,
            quick_command: false,
        }
    }

    /// Mode of a data read.
    pub fn read(repeated_start: bool, stop: bool) -> Self {
        I2cAccessMode {
            read: true,
            repeated_start,
            no_stop: !stop,
            quick_command: false,
        }
    }

    /// Mode of a quick command. Quick commands always end with a stop.
    pub fn quick(read: bool, repeated_start: bool) -> Self {
        I2cAccessMode {
            read,
            repeated_start,
            no_stop: false,
            quick_command: true,
        }
    }

    /// The bit field as sent to the firmware.
    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.read {
            bits |= Self::READ;
        }
        if self.repeated_start {
            bits |= Self::REPEATED_START;
        }
        if self.no_stop {
            bits |= Self::NO_STOP;
        }
        if self.quick_command {
            bits |= Self::QUICK_COMMAND;
        }
        bits
    }

    pub fn from_bits(bits: u8) -> Self {
        I2cAccessMode {
            read: bits & Self::READ != 0,
            repeated_start: bits & Self::REPEATED_START != 0,
            no_stop: bits & Self::NO_STOP != 0,
            quick_command: bits & Self::QUICK_COMMAND != 0,
        }
    }
}

// ========== SSI ==========

/// Frame format of an SSI port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SsiFrameFormat {
    #[default]
    SpiMode0,
    SpiMode1,
    SpiMode2,
    SpiMode3,
    TexasInstruments,
    MicroWire,
}

impl SsiFrameFormat {
    pub const ALL: [SsiFrameFormat; 6] = [
        SsiFrameFormat::SpiMode0,
        SsiFrameFormat::SpiMode1,
        SsiFrameFormat::SpiMode2,
        SsiFrameFormat::SpiMode3,
        SsiFrameFormat::TexasInstruments,
        SsiFrameFormat::MicroWire,
    ];

    /// Look up a frame format by its firmware index.
    pub fn from_index(index: usize) -> CommandResult<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(CommandError::OutOfRange {
                name: "SSI mode",
                value: index as i64,
                min: 0,
                max: Self::ALL.len() as i64 - 1,
            })
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn description(&self) -> &'static str {
        match self {
            SsiFrameFormat::SpiMode0 => "SPI, CPOL=0, CPHA=0",
            SsiFrameFormat::SpiMode1 => "SPI, CPOL=0, CPHA=1",
            SsiFrameFormat::SpiMode2 => "SPI, CPOL=1, CPHA=0",
            SsiFrameFormat::SpiMode3 => "SPI, CPOL=1, CPHA=1",
            SsiFrameFormat::TexasInstruments => "TI frame format",
            SsiFrameFormat::MicroWire => "National MicroWire",
        }
    }
}

/// Parameters of `ssi-set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SsiSettings {
    frequency: u32,
    format: SsiFrameFormat,
    data_width: u8,
}

impl SsiSettings {
    pub fn new(frequency: u32, format: SsiFrameFormat, data_width: u8) -> CommandResult<Self> {
        CommandError::check_range(
            "SSI frequency",
            frequency.into(),
            SSI_FREQUENCY_MIN.into(),
            SSI_FREQUENCY_MAX.into(),
        )?;
        CommandError::check_range(
            "SSI data width",
            data_width.into(),
            SSI_DATA_WIDTH_MIN.into(),
            SSI_DATA_WIDTH_MAX.into(),
        )?;
        Ok(SsiSettings {
            frequency,
            format,
            data_width,
        })
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn format(&self) -> SsiFrameFormat {
        self.format
    }

    pub fn data_width(&self) -> u8 {
        self.data_width
    }
}

impl Default for SsiSettings {
    fn default() -> Self {
        SsiSettings {
            frequency: 1_000_000,
            format: SsiFrameFormat::SpiMode0,
            data_width: 8,
        }
    }
}

// ========== UART ==========

/// Parity setting of a UART port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UartParity {
    #[default]
    None,
    Even,
    Odd,
    One,
    Zero,
}

impl UartParity {
    pub const ALL: [UartParity; 5] = [
        UartParity::None,
        UartParity::Even,
        UartParity::Odd,
        UartParity::One,
        UartParity::Zero,
    ];

    /// Look up a parity setting by its firmware index.
    pub fn from_index(index: usize) -> CommandResult<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(CommandError::OutOfRange {
                name: "UART parity",
                value: index as i64,
                min: 0,
                max: Self::ALL.len() as i64 - 1,
            })
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UartParity::None => "none",
            UartParity::Even => "even",
            UartParity::Odd => "odd",
            UartParity::One => "one",
            UartParity::Zero => "zero",
        }
    }
}

/// Parameters of `uart-s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartSettings {
    baud_rate: u32,
    loopback: bool,
    parity: UartParity,
}

impl UartSettings {
    pub fn new(baud_rate: u32, loopback: bool, parity: UartParity) -> CommandResult<Self> {
        CommandError::check_range(
            "UART baud rate",
            baud_rate.into(),
            UART_BAUD_MIN.into(),
            UART_BAUD_MAX.into(),
        )?;
        Ok(UartSettings {
            baud_rate,
            loopback,
            parity,
        })
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn loopback(&self) -> bool {
        self.loopback
    }

    pub fn parity(&self) -> UartParity {
        self.parity
    }
}

impl Default for UartSettings {
    fn default() -> Self {
        UartSettings {
            baud_rate: 115_200,
            loopback: false,
            parity: UartParity::None,
        }
    }
}

// ========== LCD ==========

/// Drawing commands of the on-board LCD. Colors are `0xRRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LcdCommand {
    Help,
    Info,
    Clear {
        color: u32,
    },
    Orient {
        orientation: u8,
    },
    Pixel {
        x: i32,
        y: i32,
        color: u32,
    },
    Line {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: u32,
    },
    Rect {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: u32,
        fill: bool,
    },
    Circle {
        x: i32,
        y: i32,
        radius: u32,
        color: u32,
        fill: bool,
    },
    Text {
        x: i32,
        y: i32,
        color: u32,
        center: bool,
        text: String,
    },
}

impl LcdCommand {
    pub fn orient(orientation: u8) -> CommandResult<Self> {
        CommandError::check_range(
            "LCD orientation",
            orientation.into(),
            0,
            i64::from(LCD_ORIENTATIONS) - 1,
        )?;
        Ok(LcdCommand::Orient { orientation })
    }

    pub fn text(x: i32, y: i32, color: u32, center: bool, text: &str) -> CommandResult<Self> {
        reject_line_breaks(text)?;
        Ok(LcdCommand::Text {
            x,
            y,
            color,
            center,
            text: text.to_string(),
        })
    }

    fn to_command_string(&self) -> String {
        match self {
            LcdCommand::Help => "lcd help".to_string(),
            LcdCommand::Info => "lcd info".to_string(),
            LcdCommand::Clear { color } => format!("lcd clear 0x{:06x}", color),
            LcdCommand::Orient { orientation } => format!("lcd orient {}", orientation),
            LcdCommand::Pixel { x, y, color } => format!("lcd pixel {} {} 0x{:06x}", x, y, color),
            LcdCommand::Line {
                x1,
                y1,
                x2,
                y2,
                color,
            } => format!("lcd line {} {} {} {} 0x{:06x}", x1, y1, x2, y2, color),
            LcdCommand::Rect {
                x1,
                y1,
                x2,
                y2,
                color,
                fill,
            } => format!(
                "lcd rect {} {} {} {} 0x{:06x} {}",
                x1,
                y1,
                x2,
                y2,
                color,
                u8::from(*fill)
            ),
            LcdCommand::Circle {
                x,
                y,
                radius,
                color,
                fill,
            } => format!(
                "lcd circle {} {} {} 0x{:06x} {}",
                x,
                y,
                radius,
                color,
                u8::from(*fill)
            ),
            LcdCommand::Text {
                x,
                y,
                color,
                center,
                text,
            } => format!(
                "lcd text {} {} 0x{:06x} {} {}",
                x,
                y,
                color,
                u8::from(*center),
                text
            ),
        }
    }
}

// ========== Commands ==========

/// A shell command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the firmware commands (`help`).
    Help,
    /// Firmware and board information (`info`).
    Info,
    /// Set the four user LEDs (`led 0x..`).
    LedSet { value: u8 },
    /// Query the user LEDs (`led`).
    LedGet,
    /// Query one user button (`button <index>`).
    Button { index: u8 },
    /// Set the RGB LED (`rgb 0xRRGGBB`).
    Rgb { red: u8, green: u8, blue: u8 },
    /// Sample joystick and accelerometer (`adc`).
    Adc,
    /// Write data bytes to an I2C slave.
    I2cWrite {
        port: u8,
        address: u8,
        mode: I2cAccessMode,
        data: Vec<u8>,
    },
    /// Read data bytes from an I2C slave.
    I2cRead {
        port: u8,
        address: u8,
        mode: I2cAccessMode,
        count: usize,
    },
    /// Address-only I2C transaction.
    I2cQuick {
        port: u8,
        address: u8,
        mode: I2cAccessMode,
    },
    /// Scan an I2C bus for slaves (`i2c-det <port>`).
    I2cDetect { port: u8 },
    /// Configure an SSI port (`ssi-set`).
    SsiSetup { port: u8, settings: SsiSettings },
    SsiWrite { port: u8, data: Vec<u16> },
    SsiRead { port: u8, count: usize },
    /// Read everything in the receive FIFO (`ssi <port> 1`).
    SsiReadAll { port: u8 },
    /// Configure a UART port (`uart-s`).
    UartSetup { port: u8, settings: UartSettings },
    UartWrite { port: u8, data: Vec<u8> },
    UartRead { port: u8, count: usize },
    Lcd(LcdCommand),
    /// A free-form command line.
    Raw(String),
}

impl Command {
    /// Set the LEDs; only the low four bits are used.
    pub fn led_set(value: u8) -> Self {
        Command::LedSet {
            value: value & LED_MASK,
        }
    }

    pub fn button(index: u8) -> CommandResult<Self> {
        CommandError::check_range(
            "button index",
            index.into(),
            0,
            i64::from(BUTTON_COUNT) - 1,
        )?;
        Ok(Command::Button { index })
    }

    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Command::Rgb { red, green, blue }
    }

    pub fn i2c_write(port: u8, address: u8, mode: I2cAccessMode, data: &[u8]) -> CommandResult<Self> {
        if data.is_empty() {
            return Err(CommandError::EmptyData { unit: "byte" });
        }
        Ok(Command::I2cWrite {
            port,
            address,
            mode,
            data: data.to_vec(),
        })
    }

    pub fn i2c_read(port: u8, address: u8, mode: I2cAccessMode, count: usize) -> CommandResult<Self> {
        check_count(count, "byte", Some(MAX_BYTE_COUNT))?;
        Ok(Command::I2cRead {
            port,
            address,
            mode,
            count,
        })
    }

    pub fn ssi_write(port: u8, data: &[u16]) -> CommandResult<Self> {
        if data.is_empty() {
            return Err(CommandError::EmptyData { unit: "word" });
        }
        Ok(Command::SsiWrite {
            port,
            data: data.to_vec(),
        })
    }

    pub fn ssi_read(port: u8, count: usize) -> CommandResult<Self> {
        check_count(count, "word", None)?;
        Ok(Command::SsiRead { port, count })
    }

    pub fn uart_write(port: u8, data: &[u8]) -> CommandResult<Self> {
        if data.is_empty() {
            return Err(CommandError::EmptyData { unit: "byte" });
        }
        Ok(Command::UartWrite {
            port,
            data: data.to_vec(),
        })
    }

    pub fn uart_read(port: u8, count: usize) -> CommandResult<Self> {
        check_count(count, "byte", Some(MAX_BYTE_COUNT))?;
        Ok(Command::UartRead { port, count })
    }

    /// Read everything the UART port has buffered.
    pub fn uart_read_all(port: u8) -> Self {
        Command::UartRead {
            port,
            count: MAX_BYTE_COUNT,
        }
    }

    /// A free-form command line. Line breaks are rejected.
    pub fn raw(line: &str) -> CommandResult<Self> {
        reject_line_breaks(line)?;
        Ok(Command::Raw(line.to_string()))
    }

    /// Convert the command to its text representation.
    pub fn to_command_string(&self) -> String {
        match self {
            Command::Help => "help".to_string(),
            Command::Info => "info".to_string(),
            Command::LedSet { value } => format!("led 0x{:02x}", value & LED_MASK),
            Command::LedGet => "led".to_string(),
            Command::Button { index } => format!("button {}", index),
            Command::Rgb { red, green, blue } => {
                let color = (u32::from(*red) << 16) | (u32::from(*green) << 8) | u32::from(*blue);
                format!("rgb 0x{:06x}", color)
            }
            Command::Adc => "adc".to_string(),

            // I2C
            Command::I2cWrite {
                port,
                address,
                mode,
                data,
            } => {
                let mut cmd = format!("i2c {} 0x{:02x} 0x{:02x}", port, address & 0x7f, mode.bits());
                push_hex(&mut cmd, data.iter().map(|b| u32::from(*b)));
                cmd
            }
            Command::I2cRead {
                port,
                address,
                mode,
                count,
            } => format!(
                "i2c {} 0x{:02x} 0x{:02x} {}",
                port,
                address & 0x7f,
                mode.bits(),
                count
            ),
            Command::I2cQuick {
                port,
                address,
                mode,
            } => format!("i2c {} 0x{:02x} 0x{:02x}", port, address & 0x7f, mode.bits()),
            Command::I2cDetect { port } => format!("i2c-det {}", port),

            // SSI
            Command::SsiSetup { port, settings } => format!(
                "ssi-set {} {} {} {}",
                port,
                settings.frequency(),
                settings.format().index(),
                settings.data_width()
            ),
            Command::SsiWrite { port, data } => {
                let mut cmd = format!("ssi {} 0", port);
                push_hex(&mut cmd, data.iter().map(|w| u32::from(*w)));
                cmd
            }
            Command::SsiRead { port, count } => format!("ssi {} 1 {}", port, count),
            Command::SsiReadAll { port } => format!("ssi {} 1", port),

            // UART
            Command::UartSetup { port, settings } => format!(
                "uart-s {} {} {} {}",
                port,
                settings.baud_rate(),
                u8::from(settings.loopback()),
                settings.parity().index()
            ),
            Command::UartWrite { port, data } => {
                let mut cmd = format!("uart {} 0", port);
                push_hex(&mut cmd, data.iter().map(|b| u32::from(*b)));
                cmd
            }
            Command::UartRead { port, count } => format!("uart {} 1 {}", port, count),

            Command::Lcd(lcd) => lcd.to_command_string(),
            Command::Raw(line) => line.clone(),
        }
    }

    /// Encode the command for sending.
    pub fn encode(&self) -> Vec<u8> {
        LineCodec::encode_command(&self.to_command_string())
    }
}

impl From<LcdCommand> for Command {
    fn from(cmd: LcdCommand) -> Self {
        Command::Lcd(cmd)
    }
}

fn push_hex(cmd: &mut String, values: impl Iterator<Item = u32>) {
    for value in values {
        let _ = write!(cmd, " 0x{:02x}", value);
    }
}

fn check_count(count: usize, unit: &'static str, max: Option<usize>) -> CommandResult<()> {
    if count == 0 {
        return Err(CommandError::ZeroCount { unit });
    }
    if let Some(max) = max {
        CommandError::check_range("count", count as i64, 1, max as i64)?;
    }
    Ok(())
}

fn reject_line_breaks(text: &str) -> CommandResult<()> {
    if text.contains(['\r', '\n']) {
        return Err(CommandError::EmbeddedNewline(text.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpio_commands() {
        assert_eq!(Command::led_set(0x05).to_command_string(), "led 0x05");
        assert_eq!(Command::led_set(0xff).to_command_string(), "led 0x0f");
        assert_eq!(Command::LedGet.to_command_string(), "led");
        assert_eq!(Command::button(3).unwrap().to_command_string(), "button 3");
        assert_eq!(
            Command::rgb(0x12, 0x34, 0x56).to_command_string(),
            "rgb 0x123456"
        );
    }

    #[test]
    fn test_button_index_checked() {
        assert_eq!(
            Command::button(4),
            Err(CommandError::OutOfRange {
                name: "button index",
                value: 4,
                min: 0,
                max: 3
            })
        );
    }

    #[test]
    fn test_i2c_access_mode_bits() {
        assert_eq!(I2cAccessMode::quick(true, false).bits(), 0x09);
        assert_eq!(I2cAccessMode::write(true, false).bits(), 0x06);
        assert_eq!(I2cAccessMode::write(false, true).bits(), 0x00);
        assert_eq!(I2cAccessMode::read(true, true).bits(), 0x03);
        assert_eq!(I2cAccessMode::from_bits(0x06), I2cAccessMode::write(true, false));
    }

    #[test]
    fn test_i2c_commands() {
        let write = Command::i2c_write(2, 0xc0, I2cAccessMode::write(false, true), &[0x02, 0x75, 0x00])
            .unwrap();
        assert_eq!(write.to_command_string(), "i2c 2 0x40 0x00 0x02 0x75 0x00");

        let read = Command::i2c_read(2, 0x44, I2cAccessMode::read(true, true), 2).unwrap();
        assert_eq!(read.to_command_string(), "i2c 2 0x44 0x03 2");

        let quick = Command::I2cQuick {
            port: 2,
            address: 0x40,
            mode: I2cAccessMode::quick(true, false),
        };
        assert_eq!(quick.to_command_string(), "i2c 2 0x40 0x09");
        assert_eq!(Command::I2cDetect { port: 2 }.to_command_string(), "i2c-det 2");
    }

    #[test]
    fn test_i2c_command_validation() {
        let mode = I2cAccessMode::default();
        assert_eq!(
            Command::i2c_write(2, 0x40, mode, &[]),
            Err(CommandError::EmptyData { unit: "byte" })
        );
        assert_eq!(
            Command::i2c_read(2, 0x40, mode, 0),
            Err(CommandError::ZeroCount { unit: "byte" })
        );
        assert!(Command::i2c_read(2, 0x40, mode, 256).is_err());
    }

    #[test]
    fn test_ssi_commands() {
        let setup = Command::SsiSetup {
            port: 2,
            settings: SsiSettings::default(),
        };
        assert_eq!(setup.to_command_string(), "ssi-set 2 1000000 0 8");
        assert_eq!(
            Command::ssi_write(2, &[0x12, 0x1234]).unwrap().to_command_string(),
            "ssi 2 0 0x12 0x1234"
        );
        assert_eq!(Command::ssi_read(2, 3).unwrap().to_command_string(), "ssi 2 1 3");
        assert_eq!(Command::SsiReadAll { port: 2 }.to_command_string(), "ssi 2 1");
    }

    #[test]
    fn test_ssi_settings_validation() {
        assert!(SsiSettings::new(1_999, SsiFrameFormat::SpiMode0, 8).is_err());
        assert!(SsiSettings::new(50_000_001, SsiFrameFormat::SpiMode0, 8).is_err());
        assert!(SsiSettings::new(1_000_000, SsiFrameFormat::SpiMode0, 3).is_err());
        assert!(SsiSettings::new(1_000_000, SsiFrameFormat::SpiMode0, 17).is_err());
        assert!(SsiSettings::new(2_000, SsiFrameFormat::MicroWire, 16).is_ok());
        assert!(SsiFrameFormat::from_index(6).is_err());
        assert_eq!(
            SsiFrameFormat::from_index(4).unwrap().description(),
            "TI frame format"
        );
    }

    #[test]
    fn test_uart_commands() {
        let settings = UartSettings::new(9600, true, UartParity::Even).unwrap();
        let setup = Command::UartSetup { port: 6, settings };
        assert_eq!(setup.to_command_string(), "uart-s 6 9600 1 1");
        assert_eq!(
            Command::uart_write(6, b"Hi").unwrap().to_command_string(),
            "uart 6 0 0x48 0x69"
        );
        assert_eq!(Command::uart_read(6, 4).unwrap().to_command_string(), "uart 6 1 4");
        assert_eq!(Command::uart_read_all(6).to_command_string(), "uart 6 1 255");
    }

    #[test]
    fn test_uart_settings_validation() {
        assert!(UartSettings::new(149, false, UartParity::None).is_err());
        assert!(UartSettings::new(15_000_001, false, UartParity::None).is_err());
        assert!(UartParity::from_index(5).is_err());
        assert_eq!(UartParity::from_index(3), Ok(UartParity::One));
    }

    #[test]
    fn test_lcd_commands() {
        let cmd: Command = LcdCommand::Clear { color: 0xff0000 }.into();
        assert_eq!(cmd.to_command_string(), "lcd clear 0xff0000");
        let cmd: Command = LcdCommand::orient(2).unwrap().into();
        assert_eq!(cmd.to_command_string(), "lcd orient 2");
        assert!(LcdCommand::orient(4).is_err());

        let rect = LcdCommand::Rect {
            x1: 0,
            y1: 0,
            x2: 10,
            y2: 20,
            color: 0x00ff00,
            fill: true,
        };
        assert_eq!(
            Command::Lcd(rect).to_command_string(),
            "lcd rect 0 0 10 20 0x00ff00 1"
        );

        let text = LcdCommand::text(64, 64, 0xffffff, true, "# Hello").unwrap();
        assert_eq!(
            Command::Lcd(text).to_command_string(),
            "lcd text 64 64 0xffffff 1 # Hello"
        );
    }

    #[test]
    fn test_raw_command() {
        assert_eq!(Command::raw("info").unwrap().encode(), b"info\r");
        assert!(Command::raw("info\r\nled").is_err());
    }
}
