//! Protocol constants shared by the firmware shell and the host.

/// Prompt printed by the firmware after every reply. It carries no newline.
pub const PROMPT: &str = "> ";

/// Terminator appended to every command line.
pub const COMMAND_TERMINATOR: u8 = b'\r';

/// Reply produced by the simulated transport for every command.
pub const SIMULATED_REPLY: &str = "OK (simulated hardware access)";

/// Body of [`SIMULATED_REPLY`].
pub const SIMULATED_BODY: &str = "(simulated hardware access)";

// ========== Reply Markers ==========

/// Marker preceding the data tokens of a bus read.
pub const DATA_MARKER: &str = "Data:";

/// Marker preceding the LED value of `led` without argument.
pub const LED_VALUE_MARKER: &str = "Current LED value:";

/// Marker preceding the addresses reported by `i2c-det`.
pub const I2C_DETECT_MARKER: &str = "I2C device(s) found at slave address:";

/// Start of the ERROR body a bus read returns when fewer bytes were pending
/// than requested. The bytes that were read still follow [`DATA_MARKER`].
pub const SHORT_READ_MARKER: &str = "Could only read";

pub const BUTTON_STATUS_MARKER: &str = "status:";
pub const BUTTON_PRESSED_MARKER: &str = "pressed count:";
pub const BUTTON_RELEASED_MARKER: &str = "released count:";

// ========== Parameter Limits ==========

/// Number of user buttons on the board.
pub const BUTTON_COUNT: u8 = 4;

/// Mask of the four user LEDs.
pub const LED_MASK: u8 = 0x0f;

/// Number of values reported by `adc`.
pub const ADC_VALUE_COUNT: usize = 5;

/// Largest byte count accepted by the firmware's I2C and UART reads.
pub const MAX_BYTE_COUNT: usize = 255;

pub const SSI_FREQUENCY_MIN: u32 = 2_000;
pub const SSI_FREQUENCY_MAX: u32 = 50_000_000;
pub const SSI_DATA_WIDTH_MIN: u8 = 4;
pub const SSI_DATA_WIDTH_MAX: u8 = 16;

/// Word count read by `ssi {port} 1 8` when clearing the receive FIFO.
pub const SSI_CLEAR_COUNT: usize = 8;

pub const UART_BAUD_MIN: u32 = 150;
pub const UART_BAUD_MAX: u32 = 15_000_000;

/// Number of LCD orientations (`lcd orient 0..=3`).
pub const LCD_ORIENTATIONS: u8 = 4;
