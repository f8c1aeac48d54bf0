//! Board self-test.
//!
//! Walks through every peripheral of the demo board once: LEDs, buttons,
//! RGB LED, I2C, SSI and UART in loopback, ADC, both booster pack sensors
//! and the LCD. A failing step is recorded and the test moves on.

use std::fmt;
use std::thread;
use std::time::Duration;

use mcuctl_link::{Board, LinkResult, SsiFrameFormat, SsiSettings, UartParity, UartSettings};
use tracing::{error, info};

/// Default pause between visible steps (LED running light).
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(100);

const LED_STEPS: u32 = 5;
const RGB_COLORS: [u32; 5] = [0xff0000, 0x00ff00, 0x0000ff, 0xffffff, 0x000000];
const LCD_COLORS: [u32; 5] = [0x000000, 0xff0000, 0x00ff00, 0x0000ff, 0xffffff];
const ADC_SAMPLES: usize = 10;
const LOOPBACK_DATA: [u8; 7] = [1, 2, 3, 4, 5, 6, 7];

type Step = fn(&mut SelfTest) -> LinkResult<()>;

const STEPS: [(&str, Step); 13] = [
    ("info", SelfTest::info),
    ("serial details", SelfTest::details),
    ("buttons", SelfTest::buttons),
    ("LEDs", SelfTest::leds),
    ("RGB LED", SelfTest::rgb),
    ("I2C", SelfTest::i2c),
    ("SSI", SelfTest::ssi),
    ("UART", SelfTest::uart),
    ("ADC", SelfTest::adc),
    ("TMP006", SelfTest::tmp006),
    ("OPT3001", SelfTest::opt3001),
    ("LCD", SelfTest::lcd),
    ("serial details", SelfTest::details),
];

/// Outcome of a self-test run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelfTestReport {
    pub passed: Vec<String>,
    /// Failed step names with the error text.
    pub failures: Vec<(String, String)>,
}

impl SelfTestReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for SelfTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Self-test: {} steps passed, {} failed",
            self.passed.len(),
            self.failures.len()
        )?;
        for (step, reason) in &self.failures {
            write!(f, "\n  {}: {}", step, reason)?;
        }
        Ok(())
    }
}

/// Self-test driver owning the board handles.
pub struct SelfTest {
    board: Board,
    pause: Duration,
}

impl SelfTest {
    pub fn new(board: Board) -> Self {
        SelfTest {
            board,
            pause: DEFAULT_PAUSE,
        }
    }

    /// Pause between LED steps. The RGB and LCD steps wait five times as long.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn run(&mut self) -> SelfTestReport {
        let mut report = SelfTestReport::default();
        for (name, step) in STEPS {
            info!("=== {} ===", name);
            match step(self) {
                Ok(()) => report.passed.push(name.to_string()),
                Err(e) => {
                    error!("{} failed: {}", name, e);
                    report.failures.push((name.to_string(), e.to_string()));
                }
            }
        }
        info!("{}", report);
        report
    }

    fn info(&mut self) -> LinkResult<()> {
        info!("{}", self.board.info()?);
        Ok(())
    }

    fn details(&mut self) -> LinkResult<()> {
        info!("{}", self.board.channel().lock().details());
        Ok(())
    }

    fn buttons(&mut self) -> LinkResult<()> {
        for index in 0..mcuctl_protocol::BUTTON_COUNT {
            let status = self.board.button.get(index)?;
            info!("Button {}: {:?}", index, status);
        }
        for line in ["button", "button i"] {
            let response = self.board.channel().lock().send_line(line)?;
            info!("{}: {}", line, response.full());
        }
        Ok(())
    }

    fn leds(&mut self) -> LinkResult<()> {
        let mut value: u8 = 1;
        for _ in 0..LED_STEPS {
            self.board.led.set(value)?;
            info!("LEDs: 0x{:02x}", self.board.led.get()?);
            thread::sleep(self.pause);
            value = value.wrapping_shl(1);
        }
        Ok(())
    }

    fn rgb(&mut self) -> LinkResult<()> {
        for color in RGB_COLORS {
            self.board.rgb.set_color(color)?;
            thread::sleep(self.pause * 5);
        }
        Ok(())
    }

    fn i2c(&mut self) -> LinkResult<()> {
        let mut i2c = self.board.i2c.lock();
        let address = mcuctl_link::peripherals::TMP006_ADDRESS;
        i2c.write(address, &[0x01, 0x12, 0x34])?;
        info!("I2C read: {:02x?}", i2c.read(address, 2)?);
        i2c.write_with(address, &[0x01], false, false)?;
        info!("I2C read (repeated start): {:02x?}", i2c.read_with(address, 2, true, true)?);
        info!("I2C: {}", i2c.counters());
        Ok(())
    }

    fn ssi(&mut self) -> LinkResult<()> {
        let ssi = &mut self.board.ssi;
        ssi.setup(SsiSettings::new(1_000_000, SsiFrameFormat::SpiMode0, 8)?)?;
        ssi.clear()?;
        let data: Vec<u16> = LOOPBACK_DATA.iter().map(|&b| u16::from(b)).collect();
        ssi.write(&data)?;
        info!("SSI read all: {:?}", ssi.read_all()?);
        info!("SSI: {}", ssi.counters());
        Ok(())
    }

    fn uart(&mut self) -> LinkResult<()> {
        let uart = &mut self.board.uart;
        uart.setup(UartSettings::new(115_200, true, UartParity::None)?)?;
        uart.clear()?;
        uart.write(&LOOPBACK_DATA)?;
        info!("UART read all: {:?}", uart.read_all()?);
        uart.clear()?;
        uart.write_str("Hello world!")?;
        info!("UART read string: {:?}", uart.read_str(0)?);
        info!("UART: {}", uart.counters());
        Ok(())
    }

    fn adc(&mut self) -> LinkResult<()> {
        for _ in 0..ADC_SAMPLES {
            let reading = self.board.adc.read()?;
            info!("Joystick {:?}, accelerometer {:?}", reading.joystick(), reading.accelerometer());
        }
        Ok(())
    }

    fn tmp006(&mut self) -> LinkResult<()> {
        self.board.tmp006.init()?;
        info!("TMP006: {:.2} °C", self.board.tmp006.read_temperature()?);
        Ok(())
    }

    fn opt3001(&mut self) -> LinkResult<()> {
        self.board.opt3001.init()?;
        info!("OPT3001: {:.2} lux", self.board.opt3001.read_illuminance()?);
        Ok(())
    }

    fn lcd(&mut self) -> LinkResult<()> {
        let lcd = &mut self.board.lcd;
        for color in LCD_COLORS {
            lcd.clear(color)?;
            thread::sleep(self.pause * 5);
        }
        info!("{}", lcd.info()?);
        for orientation in [1, 2, 3, 0] {
            lcd.orient(orientation)?;
            thread::sleep(self.pause * 5);
        }
        Ok(())
    }
}
