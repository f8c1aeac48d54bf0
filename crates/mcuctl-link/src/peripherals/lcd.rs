use mcuctl_protocol::{Command, LcdCommand};

use super::send_ok;
use crate::channel::SharedChannel;
use crate::counters::AccessCounters;
use crate::error::LinkResult;

/// The 128x128 color LCD of the booster pack. Colors are `0xRRGGBB`.
pub struct Lcd {
    channel: SharedChannel,
    counters: AccessCounters,
}

impl Lcd {
    pub fn new(channel: SharedChannel) -> Self {
        Lcd {
            channel,
            counters: AccessCounters::default(),
        }
    }

    pub fn counters(&self) -> AccessCounters {
        self.counters
    }

    pub fn clear(&mut self, color: u32) -> LinkResult<()> {
        self.draw(LcdCommand::Clear { color })
    }

    /// Rotate the display; `orientation` is 0..=3.
    pub fn orient(&mut self, orientation: u8) -> LinkResult<()> {
        self.draw(LcdCommand::orient(orientation)?)
    }

    pub fn pixel(&mut self, x: i32, y: i32, color: u32) -> LinkResult<()> {
        self.draw(LcdCommand::Pixel { x, y, color })
    }

    pub fn line(&mut self, (x1, y1): (i32, i32), (x2, y2): (i32, i32), color: u32) -> LinkResult<()> {
        self.draw(LcdCommand::Line { x1, y1, x2, y2, color })
    }

    pub fn rect(&mut self, (x1, y1): (i32, i32), (x2, y2): (i32, i32), color: u32, fill: bool) -> LinkResult<()> {
        self.draw(LcdCommand::Rect {
            x1,
            y1,
            x2,
            y2,
            color,
            fill,
        })
    }

    pub fn circle(&mut self, x: i32, y: i32, radius: u32, color: u32, fill: bool) -> LinkResult<()> {
        self.draw(LcdCommand::Circle {
            x,
            y,
            radius,
            color,
            fill,
        })
    }

    pub fn text(&mut self, x: i32, y: i32, color: u32, center: bool, text: &str) -> LinkResult<()> {
        self.draw(LcdCommand::text(x, y, color, center, text)?)
    }

    /// Display information as reported by the firmware.
    pub fn info(&mut self) -> LinkResult<String> {
        let response = send_ok(&self.channel, &mut self.counters, &Command::Lcd(LcdCommand::Info))?;
        self.counters.record_read(response.body().len());
        Ok(response.body().to_string())
    }

    fn draw(&mut self, cmd: LcdCommand) -> LinkResult<()> {
        send_ok(&self.channel, &mut self.counters, &Command::Lcd(cmd))?;
        self.counters.record_write(1);
        Ok(())
    }
}
