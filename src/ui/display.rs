//! SSD1306 OLED display wrapper.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use heapless::String;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use crate::power::Telemetry;
use crate::remote::{StatusSink, StatusUpdate};

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Initialise the SSD1306 display and clear the screen.
pub fn init<I2C>(i2c: I2C) -> Display<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    let _ = display.init();
    display.clear_buffer();
    let _ = display.flush();
    display
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

fn large_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_10X20)
        .text_color(BinaryColor::On)
        .build()
}

/// Render the boot screen.
pub fn draw_boot<I2C>(display: &mut Display<I2C>, pair_mode: bool)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    let _ = Text::new("BR-M5 remote", Point::new(0, 10), text_style()).draw(display);
    if pair_mode {
        let _ = Text::new("Pairing mode", Point::new(0, 30), text_style()).draw(display);
        let _ = Text::new("Put camera in", Point::new(0, 44), text_style()).draw(display);
        let _ = Text::new("remote pairing", Point::new(0, 56), text_style()).draw(display);
    } else {
        let _ = Text::new("Connecting...", Point::new(0, 30), text_style()).draw(display);
    }

    let _ = display.flush();
}

/// Render battery charge and die temperature.
pub fn draw_battery<I2C>(display: &mut Display<I2C>, telemetry: &Telemetry)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    let mut line: String<24> = String::new();
    let _ = write!(line, "{}%", telemetry.battery_percent);
    let _ = Text::new("Battery", Point::new(0, 10), text_style()).draw(display);
    let _ = Text::new(line.as_str(), Point::new(0, 32), large_style()).draw(display);

    line.clear();
    let _ = write!(line, "{} mV", telemetry.battery_mv);
    let _ = Text::new(line.as_str(), Point::new(0, 46), text_style()).draw(display);

    if let Some(t) = telemetry.temperature_c {
        line.clear();
        let _ = write!(line, "{} C", t);
        let _ = Text::new(line.as_str(), Point::new(0, 58), text_style()).draw(display);
    }

    let _ = display.flush();
}

/// Render the outcome of a pairing attempt.
///
/// `address` is the bonded camera, empty while still unpaired.
pub fn draw_pairing<I2C>(display: &mut Display<I2C>, address: &str, message: &str)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    let _ = Text::new(message, Point::new(0, 10), text_style()).draw(display);
    if !address.is_empty() {
        let _ = Text::new("Camera:", Point::new(0, 30), text_style()).draw(display);
        let _ = Text::new(address, Point::new(0, 44), text_style()).draw(display);
    }

    let _ = display.flush();
}

/// Main status screen: interval on top, label underneath.
pub struct OledStatus<I2C> {
    display: Display<I2C>,
}

impl<I2C> OledStatus<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    pub fn new(display: Display<I2C>) -> Self {
        Self { display }
    }
}

impl<I2C> StatusSink for OledStatus<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn show(&mut self, update: StatusUpdate) {
        let display = &mut self.display;
        display.clear_buffer();

        let interval = update.interval_text();
        let _ = Text::new(interval.as_str(), Point::new(0, 20), large_style()).draw(display);
        let _ = Text::new(update.label.as_str(), Point::new(0, 44), text_style()).draw(display);

        let _ = display.flush();
    }
}
