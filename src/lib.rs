//! Driver library for the Solomon Systech SSD1306 monochrome OLED display driver.
//!
//! Drawing happens in a `PixelBuffer` held by the `Display`, and is copied to the panel over I2C
//! or 4-wire SPI with `Display::flush`. Text is drawn with fixed width bitmap fonts; `FONT_5X8`
//! is built in.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate embedded_hal as hal;

pub mod buffer;
pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod font;
pub mod fonts;
pub mod interface;

// Re-exports for primary API.
pub use buffer::PixelBuffer;
pub use command::{ColumnRemap, ComLayout, ComScanDirection};
pub use config::{Config, VccSource};
pub use display::Display;
pub use error::{ConfigError, DrawError, Error};
pub use font::{GlyphLookup, MonoFont, SkipTable};
pub use fonts::FONT_5X8;
pub use interface::i2c::I2cInterface;
pub use interface::spi::SpiInterface;
