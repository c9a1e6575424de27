//! The command set for the SSD1306.
//!
//! Note 1: The display RAM of the SSD1306 is 128 columns by 8 pages, where each page is a
//! horizontal stripe 8 pixels tall and each byte of RAM is one column of one page, least
//! significant bit on top. Anywhere there is a "page" address, it refers to one of these stripes.

use crate::error::Error;
use crate::interface::{DisplayInterface, CONTROL_COMMAND};

pub const NUM_PIXEL_COLS: u8 = 128;
pub const NUM_PIXEL_ROWS: u8 = 64;
pub const NUM_PAGES: u8 = NUM_PIXEL_ROWS / 8;
pub const PIXEL_COL_MAX: u8 = NUM_PIXEL_COLS - 1;
pub const PIXEL_ROW_MAX: u8 = NUM_PIXEL_ROWS - 1;
pub const PAGE_MAX: u8 = NUM_PAGES - 1;

/// The order in which the RAM address pointer advances as data bytes are written.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AddressingMode {
    /// Column address increments within the column range, then wraps to the start column of the
    /// next page in the page range. This matches the page-major layout of `PixelBuffer`.
    Horizontal,
    /// Page address increments within the page range, then wraps to the next column.
    Vertical,
    /// Column address increments within the current page only; the page never advances.
    Page,
}

/// Setting of segment (column) remapping. Changing this setting will mirror the image
/// horizontally.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColumnRemap {
    /// Column address 0 maps to SEG0.
    Forward,
    /// Column address 127 maps to SEG0.
    Reverse,
}

/// Setting of the COM line scanning of rows. Changing this setting will flip the image vertically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComScanDirection {
    /// COM lines scan row addresses top to bottom, so that row address 0 is the first row of the
    /// display.
    RowZeroFirst,
    /// COM lines scan row addresses bottom to top, so that row address 0 is the last row of the
    /// display.
    RowZeroLast,
}

/// Setting the layout of the COM lines to the display rows. This setting is dictated by how the
/// display module itself wires the OLED matrix to the driver chip, and changing it to anything
/// other than the correct setting for your module will yield an image with every other row
/// missing or doubled. 128x32 modules are normally `Sequential`, 128x64 modules `Alternative`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComLayout {
    /// COM lines are connected to display rows in a progressive arrangement.
    Sequential,
    /// COM lines are connected to display rows alternating between the left and right side of
    /// the panel.
    Alternative,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Set the contrast current. Range 0-255.
    SetContrast(u8),
    /// When enabled, every pixel is lit regardless of display RAM contents. Disabling it resumes
    /// showing the RAM.
    SetEntireDisplayOn(bool),
    /// Show the display RAM inverted, so that set bits are dark pixels.
    SetInverted(bool),
    /// Control sleep mode. The panel is dark while asleep, but RAM contents and settings are
    /// retained.
    SetSleepMode(bool),
    /// Stop any running hardware scroll. Writing RAM while a scroll is active may corrupt it.
    DeactivateScroll,
    /// Set the order in which the write pointer advances. See enum for details.
    SetAddressingMode(AddressingMode),
    /// Set the column start and end address range when writing to the display RAM, for the
    /// horizontal and vertical addressing modes. The column pointer is reset to the start column.
    /// Range is 0-127, where start must be <= end.
    SetColumnAddress(u8, u8),
    /// Set the page start and end address range when writing to the display RAM, for the
    /// horizontal and vertical addressing modes. The page pointer is reset to the start page.
    /// Range is 0-7, where start must be <= end. (Note 1)
    SetPageAddress(u8, u8),
    /// Set the display RAM row shown on the first COM line, "rolling" the image upwards.
    /// Range is 0-63.
    SetStartLine(u8),
    /// Set the mapping of column addresses to segment drivers.
    SetColumnRemap(ColumnRemap),
    /// Set the MUX ratio, the number of COM lines (pixel rows) that are active. Range 16-64.
    SetMuxRatio(u8),
    /// Set the COM line scan direction.
    SetComScanDirection(ComScanDirection),
    /// Set the vertical shift of the COM lines relative to RAM rows. Range 0-63.
    SetDisplayOffset(u8),
    /// Set the COM pin hardware layout. See enum for details.
    SetComLayout(ComLayout),
    /// Set the oscillator frequency Fosc (0-15, higher is faster) and the display clock divide
    /// ratio (1-16).
    SetClockDivide(u8, u8),
    /// Set the pre-charge period phase lengths, phase 1 then phase 2, each 1-15 DCLKs.
    SetPrechargePeriod(u8, u8),
    /// Set the VCOMH deselect level register. Only bits 4-6 are meaningful.
    SetVcomhDeselect(u8),
    /// Enable or disable the internal charge pump regulator. It must be enabled when the panel
    /// is not supplied with an external high voltage.
    SetChargePump(bool),
}

macro_rules! ok_command {
    ($buf:ident, $cmd:expr,[]) => {{
        $buf[1] = $cmd;
        Ok(&$buf[..2])
    }};
    ($buf:ident, $cmd:expr,[$arg0:expr]) => {{
        $buf[1] = $cmd;
        $buf[2] = $arg0;
        Ok(&$buf[..3])
    }};
    ($buf:ident, $cmd:expr,[$arg0:expr, $arg1:expr]) => {{
        $buf[1] = $cmd;
        $buf[2] = $arg0;
        $buf[3] = $arg1;
        Ok(&$buf[..4])
    }};
}

impl Command {
    /// Encode the command and send it to the controller at `address` as one command transaction.
    /// Arguments are range checked first; nothing is sent for a rejected command.
    pub fn send<DI>(self, iface: &mut DI, address: u8) -> Result<(), Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        let mut buf = [CONTROL_COMMAND; 4];
        let bytes: &[u8] = match self {
            Command::SetContrast(level) => ok_command!(buf, 0x81, [level]),
            Command::SetEntireDisplayOn(ena) => ok_command!(
                buf,
                match ena {
                    true => 0xA5,
                    false => 0xA4,
                },
                []
            ),
            Command::SetInverted(ena) => ok_command!(
                buf,
                match ena {
                    true => 0xA7,
                    false => 0xA6,
                },
                []
            ),
            Command::SetSleepMode(ena) => ok_command!(
                buf,
                match ena {
                    true => 0xAE,
                    false => 0xAF,
                },
                []
            ),
            Command::DeactivateScroll => ok_command!(buf, 0x2E, []),
            Command::SetAddressingMode(mode) => {
                let m = match mode {
                    AddressingMode::Horizontal => 0x00,
                    AddressingMode::Vertical => 0x01,
                    AddressingMode::Page => 0x02,
                };
                ok_command!(buf, 0x20, [m])
            }
            Command::SetColumnAddress(start, end) => match (start, end) {
                (0..=PIXEL_COL_MAX, 0..=PIXEL_COL_MAX) if start <= end => {
                    ok_command!(buf, 0x21, [start, end])
                }
                _ => Err(Error::InvalidWindow),
            },
            Command::SetPageAddress(start, end) => match (start, end) {
                (0..=PAGE_MAX, 0..=PAGE_MAX) if start <= end => {
                    ok_command!(buf, 0x22, [start, end])
                }
                _ => Err(Error::InvalidWindow),
            },
            Command::SetStartLine(line) => match line {
                0..=PIXEL_ROW_MAX => ok_command!(buf, 0x40 | line, []),
                _ => Err(Error::InvalidArgument),
            },
            Command::SetColumnRemap(remap) => ok_command!(
                buf,
                match remap {
                    ColumnRemap::Forward => 0xA0,
                    ColumnRemap::Reverse => 0xA1,
                },
                []
            ),
            Command::SetMuxRatio(ratio) => match ratio {
                16..=NUM_PIXEL_ROWS => ok_command!(buf, 0xA8, [ratio - 1]),
                _ => Err(Error::InvalidArgument),
            },
            Command::SetComScanDirection(dir) => ok_command!(
                buf,
                match dir {
                    ComScanDirection::RowZeroFirst => 0xC0,
                    ComScanDirection::RowZeroLast => 0xC8,
                },
                []
            ),
            Command::SetDisplayOffset(offset) => match offset {
                0..=PIXEL_ROW_MAX => ok_command!(buf, 0xD3, [offset]),
                _ => Err(Error::InvalidArgument),
            },
            Command::SetComLayout(layout) => ok_command!(
                buf,
                0xDA,
                [match layout {
                    ComLayout::Sequential => 0x02,
                    ComLayout::Alternative => 0x12,
                }]
            ),
            Command::SetClockDivide(fosc, divide) => match (fosc, divide) {
                (0..=15, 1..=16) => ok_command!(buf, 0xD5, [fosc << 4 | (divide - 1)]),
                _ => Err(Error::InvalidArgument),
            },
            Command::SetPrechargePeriod(phase_1, phase_2) => match (phase_1, phase_2) {
                (1..=15, 1..=15) => ok_command!(buf, 0xD9, [phase_2 << 4 | phase_1]),
                _ => Err(Error::InvalidArgument),
            },
            Command::SetVcomhDeselect(level) => match level & !0x70 {
                0 => ok_command!(buf, 0xDB, [level]),
                _ => Err(Error::InvalidArgument),
            },
            Command::SetChargePump(ena) => ok_command!(
                buf,
                0x8D,
                [match ena {
                    true => 0x14,
                    false => 0x10,
                }]
            ),
        }?;
        iface.send(address, bytes).map_err(Error::Transport)
    }
}
