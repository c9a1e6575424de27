//! Defines the validated panel configuration and the init sequence derived from it.

use crate::command::*;
use crate::error::ConfigError;

/// Number of commands in the init sequence produced by `Config::init_commands`.
pub const INIT_SEQUENCE_LEN: usize = 17;

/// How the panel's OLED drive voltage is supplied. This decides whether the internal charge pump
/// runs, and shifts the default contrast and pre-charge settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VccSource {
    /// Drive voltage is generated from VDD by the internal charge pump.
    Internal,
    /// Drive voltage is supplied externally on VCC.
    External,
}

/// A configuration for the display. The geometry and bus address are mandatory and validated in
/// the constructor; every other register has a default suitable for common modules and may be
/// overridden with the builder methods. Nothing here is sent until `Display::init`.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    width: u8,
    height: u8,
    address: u8,
    invert: bool,
    vcc: VccSource,
    column_remap: ColumnRemap,
    com_scan_direction: ComScanDirection,
    com_layout: ComLayout,
    contrast: Option<u8>,
    precharge: Option<(u8, u8)>,
    vcomh_deselect: u8,
    clock: (u8, u8),
}

impl Config {
    /// Create a new configuration for a `width` by `height` panel at bus `address`. The SSD1306
    /// family supports exactly 128 columns, and 32 or 64 rows.
    pub fn new(width: u16, height: u16, address: u8) -> Result<Self, ConfigError> {
        if width != NUM_PIXEL_COLS as u16 {
            return Err(ConfigError::UnsupportedWidth(width));
        }
        let com_layout = match height {
            32 => ComLayout::Sequential,
            64 => ComLayout::Alternative,
            _ => return Err(ConfigError::UnsupportedHeight(height)),
        };
        if address > 0x7F {
            return Err(ConfigError::InvalidAddress(address));
        }
        Ok(Config {
            width: width as u8,
            height: height as u8,
            address,
            invert: false,
            vcc: VccSource::Internal,
            column_remap: ColumnRemap::Reverse,
            com_scan_direction: ComScanDirection::RowZeroLast,
            com_layout,
            contrast: None,
            precharge: None,
            vcomh_deselect: 0x40,
            clock: (8, 1),
        })
    }

    /// Extend this `Config` to render inverted, with set bits dark.
    pub fn invert(self, invert: bool) -> Self {
        Self { invert, ..self }
    }

    /// Extend this `Config` to select the drive voltage source. See `VccSource`.
    pub fn vcc(self, vcc: VccSource) -> Self {
        Self { vcc, ..self }
    }

    /// Extend this `Config` to set the panel orientation. The defaults (`Reverse`,
    /// `RowZeroLast`) show RAM column 0 and row 0 at the top left of most modules; flip both to
    /// rotate the image by 180 degrees.
    pub fn orientation(self, column_remap: ColumnRemap, com_scan_direction: ComScanDirection) -> Self {
        Self {
            column_remap,
            com_scan_direction,
            ..self
        }
    }

    /// Extend this `Config` to override the COM pin layout that was derived from the height.
    pub fn com_layout(self, com_layout: ComLayout) -> Self {
        Self { com_layout, ..self }
    }

    /// Extend this `Config` to set the initial contrast current. See `Command::SetContrast`.
    pub fn contrast(self, contrast: u8) -> Self {
        Self {
            contrast: Some(contrast),
            ..self
        }
    }

    /// Extend this `Config` to set the pre-charge phase lengths. See
    /// `Command::SetPrechargePeriod`.
    pub fn precharge_period(self, phase_1: u8, phase_2: u8) -> Result<Self, ConfigError> {
        match (phase_1, phase_2) {
            (1..=15, 1..=15) => Ok(Self {
                precharge: Some((phase_1, phase_2)),
                ..self
            }),
            _ => Err(ConfigError::InvalidArgument),
        }
    }

    /// Extend this `Config` to set the VCOMH deselect level register. See
    /// `Command::SetVcomhDeselect`.
    pub fn vcomh_deselect(self, level: u8) -> Result<Self, ConfigError> {
        if level & !0x70 != 0 {
            return Err(ConfigError::InvalidArgument);
        }
        Ok(Self {
            vcomh_deselect: level,
            ..self
        })
    }

    /// Extend this `Config` to set the oscillator frequency and clock divide ratio. See
    /// `Command::SetClockDivide`.
    pub fn clock_divide(self, fosc: u8, divide: u8) -> Result<Self, ConfigError> {
        match (fosc, divide) {
            (0..=15, 1..=16) => Ok(Self {
                clock: (fosc, divide),
                ..self
            }),
            _ => Err(ConfigError::InvalidArgument),
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Number of 8-row pages stacked vertically.
    pub fn pages(&self) -> u8 {
        self.height / 8
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// Size in bytes of a full frame of display RAM.
    pub fn buffer_size(&self) -> usize {
        self.width as usize * self.pages() as usize
    }

    /// The contrast level the init sequence will program.
    pub fn initial_contrast(&self) -> u8 {
        self.contrast.unwrap_or(match (self.vcc, self.height) {
            (VccSource::External, _) => 0x9F,
            (VccSource::Internal, 32) => 0x8F,
            (VccSource::Internal, _) => 0xCF,
        })
    }

    fn precharge_phases(&self) -> (u8, u8) {
        self.precharge.unwrap_or(match self.vcc {
            VccSource::Internal => (1, 15),
            VccSource::External => (2, 2),
        })
    }

    /// The full ordered init sequence. Running it again re-establishes the same state, with the
    /// panel blanked while the registers are written.
    pub fn init_commands(&self) -> [Command; INIT_SEQUENCE_LEN] {
        let (phase_1, phase_2) = self.precharge_phases();
        [
            Command::SetSleepMode(true),
            Command::SetClockDivide(self.clock.0, self.clock.1),
            Command::SetMuxRatio(self.height),
            Command::SetDisplayOffset(0),
            Command::SetStartLine(0),
            Command::SetChargePump(self.vcc == VccSource::Internal),
            Command::SetColumnRemap(self.column_remap),
            Command::SetComScanDirection(self.com_scan_direction),
            Command::SetComLayout(self.com_layout),
            Command::SetContrast(self.initial_contrast()),
            Command::SetPrechargePeriod(phase_1, phase_2),
            Command::SetVcomhDeselect(self.vcomh_deselect),
            Command::SetAddressingMode(AddressingMode::Horizontal),
            Command::DeactivateScroll,
            Command::SetEntireDisplayOn(false),
            Command::SetInverted(self.invert),
            Command::SetSleepMode(false),
        ]
    }
}
