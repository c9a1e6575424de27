//! Error types for configuration, drawing and bus transactions.

use core::fmt;

/// Rejected display or font configuration. These are only produced while constructing a `Config`
/// or a `MonoFont`, never by a later drawing or protocol operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The SSD1306 family drives exactly 128 segments.
    UnsupportedWidth(u16),
    /// Only 32 and 64 row panels are supported.
    UnsupportedHeight(u16),
    /// Bus addresses are 7 bits wide.
    InvalidAddress(u8),
    /// An init tunable is outside the range the controller accepts.
    InvalidArgument,
    /// A font must be at least one column wide and one page tall.
    FontGeometry,
    /// The font data length is not a whole number of glyphs, or does not match the character
    /// count of its lookup table.
    FontLength,
    /// A skip table has an odd length, a reversed range, or ranges out of ascending order.
    SkipTable,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::UnsupportedWidth(w) => write!(f, "unsupported panel width {}", w),
            ConfigError::UnsupportedHeight(h) => write!(f, "unsupported panel height {}", h),
            ConfigError::InvalidAddress(a) => write!(f, "invalid bus address {:#04x}", a),
            ConfigError::InvalidArgument => write!(f, "init parameter out of range"),
            ConfigError::FontGeometry => write!(f, "font glyphs must have nonzero size"),
            ConfigError::FontLength => write!(f, "font data does not match glyph count"),
            ConfigError::SkipTable => write!(f, "malformed font skip table"),
        }
    }
}

/// Rejected drawing operation. The pixel buffer is never modified when one of these is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrawError {
    /// A pixel or some part of a glyph falls outside the buffer.
    OutOfBounds,
    /// The font has no glyph for the requested character or index.
    IndexOutOfRange,
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DrawError::OutOfBounds => write!(f, "coordinates outside the pixel buffer"),
            DrawError::IndexOutOfRange => write!(f, "no glyph in font"),
        }
    }
}

/// Errors returned by `Display` operations, generic over the transport error `E`.
///
/// Every variant except `Transport` is detected before any byte is sent or any pixel is changed.
/// A `Transport` error is passed through exactly as the interface reported it; the panel may then
/// be out of sync with the buffer until the next successful flush.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// See `DrawError::OutOfBounds`.
    OutOfBounds,
    /// See `DrawError::IndexOutOfRange`.
    IndexOutOfRange,
    /// Column or page address range is reversed or outside the panel.
    InvalidWindow,
    /// A command argument is outside the range the controller accepts.
    InvalidArgument,
    /// The underlying bus write failed.
    Transport(E),
}

impl<E> From<DrawError> for Error<E> {
    fn from(e: DrawError) -> Self {
        match e {
            DrawError::OutOfBounds => Error::OutOfBounds,
            DrawError::IndexOutOfRange => Error::IndexOutOfRange,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OutOfBounds => write!(f, "{}", DrawError::OutOfBounds),
            Error::IndexOutOfRange => write!(f, "{}", DrawError::IndexOutOfRange),
            Error::InvalidWindow => write!(f, "invalid addressing window"),
            Error::InvalidArgument => write!(f, "command argument out of range"),
            Error::Transport(e) => write!(f, "transport error: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for DrawError {}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::OutOfBounds => defmt::write!(f, "Out of bounds"),
            Error::IndexOutOfRange => defmt::write!(f, "Glyph index out of range"),
            Error::InvalidWindow => defmt::write!(f, "Invalid window"),
            Error::InvalidArgument => defmt::write!(f, "Invalid argument"),
            Error::Transport(e) => defmt::write!(f, "Transport error: {}", e),
        }
    }
}
