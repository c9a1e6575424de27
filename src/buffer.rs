//! In-memory copy of the display RAM.
//!
//! The buffer uses the controller's own layout so that it can be streamed out unchanged in
//! horizontal addressing mode: byte `page * width + column` holds rows `page * 8` through
//! `page * 8 + 7` of that column, bit 0 being the top row.

use itertools::iproduct;

use crate::command::{NUM_PAGES, NUM_PIXEL_COLS};
use crate::config::Config;
use crate::error::DrawError;

/// Capacity of the largest supported panel.
pub const MAX_BUFFER_SIZE: usize = NUM_PIXEL_COLS as usize * NUM_PAGES as usize;

/// A bit-packed monochrome frame. The size is fixed by the `Config` it was made for.
#[derive(Clone)]
pub struct PixelBuffer {
    bytes: [u8; MAX_BUFFER_SIZE],
    width: u8,
    height: u8,
}

impl PixelBuffer {
    /// Create a buffer for the panel described by `config`, with every pixel off.
    pub fn new(config: &Config) -> Self {
        PixelBuffer {
            bytes: [0; MAX_BUFFER_SIZE],
            width: config.width(),
            height: config.height(),
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn pages(&self) -> u8 {
        self.height / 8
    }

    fn len(&self) -> usize {
        self.width as usize * self.pages() as usize
    }

    /// Byte index and bit mask of a pixel, or `None` when it is outside the buffer.
    fn locate(&self, x: i16, y: i16) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= self.width as i16 || y >= self.height as i16 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some(((y / 8) * self.width as usize + x, 1 << (y % 8)))
    }

    /// Turn one pixel on or off.
    pub fn set_pixel(&mut self, x: i16, y: i16, on: bool) -> Result<(), DrawError> {
        let (idx, mask) = self.locate(x, y).ok_or(DrawError::OutOfBounds)?;
        if on {
            self.bytes[idx] |= mask;
        } else {
            self.bytes[idx] &= !mask;
        }
        Ok(())
    }

    pub fn get_pixel(&self, x: i16, y: i16) -> Result<bool, DrawError> {
        let (idx, mask) = self.locate(x, y).ok_or(DrawError::OutOfBounds)?;
        Ok(self.bytes[idx] & mask != 0)
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        self.fill(false);
    }

    /// Turn every pixel on or off.
    pub fn fill(&mut self, on: bool) {
        let len = self.len();
        let value = if on { 0xFF } else { 0x00 };
        for b in self.bytes[..len].iter_mut() {
            *b = value;
        }
    }

    /// The whole frame in display RAM order, exactly `width * height / 8` bytes.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// Overwrite a rectangle with glyph image data.
    ///
    /// `glyph` holds `rows` page-rows of `glyph.len() / rows` columns each, laid out like the
    /// buffer itself: byte `row * columns + column`. The destination is `columns` pixels wide and
    /// `rows * 8` pixels tall with its top left at (`x`, `y`). Every pixel of the destination is
    /// replaced, and no pixel outside it is touched. `y` need not be a multiple of 8, in which
    /// case each glyph byte straddles two pages.
    ///
    /// The whole rectangle must fit inside the buffer, otherwise `OutOfBounds` is returned and the
    /// buffer is left unmodified.
    pub fn blit_glyph(&mut self, x: i16, y: i16, glyph: &[u8], rows: u8) -> Result<(), DrawError> {
        if rows == 0 || glyph.is_empty() || glyph.len() % rows as usize != 0 {
            return Err(DrawError::OutOfBounds);
        }
        let cols = glyph.len() / rows as usize;
        if x < 0
            || y < 0
            || x as usize + cols > self.width as usize
            || y as usize + rows as usize * 8 > self.height as usize
        {
            return Err(DrawError::OutOfBounds);
        }

        let (x, y) = (x as usize, y as usize);
        let width = self.width as usize;
        let first_page = y / 8;
        let shift = y % 8;
        for (row, col) in iproduct!(0..rows as usize, 0..cols) {
            let src = glyph[row * cols + col];
            let idx = (first_page + row) * width + x + col;
            if shift == 0 {
                self.bytes[idx] = src;
            } else {
                let upper_mask = 0xFFu8 << shift;
                self.bytes[idx] = (self.bytes[idx] & !upper_mask) | (src << shift);
                let lower_mask = 0xFFu8 >> (8 - shift);
                let next = idx + width;
                self.bytes[next] = (self.bytes[next] & !lower_mask) | (src >> (8 - shift));
            }
        }
        Ok(())
    }

    /// Iterate the bytes of a sub-rectangle of whole pages in the order the controller fills an
    /// addressing window of the same extent. Bounds are inclusive and must already be validated.
    pub(crate) fn window(
        &self,
        col_start: u8,
        col_end: u8,
        page_start: u8,
        page_end: u8,
    ) -> impl Iterator<Item = u8> + '_ {
        let width = self.width as usize;
        iproduct!(page_start..=page_end, col_start..=col_end)
            .map(move |(page, col)| self.bytes[page as usize * width + col as usize])
    }
}
