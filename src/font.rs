//! Monospace bitmap fonts.
//!
//! Glyph data is stored in the same layout as the pixel buffer, scoped to one character: a glyph
//! `width` pixels wide and `rows` pages tall is `rows * width` bytes, byte `row * width + column`,
//! bit 0 on top. Glyphs are concatenated in table order.
//!
//! Character codes are mapped to table positions by a `GlyphLookup`. A dense table covers one
//! contiguous run of codes; a sparse table lists several runs, so that a font can leave out
//! characters it does not need without wasting space on blank glyphs.

use crate::buffer::PixelBuffer;
use crate::error::{ConfigError, DrawError};

/// Mapping from character codes to glyph indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GlyphLookup<'a> {
    /// Glyph `i` is character code `base + i`.
    Dense { base: u8 },
    /// Several runs of codes listed in a `SkipTable`. Built with `GlyphLookup::sparse`.
    Sparse(SkipTable<'a>),
}

/// A validated skip table: pairs of inclusive `first, last` code ranges in ascending order,
/// glyphs numbered consecutively across the ranges. A `0x00, 0x00` pair ends the table early.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkipTable<'a>(&'a [u8]);

impl<'a> SkipTable<'a> {
    /// The raw table bytes, terminator included if there was one.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }
}

impl<'a> GlyphLookup<'a> {
    /// Build a sparse lookup from a skip table, checking that it is well formed.
    pub const fn sparse(table: &'a [u8]) -> Result<Self, ConfigError> {
        if table.len() % 2 != 0 {
            return Err(ConfigError::SkipTable);
        }
        let mut i = 0;
        let mut prev_last: i16 = -1;
        while i < table.len() {
            let (first, last) = (table[i], table[i + 1]);
            if first == 0 && last == 0 {
                break;
            }
            if first > last || first as i16 <= prev_last {
                return Err(ConfigError::SkipTable);
            }
            prev_last = last as i16;
            i += 2;
        }
        if i == 0 {
            return Err(ConfigError::SkipTable);
        }
        Ok(GlyphLookup::Sparse(SkipTable(table)))
    }

    /// Number of character codes covered by a sparse table. Dense lookups have no bound of their
    /// own and report `None`.
    const fn covered(&self) -> Option<usize> {
        match *self {
            GlyphLookup::Dense { .. } => None,
            GlyphLookup::Sparse(SkipTable(table)) => {
                let mut i = 0;
                let mut count = 0;
                while i < table.len() {
                    let (first, last) = (table[i], table[i + 1]);
                    if first == 0 && last == 0 {
                        break;
                    }
                    count += (last - first) as usize + 1;
                    i += 2;
                }
                Some(count)
            }
        }
    }

    fn index_of(&self, code: u8) -> Option<usize> {
        match *self {
            GlyphLookup::Dense { base } => code.checked_sub(base).map(usize::from),
            GlyphLookup::Sparse(SkipTable(table)) => {
                let mut base = 0;
                for range in table.chunks_exact(2) {
                    let (first, last) = (range[0], range[1]);
                    if first == 0 && last == 0 || code < first {
                        return None;
                    }
                    if code <= last {
                        return Some(base + (code - first) as usize);
                    }
                    base += (last - first) as usize + 1;
                }
                None
            }
        }
    }
}

/// A fixed-width bitmap font. Fonts are read-only and may be shared by any number of displays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonoFont<'a> {
    data: &'a [u8],
    lookup: GlyphLookup<'a>,
    rows: u8,
    width: u8,
    glyphs: usize,
}

impl<'a> MonoFont<'a> {
    /// Create a font from glyph `data` for glyphs `width` pixels wide and `rows` pages tall.
    ///
    /// `data` must hold a whole number of glyphs, and a sparse `lookup` must cover exactly as many
    /// characters as there are glyphs.
    pub const fn new(
        data: &'a [u8],
        rows: u8,
        width: u8,
        lookup: GlyphLookup<'a>,
    ) -> Result<Self, ConfigError> {
        if rows == 0 || width == 0 {
            return Err(ConfigError::FontGeometry);
        }
        let bytes_per_character = rows as usize * width as usize;
        if data.is_empty() || data.len() % bytes_per_character != 0 {
            return Err(ConfigError::FontLength);
        }
        let glyphs = data.len() / bytes_per_character;
        match lookup.covered() {
            Some(count) if count != glyphs => Err(ConfigError::FontLength),
            _ => Ok(MonoFont {
                data,
                lookup,
                rows,
                width,
                glyphs,
            }),
        }
    }

    /// Glyph height in pages.
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Glyph width in pixels, which is also the cursor advance per character.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Glyph height in pixels.
    pub fn height(&self) -> u16 {
        self.rows as u16 * 8
    }

    pub fn bytes_per_character(&self) -> usize {
        self.rows as usize * self.width as usize
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs
    }

    pub fn lookup(&self) -> GlyphLookup<'a> {
        self.lookup
    }

    /// Table position of the glyph for `code`, or `None` if the font has no such character.
    pub fn glyph_index(&self, code: u8) -> Option<usize> {
        self.lookup.index_of(code).filter(|&i| i < self.glyphs)
    }

    /// The image data of the glyph at table position `index`.
    pub fn glyph_bytes(&self, index: usize) -> Result<&'a [u8], DrawError> {
        if index >= self.glyphs {
            return Err(DrawError::IndexOutOfRange);
        }
        let bpc = self.bytes_per_character();
        Ok(&self.data[index * bpc..(index + 1) * bpc])
    }

    /// The image data of the glyph for character `code`.
    pub fn glyph_for(&self, code: u8) -> Result<&'a [u8], DrawError> {
        let index = self
            .glyph_index(code)
            .ok_or(DrawError::IndexOutOfRange)?;
        self.glyph_bytes(index)
    }

    /// Draw the glyph for `code` with its top left corner at (`x`, `y`), replacing whatever was
    /// there. A character the font lacks is reported as `IndexOutOfRange` and nothing is drawn;
    /// the caller picks the fallback. The cursor is not advanced; the next character goes
    /// `width()` pixels to the right.
    pub fn draw_character(
        &self,
        buffer: &mut PixelBuffer,
        x: i16,
        y: i16,
        code: u8,
    ) -> Result<(), DrawError> {
        let glyph = self.glyph_for(code)?;
        buffer.blit_glyph(x, y, glyph, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const A: [u8; 5] = [0x7E, 0x11, 0x11, 0x11, 0x7E];
    const B: [u8; 5] = [0x7F, 0x49, 0x49, 0x49, 0x36];

    fn buffer() -> PixelBuffer {
        PixelBuffer::new(&Config::new(128, 32, 0x3C).unwrap())
    }

    fn ab_font() -> MonoFont<'static> {
        const DATA: [u8; 10] = [0x7E, 0x11, 0x11, 0x11, 0x7E, 0x7F, 0x49, 0x49, 0x49, 0x36];
        MonoFont::new(&DATA, 1, 5, GlyphLookup::Dense { base: b'A' }).unwrap()
    }

    #[test]
    fn construction_checks_geometry() {
        let data = [0u8; 10];
        assert_eq!(
            MonoFont::new(&data, 0, 5, GlyphLookup::Dense { base: 0 }),
            Err(ConfigError::FontGeometry)
        );
        assert_eq!(
            MonoFont::new(&data, 1, 3, GlyphLookup::Dense { base: 0 }),
            Err(ConfigError::FontLength)
        );
        assert_eq!(
            MonoFont::new(&[], 1, 5, GlyphLookup::Dense { base: 0 }),
            Err(ConfigError::FontLength)
        );
        let font = MonoFont::new(&data, 1, 5, GlyphLookup::Dense { base: 0 }).unwrap();
        assert_eq!(font.glyph_count(), 2);
        assert_eq!(font.bytes_per_character(), 5);
        assert_eq!(font.height(), 8);
    }

    #[test]
    fn skip_table_validation() {
        assert!(GlyphLookup::sparse(&[0x20, 0x7E, 0x00, 0x00]).is_ok());
        assert!(GlyphLookup::sparse(&[0x30, 0x39, 0x41, 0x5A]).is_ok());
        assert_eq!(GlyphLookup::sparse(&[0x30]), Err(ConfigError::SkipTable));
        assert_eq!(GlyphLookup::sparse(&[0x39, 0x30]), Err(ConfigError::SkipTable));
        assert_eq!(
            GlyphLookup::sparse(&[0x41, 0x5A, 0x30, 0x39]),
            Err(ConfigError::SkipTable)
        );
        assert_eq!(
            GlyphLookup::sparse(&[0x30, 0x39, 0x39, 0x40]),
            Err(ConfigError::SkipTable)
        );
        assert_eq!(GlyphLookup::sparse(&[0, 0]), Err(ConfigError::SkipTable));
    }

    #[test]
    fn malformed_skip_table_is_a_config_error() {
        let data = [0u8; 5];
        let odd: &[u8] = &[0x41];
        let reversed: &[u8] = &[0x5A, 0x41];
        for &table in &[odd, reversed] {
            let font = GlyphLookup::sparse(table).and_then(|lookup| MonoFont::new(&data, 1, 5, lookup));
            assert_eq!(font, Err(ConfigError::SkipTable));
        }

        match GlyphLookup::sparse(&[0x41, 0x41, 0, 0]).unwrap() {
            GlyphLookup::Sparse(table) => assert_eq!(table.as_bytes(), &[0x41, 0x41, 0, 0]),
            GlyphLookup::Dense { .. } => panic!("expected a sparse lookup"),
        }
    }

    #[test]
    fn sparse_glyph_count_must_match() {
        let data = [0u8; 15];
        let lookup = GlyphLookup::sparse(&[b'0', b'1', b'A', b'A']).unwrap();
        assert!(MonoFont::new(&data, 1, 5, lookup).is_ok());
        let lookup = GlyphLookup::sparse(&[b'0', b'2', b'A', b'A']).unwrap();
        assert_eq!(MonoFont::new(&data, 1, 5, lookup), Err(ConfigError::FontLength));
    }

    #[test]
    fn dense_index() {
        let font = ab_font();
        assert_eq!(font.glyph_index(b'A'), Some(0));
        assert_eq!(font.glyph_index(b'B'), Some(1));
        assert_eq!(font.glyph_index(b'C'), None);
        assert_eq!(font.glyph_index(b'@'), None);
        assert_eq!(font.glyph_bytes(1), Ok(&B[..]));
        assert_eq!(font.glyph_bytes(2), Err(DrawError::IndexOutOfRange));
    }

    #[test]
    fn sparse_index() {
        let data = [0u8; 5 * 14];
        let lookup = GlyphLookup::sparse(&[b'0', b'9', b'A', b'C', b'x', b'x', 0, 0]).unwrap();
        let font = MonoFont::new(&data, 1, 5, lookup).unwrap();
        assert_eq!(font.glyph_count(), 14);
        assert_eq!(font.glyph_index(b'0'), Some(0));
        assert_eq!(font.glyph_index(b'9'), Some(9));
        assert_eq!(font.glyph_index(b'A'), Some(10));
        assert_eq!(font.glyph_index(b'C'), Some(12));
        assert_eq!(font.glyph_index(b'x'), Some(13));
        assert_eq!(font.glyph_index(b':'), None);
        assert_eq!(font.glyph_index(b'D'), None);
        assert_eq!(font.glyph_index(b'/'), None);
        assert_eq!(font.glyph_index(b'y'), None);
        assert_eq!(font.glyph_index(0), None);
    }

    #[test]
    fn draw_character_at_origin() {
        let font = MonoFont::new(&A, 1, 5, GlyphLookup::Dense { base: b'A' }).unwrap();
        let mut buf = buffer();
        font.draw_character(&mut buf, 0, 0, b'A').unwrap();
        let raw = buf.raw_bytes();
        assert_eq!(&raw[..5], &A[..]);
        assert!(raw[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn draw_tall_glyph() {
        // 2 pages tall, 2 columns wide.
        let data = [0x01, 0x02, 0x80, 0x40];
        let font = MonoFont::new(&data, 2, 2, GlyphLookup::Dense { base: b'|' }).unwrap();
        let mut buf = buffer();
        font.draw_character(&mut buf, 7, 8, b'|').unwrap();
        assert_eq!(buf.get_pixel(7, 8), Ok(true));
        assert_eq!(buf.get_pixel(8, 9), Ok(true));
        assert_eq!(buf.get_pixel(7, 23), Ok(true));
        assert_eq!(buf.get_pixel(8, 22), Ok(true));
        assert_eq!(buf.raw_bytes().iter().map(|b| b.count_ones()).sum::<u32>(), 4);
    }

    #[test]
    fn missing_character_draws_nothing() {
        let font = ab_font();
        let mut buf = buffer();
        buf.fill(true);
        assert_eq!(
            font.draw_character(&mut buf, 0, 0, b'Z'),
            Err(DrawError::IndexOutOfRange)
        );
        assert!(buf.raw_bytes().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn draw_character_past_edge() {
        let font = ab_font();
        let mut buf = buffer();
        assert_eq!(
            font.draw_character(&mut buf, 124, 0, b'A'),
            Err(DrawError::OutOfBounds)
        );
        assert_eq!(
            font.draw_character(&mut buf, 0, 25, b'A'),
            Err(DrawError::OutOfBounds)
        );
        assert!(buf.raw_bytes().iter().all(|&b| b == 0));
    }
}
