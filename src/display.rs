//! The main API to the display driver. A `Display` owns the transport and a `PixelBuffer`;
//! drawing only touches the buffer, and `flush` or `flush_window` copy it to the panel.

use core::convert::TryFrom;

use crate::buffer::PixelBuffer;
use crate::command::*;
use crate::config::Config;
use crate::error::Error;
use crate::font::MonoFont;
use crate::interface::{DisplayInterface, CONTROL_DATA};

/// Maximum number of RAM bytes carried by one data transaction.
pub const DATA_CHUNK_LEN: usize = 32;

/// A driver for an SSD1306 display.
pub struct Display<DI>
where
    DI: DisplayInterface,
{
    iface: DI,
    config: Config,
    buffer: PixelBuffer,
}

impl<DI> Display<DI>
where
    DI: DisplayInterface,
{
    /// Construct a new display driver for the panel described by `config`, which is connected to
    /// the interface `iface`. The buffer starts blank and nothing is sent until `init`.
    pub fn new(iface: DI, config: Config) -> Self {
        let buffer = PixelBuffer::new(&config);
        Display {
            iface,
            config,
            buffer,
        }
    }

    /// Give back the interface, dropping the buffer.
    pub fn release(self) -> DI {
        self.iface
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    fn command(&mut self, cmd: Command) -> Result<(), Error<DI::Error>> {
        let address = self.config.address();
        let res = cmd.send(&mut self.iface, address);
        #[cfg(feature = "defmt")]
        {
            if let Err(Error::Transport(_)) = res {
                defmt::warn!("ssd1306 {=u8:#x}: command transport failure", address);
            }
        }
        res
    }

    /// Run the full init sequence. This must be done once before the first flush, and may be
    /// repeated at any time to recover a panel that lost its settings. Display RAM is not
    /// touched.
    pub fn init(&mut self) -> Result<(), Error<DI::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "ssd1306 {=u8:#x}: init {=u8}x{=u8}",
            self.config.address(),
            self.config.width(),
            self.config.height()
        );
        for cmd in self.config.init_commands().iter() {
            self.command(*cmd)?;
        }
        Ok(())
    }

    /// Control sleep mode.
    pub fn sleep(&mut self, enabled: bool) -> Result<(), Error<DI::Error>> {
        self.command(Command::SetSleepMode(enabled))
    }

    /// Control the contrast current.
    pub fn contrast(&mut self, contrast: u8) -> Result<(), Error<DI::Error>> {
        self.command(Command::SetContrast(contrast))
    }

    /// Show the display RAM inverted or normally, without a re-init.
    pub fn invert(&mut self, inverted: bool) -> Result<(), Error<DI::Error>> {
        self.command(Command::SetInverted(inverted))
    }

    /// Light every pixel regardless of RAM contents, or go back to showing RAM.
    pub fn entire_display_on(&mut self, enabled: bool) -> Result<(), Error<DI::Error>> {
        self.command(Command::SetEntireDisplayOn(enabled))
    }

    /// Set the vertical pan.
    ///
    /// This uses the `Command::SetStartLine` feature to roll the displayed image upwards by
    /// `offset` rows, wrapping the top rows of RAM to the bottom of the panel.
    pub fn vertical_pan(&mut self, offset: u8) -> Result<(), Error<DI::Error>> {
        self.command(Command::SetStartLine(offset))
    }

    /// Program the controller's addressing window. Following data bytes fill columns `col_start`
    /// to `col_end` of page `page_start`, then of the next page, up to `page_end`. All bounds are
    /// inclusive and must lie on this panel; otherwise `InvalidWindow` is returned and nothing is
    /// sent.
    pub fn set_window(
        &mut self,
        col_start: u8,
        col_end: u8,
        page_start: u8,
        page_end: u8,
    ) -> Result<(), Error<DI::Error>> {
        if false
            || col_start > col_end
            || page_start > page_end
            || col_end >= self.config.width()
            || page_end >= self.config.pages()
        {
            return Err(Error::InvalidWindow);
        }
        #[cfg(feature = "defmt")]
        defmt::trace!(
            "ssd1306: window cols {=u8}..={=u8} pages {=u8}..={=u8}",
            col_start,
            col_end,
            page_start,
            page_end
        );
        self.command(Command::SetColumnAddress(col_start, col_end))?;
        self.command(Command::SetPageAddress(page_start, page_end))
    }

    /// Copy the whole buffer to the panel.
    pub fn flush(&mut self) -> Result<(), Error<DI::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("ssd1306: flush {=usize} bytes", self.buffer.raw_bytes().len());
        self.set_window(0, self.config.width() - 1, 0, self.config.pages() - 1)?;
        let address = self.config.address();
        send_data(
            &mut self.iface,
            address,
            self.buffer.raw_bytes().iter().cloned(),
        )
    }

    /// Copy only a rectangle of whole pages of the buffer to the panel. Bounds are inclusive, as
    /// for `set_window`.
    pub fn flush_window(
        &mut self,
        col_start: u8,
        col_end: u8,
        page_start: u8,
        page_end: u8,
    ) -> Result<(), Error<DI::Error>> {
        self.set_window(col_start, col_end, page_start, page_end)?;
        let address = self.config.address();
        send_data(
            &mut self.iface,
            address,
            self.buffer.window(col_start, col_end, page_start, page_end),
        )
    }

    /// Turn one buffer pixel on or off.
    pub fn set_pixel(&mut self, x: i16, y: i16, on: bool) -> Result<(), Error<DI::Error>> {
        Ok(self.buffer.set_pixel(x, y, on)?)
    }

    pub fn get_pixel(&self, x: i16, y: i16) -> Result<bool, Error<DI::Error>> {
        Ok(self.buffer.get_pixel(x, y)?)
    }

    /// Turn every buffer pixel off.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Turn every buffer pixel on or off.
    pub fn fill(&mut self, on: bool) {
        self.buffer.fill(on);
    }

    /// Draw one character of `font` with its top left corner at (`x`, `y`). See
    /// `MonoFont::draw_character`.
    pub fn draw_char(
        &mut self,
        font: &MonoFont,
        x: i16,
        y: i16,
        code: u8,
    ) -> Result<(), Error<DI::Error>> {
        Ok(font.draw_character(&mut self.buffer, x, y, code)?)
    }

    /// Draw a single line of text starting with its top left corner at (`x`, `y`), characters
    /// `font.width()` pixels apart, and return the x coordinate just past the last character.
    ///
    /// The whole line is checked before anything is drawn: if any character is missing from the
    /// font (`IndexOutOfRange`) or the line does not fit on the panel (`OutOfBounds`), the buffer
    /// is left unchanged. Text is never wrapped.
    pub fn draw_text(
        &mut self,
        font: &MonoFont,
        x: i16,
        y: i16,
        text: &str,
    ) -> Result<i16, Error<DI::Error>> {
        let mut count = 0i32;
        for ch in text.chars() {
            u8::try_from(ch as u32)
                .ok()
                .and_then(|code| font.glyph_index(code))
                .ok_or(Error::IndexOutOfRange)?;
            count += 1;
        }
        let end = x as i32 + count * font.width() as i32;
        if count > 0
            && (x < 0
                || y < 0
                || end > self.buffer.width() as i32
                || y as i32 + font.height() as i32 > self.buffer.height() as i32)
        {
            return Err(Error::OutOfBounds);
        }

        let mut cursor = x;
        for ch in text.chars() {
            font.draw_character(&mut self.buffer, cursor, y, ch as u8)?;
            cursor += font.width() as i16;
        }
        Ok(cursor)
    }
}

/// Stream `bytes` to the controller as data transactions of up to `DATA_CHUNK_LEN` bytes each,
/// using a fixed stack buffer.
fn send_data<DI, I>(iface: &mut DI, address: u8, mut bytes: I) -> Result<(), Error<DI::Error>>
where
    DI: DisplayInterface,
    I: Iterator<Item = u8>,
{
    let mut buf = [CONTROL_DATA; DATA_CHUNK_LEN + 1];
    loop {
        let mut chunk_len = 0;
        for slot in buf[1..].iter_mut() {
            match bytes.next() {
                Some(b) => {
                    *slot = b;
                    chunk_len += 1;
                }
                None => break,
            }
        }

        if chunk_len > 0 {
            iface
                .send(address, &buf[..chunk_len + 1])
                .map_err(Error::Transport)?;
        }

        // A short chunk means the iterator is exhausted.
        if chunk_len != DATA_CHUNK_LEN {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VccSource;
    use crate::fonts::FONT_5X8;
    use crate::interface::test_spy::{Sent, TestSpyInterface};

    macro_rules! send {
        ([$($d:expr),*]) => {Sent::Data(vec![$($d,)*])};
        (($($c:expr),*)) => {Sent::Cmd(vec![$($c,)*])};
    }
    macro_rules! sends {
        ($($e:tt),*) => {&[$(send!($e),)*]};
    }

    fn display(height: u16) -> (Display<TestSpyInterface>, TestSpyInterface) {
        let di = TestSpyInterface::new();
        let cfg = Config::new(128, height, 0x3C).unwrap();
        (Display::new(di.split(), cfg), di)
    }

    #[test]
    fn new_sends_nothing() {
        let (disp, di) = display(32);
        di.check_multi(&[]);
        assert!(disp.buffer().raw_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn init_128x64() {
        let (mut disp, di) = display(64);
        disp.init().unwrap();
        di.check_multi(sends!(
            (0xAE), // display off
            (0xD5, 0x80), // clock divide
            (0xA8, 63), // multiplex 64 rows
            (0xD3, 0), // display offset 0
            (0x40), // start line 0
            (0x8D, 0x14), // charge pump on
            (0xA1), // segment remap
            (0xC8), // COM scan direction
            (0xDA, 0x12), // COM pins alternative
            (0x81, 0xCF), // contrast
            (0xD9, 0xF1), // precharge
            (0xDB, 0x40), // VCOMH deselect
            (0x20, 0x00), // horizontal addressing
            (0x2E), // deactivate scroll
            (0xA4), // resume from RAM
            (0xA6), // normal display
            (0xAF) // display on
        ));
        assert!(di.addresses().iter().all(|&a| a == 0x3C));
    }

    #[test]
    fn init_128x32_inverted_external_vcc() {
        let di = TestSpyInterface::new();
        let cfg = Config::new(128, 32, 0x3D)
            .unwrap()
            .invert(true)
            .vcc(VccSource::External)
            .orientation(ColumnRemap::Forward, ComScanDirection::RowZeroFirst);
        let mut disp = Display::new(di.split(), cfg);
        disp.init().unwrap();
        di.check_multi(sends!(
            (0xAE), // display off
            (0xD5, 0x80), // clock divide
            (0xA8, 31), // multiplex 32 rows
            (0xD3, 0), // display offset 0
            (0x40), // start line 0
            (0x8D, 0x10), // charge pump off
            (0xA0), // segment remap
            (0xC0), // COM scan direction
            (0xDA, 0x02), // COM pins sequential
            (0x81, 0x9F), // contrast
            (0xD9, 0x22), // precharge
            (0xDB, 0x40), // VCOMH deselect
            (0x20, 0x00), // horizontal addressing
            (0x2E), // deactivate scroll
            (0xA4), // resume from RAM
            (0xA7), // inverted display
            (0xAF) // display on
        ));
        assert!(di.addresses().iter().all(|&a| a == 0x3D));
    }

    #[test]
    fn init_is_repeatable() {
        let (mut disp, di) = display(32);
        disp.init().unwrap();
        let first = di.sent();
        di.clear();
        disp.init().unwrap();
        assert_eq!(di.sent(), first);
    }

    #[test]
    fn mode_toggles() {
        let (mut disp, di) = display(32);
        disp.invert(true).unwrap();
        disp.invert(false).unwrap();
        disp.contrast(0x42).unwrap();
        disp.sleep(true).unwrap();
        disp.sleep(false).unwrap();
        disp.entire_display_on(true).unwrap();
        disp.vertical_pan(8).unwrap();
        assert_eq!(disp.vertical_pan(64), Err(Error::InvalidArgument));
        di.check_multi(sends!(
            (0xA7),
            (0xA6),
            (0x81, 0x42),
            (0xAE),
            (0xAF),
            (0xA5),
            (0x48)
        ));
    }

    #[test]
    fn set_window_validation() {
        let (mut disp, di) = display(32);
        disp.set_window(10, 20, 1, 2).unwrap();
        di.check_multi(sends!((0x21, 10, 20), (0x22, 1, 2)));
        di.clear();

        assert_eq!(disp.set_window(20, 10, 0, 0), Err(Error::InvalidWindow));
        assert_eq!(disp.set_window(0, 128, 0, 0), Err(Error::InvalidWindow));
        assert_eq!(disp.set_window(0, 0, 2, 1), Err(Error::InvalidWindow));
        // Page 4 exists on the controller but not on a 32 row panel.
        assert_eq!(disp.set_window(0, 0, 0, 4), Err(Error::InvalidWindow));
        di.check_multi(&[]);
    }

    #[test]
    fn flush_128x32() {
        let (mut disp, di) = display(32);
        disp.set_pixel(0, 0, true).unwrap();
        disp.set_pixel(127, 31, true).unwrap();
        disp.set_window(0, 0, 0, 0).unwrap();
        di.clear();
        disp.flush().unwrap();

        let sent = di.sent();
        assert_eq!(sent[0], send!((0x21, 0, 127)));
        assert_eq!(sent[1], send!((0x22, 0, 3)));
        assert_eq!(sent.len(), 2 + 512 / DATA_CHUNK_LEN);
        assert!(sent[2..].iter().all(|s| match s {
            Sent::Data(d) => d.len() == DATA_CHUNK_LEN,
            Sent::Cmd(_) => false,
        }));

        let data = di.data_bytes();
        assert_eq!(&data[..], disp.buffer().raw_bytes());
        assert_eq!(data[0], 0x01);
        assert_eq!(data[511], 0x80);
        // Two 4-byte window commands and one control byte per data chunk.
        assert_eq!(di.wire_bytes(), 512 + 8 + 512 / DATA_CHUNK_LEN);
    }

    #[test]
    fn flush_128x64_sends_every_byte() {
        let (mut disp, di) = display(64);
        disp.fill(true);
        disp.flush().unwrap();
        assert_eq!(di.data_bytes(), vec![0xFF; 1024]);
        assert_eq!(di.sent()[1], send!((0x22, 0, 7)));
    }

    #[test]
    fn flush_window_sends_sub_rectangle() {
        let (mut disp, di) = display(32);
        disp.set_pixel(3, 9, true).unwrap();
        disp.set_pixel(4, 17, true).unwrap();
        disp.set_pixel(5, 0, true).unwrap();
        disp.flush_window(3, 4, 1, 2).unwrap();
        di.check_multi(sends!(
            (0x21, 3, 4),
            (0x22, 1, 2),
            [0x02, 0x00, 0x00, 0x02]
        ));

        di.clear();
        assert_eq!(disp.flush_window(3, 4, 3, 4), Err(Error::InvalidWindow));
        di.check_multi(&[]);
    }

    #[test]
    fn flush_window_chunks_long_runs() {
        let (mut disp, di) = display(32);
        disp.fill(true);
        disp.flush_window(0, 39, 0, 0).unwrap();
        di.check_multi(&[
            send!((0x21, 0, 39)),
            send!((0x22, 0, 0)),
            Sent::Data(vec![0xFF; 32]),
            Sent::Data(vec![0xFF; 8]),
        ]);
    }

    #[test]
    fn transport_failure_is_propagated() {
        let di = TestSpyInterface::failing_after(3);
        let mut disp = Display::new(di.split(), Config::new(128, 32, 0x3C).unwrap());
        assert_eq!(disp.init(), Err(Error::Transport(())));
        assert_eq!(di.sent().len(), 3);

        let di = TestSpyInterface::failing_after(4);
        let mut disp = Display::new(di.split(), Config::new(128, 32, 0x3C).unwrap());
        assert_eq!(disp.flush(), Err(Error::Transport(())));
        assert_eq!(di.data_bytes().len(), 2 * DATA_CHUNK_LEN);
    }

    #[test]
    fn draw_errors_leave_buffer_alone() {
        let (mut disp, di) = display(32);
        assert_eq!(disp.set_pixel(128, 0, true), Err(Error::OutOfBounds));
        assert_eq!(disp.set_pixel(0, -1, true), Err(Error::OutOfBounds));
        assert_eq!(disp.get_pixel(0, 32), Err(Error::OutOfBounds));
        assert_eq!(disp.draw_char(&FONT_5X8, 0, 0, b'~'), Err(Error::IndexOutOfRange));
        assert_eq!(disp.draw_char(&FONT_5X8, 124, 0, b'A'), Err(Error::OutOfBounds));
        assert!(disp.buffer().raw_bytes().iter().all(|&b| b == 0));
        di.check_multi(&[]);
    }

    #[test]
    fn draw_text_advances_by_font_width() {
        let (mut disp, _di) = display(32);
        let end = disp.draw_text(&FONT_5X8, 2, 8, "Hi!").unwrap();
        assert_eq!(end, 17);
        let raw = disp.buffer().raw_bytes();
        assert_eq!(&raw[128 + 2..128 + 7], FONT_5X8.glyph_for(b'H').unwrap());
        assert_eq!(&raw[128 + 7..128 + 12], FONT_5X8.glyph_for(b'i').unwrap());
        assert_eq!(&raw[128 + 12..128 + 17], FONT_5X8.glyph_for(b'!').unwrap());
        assert!(raw[..128].iter().all(|&b| b == 0));
        assert!(raw[128 + 17..].iter().all(|&b| b == 0));
        assert_eq!(disp.draw_text(&FONT_5X8, 0, 0, ""), Ok(0));
    }

    #[test]
    fn draw_text_is_all_or_nothing() {
        let (mut disp, _di) = display(32);
        // `{` has no glyph.
        assert_eq!(
            disp.draw_text(&FONT_5X8, 0, 0, "ab{c"),
            Err(Error::IndexOutOfRange)
        );
        assert_eq!(
            disp.draw_text(&FONT_5X8, 0, 0, "caf\u{e9}"),
            Err(Error::IndexOutOfRange)
        );
        // 26 characters need 130 columns.
        assert_eq!(
            disp.draw_text(&FONT_5X8, 0, 0, "abcdefghijklmnopqrstuvwxyz"),
            Err(Error::OutOfBounds)
        );
        assert_eq!(disp.draw_text(&FONT_5X8, 0, 25, "a"), Err(Error::OutOfBounds));
        assert!(disp.buffer().raw_bytes().iter().all(|&b| b == 0));
        assert_eq!(
            disp.draw_text(&FONT_5X8, 3, 24, "abcdefghijklmnopqrstuvwxy"),
            Ok(128)
        );
    }

    #[test]
    fn draw_then_flush_streams_glyph() {
        let (mut disp, di) = display(32);
        disp.draw_char(&FONT_5X8, 0, 0, b'A').unwrap();
        disp.flush().unwrap();
        let data = di.data_bytes();
        assert_eq!(&data[..5], &[0x7E, 0x11, 0x11, 0x11, 0x7E]);
        assert!(data[5..].iter().all(|&b| b == 0));
    }
}
