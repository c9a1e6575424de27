//! Transports that carry controller transactions to the panel.
//!
//! A transaction is a control byte followed by its payload. The control byte is
//! `CONTROL_COMMAND` when the payload is an opcode with its arguments, and `CONTROL_DATA` when
//! the payload is display RAM contents.

/// Control byte tagging the rest of a transaction as command bytes.
pub const CONTROL_COMMAND: u8 = 0x00;
/// Control byte tagging the rest of a transaction as display RAM data.
pub const CONTROL_DATA: u8 = 0x40;

/// The byte-level write capability to a display controller. Implementations must send `bytes` as
/// a single transaction and report failure without retrying.
pub trait DisplayInterface {
    type Error;

    /// Send one transaction, `bytes[0]` being the control byte, to the controller at `address`.
    /// An empty `bytes` is not a transaction; it succeeds without touching the bus.
    fn send(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error>;
}

pub mod i2c {
    //! The I2C interface writes each transaction verbatim, so the control byte is the first byte
    //! after the address on the wire.

    use super::DisplayInterface;

    pub struct I2cInterface<I2C> {
        /// The I2C master the SSD1306 is attached to.
        i2c: I2C,
    }

    impl<I2C> I2cInterface<I2C>
    where
        I2C: hal::blocking::i2c::Write,
    {
        /// Create a new I2C interface to communicate with the display driver.
        pub fn new(i2c: I2C) -> Self {
            Self { i2c }
        }

        /// Give back the I2C master.
        pub fn release(self) -> I2C {
            self.i2c
        }
    }

    impl<I2C> DisplayInterface for I2cInterface<I2C>
    where
        I2C: hal::blocking::i2c::Write,
    {
        type Error = I2C::Error;

        fn send(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
            if bytes.is_empty() {
                return Ok(());
            }
            self.i2c.write(address, bytes)
        }
    }
}

pub mod spi {
    //! The SPI interface supports the "4-wire" interface of the driver, such that each word on the
    //! SPI bus is 8 bits. The control byte of each transaction selects the level of the D/C pin
    //! and is not itself clocked out; the bus address has no meaning here and is ignored.

    use super::{DisplayInterface, CONTROL_DATA};

    /// Failure of either half of the 4-wire interface.
    #[derive(Debug, PartialEq)]
    pub enum SpiError<S, P> {
        Spi(S),
        Pin(P),
    }

    pub struct SpiInterface<SPI, DC> {
        /// The SPI master device connected to the SSD1306.
        spi: SPI,
        /// A GPIO output pin connected to the D/C (data/command) pin of the SSD1306.
        dc: DC,
    }

    impl<SPI, DC> SpiInterface<SPI, DC>
    where
        SPI: hal::blocking::spi::Write<u8>,
        DC: hal::digital::v2::OutputPin,
    {
        /// Create a new SPI interface to communicate with the display driver. `spi` is the SPI
        /// master device, and `dc` is the GPIO output pin connected to the D/C pin of the SSD1306.
        pub fn new(spi: SPI, dc: DC) -> Self {
            Self { spi, dc }
        }

        /// Give back the SPI master and D/C pin.
        pub fn release(self) -> (SPI, DC) {
            (self.spi, self.dc)
        }
    }

    impl<SPI, DC> DisplayInterface for SpiInterface<SPI, DC>
    where
        SPI: hal::blocking::spi::Write<u8>,
        DC: hal::digital::v2::OutputPin,
    {
        type Error = SpiError<SPI::Error, DC::Error>;

        fn send(&mut self, _address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
            let (control, payload) = match bytes.split_first() {
                Some(split) => split,
                None => return Ok(()),
            };
            if control & CONTROL_DATA != 0 {
                self.dc.set_high().map_err(SpiError::Pin)?;
            } else {
                self.dc.set_low().map_err(SpiError::Pin)?;
            }
            self.spi.write(payload).map_err(SpiError::Spi)
        }
    }
}
