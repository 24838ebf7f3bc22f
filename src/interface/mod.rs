//! Bus interface abstraction for the HTS221 driver.
//!
//! Every read issued by the driver is "address the register, then read without
//! releasing the bus". Implementations fold both steps into a single call so the
//! framing (repeated start on I²C, one chip-select window on SPI) stays with the
//! transport.

pub mod i2c;
pub mod spi;

pub use self::i2c::I2cInterface;
pub use self::spi::SpiInterface;

/// Abstraction over the low-level bus access required by the driver.
pub trait Hts221Interface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Writes a single register.
    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error>;

    /// Reads a single register.
    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error>;

    /// Reads consecutive registers starting at `register` using the device's
    /// address auto-increment.
    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error>;
}
