//! I²C interface implementation built on top of `embedded-hal` `I2c`.

use embedded_hal::i2c::I2c;

use super::Hts221Interface;
use crate::registers::I2C_AUTO_INCREMENT;

/// Fixed 7-bit I²C address of the HTS221.
pub const DEFAULT_ADDRESS: u8 = 0x5F;

/// I²C-based interface implementation for the HTS221 driver.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Creates a new interface talking to the device at [`DEFAULT_ADDRESS`].
    pub const fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Creates a new interface talking to the device at `address`.
    pub const fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Returns the 7-bit device address in use.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Provides mutable access to the wrapped I²C bus.
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consumes the interface and returns the owned I²C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Hts221Interface for I2cInterface<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error> {
        self.i2c.write(self.address, &[register, value])
    }

    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error> {
        let mut value = [0u8; 1];
        self.i2c.write_read(self.address, &[register], &mut value)?;
        Ok(value[0])
    }

    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        if buf.is_empty() {
            return Ok(());
        }

        self.i2c
            .write_read(self.address, &[register | I2C_AUTO_INCREMENT], buf)
    }
}

#[cfg(test)]
mod tests {
    use super::{I2cInterface, DEFAULT_ADDRESS};
    use crate::interface::Hts221Interface;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    #[test]
    fn read_register_uses_plain_sub_address() {
        let expectations = [Transaction::write_read(DEFAULT_ADDRESS, vec![0x0F], vec![0xBC])];
        let mut mock = I2cMock::new(&expectations);
        let mut interface = I2cInterface::new(mock.clone());

        assert_eq!(interface.read_register(0x0F).unwrap(), 0xBC);
        mock.done();
    }

    #[test]
    fn read_many_sets_auto_increment_bit() {
        let expectations = [Transaction::write_read(
            DEFAULT_ADDRESS,
            vec![0xA8],
            vec![0x34, 0x12],
        )];
        let mut mock = I2cMock::new(&expectations);
        let mut interface = I2cInterface::new(mock.clone());

        let mut buffer = [0u8; 2];
        interface.read_many(0x28, &mut buffer).unwrap();
        assert_eq!(buffer, [0x34, 0x12]);
        mock.done();
    }

    #[test]
    fn write_register_sends_address_and_value() {
        let expectations = [Transaction::write(0x10, vec![0x20, 0x85])];
        let mut mock = I2cMock::new(&expectations);
        let mut interface = I2cInterface::with_address(mock.clone(), 0x10);

        interface.write_register(0x20, 0x85).unwrap();
        assert_eq!(interface.address(), 0x10);
        mock.done();
    }

    #[test]
    fn read_many_ignores_empty_buffer() {
        let mut mock = I2cMock::new(&[]);
        let mut interface = I2cInterface::new(mock.clone());

        interface.read_many(0x30, &mut []).unwrap();
        mock.done();
    }

    #[test]
    fn bus_errors_are_forwarded() {
        let expectations = [
            Transaction::write_read(DEFAULT_ADDRESS, vec![0x27], vec![0x00])
                .with_error(ErrorKind::Other),
        ];
        let mut mock = I2cMock::new(&expectations);
        let mut interface = I2cInterface::new(mock.clone());

        assert_eq!(interface.read_register(0x27), Err(ErrorKind::Other));
        mock.done();
    }
}
