//! SPI interface implementation built on top of `embedded-hal` `SpiDevice`.

use embedded_hal::spi::{Operation, SpiDevice};

use super::Hts221Interface;

// Command byte layout: bit 7 selects read, bit 6 selects address auto-increment.
const SPI_READ: u8 = 0x80;
const SPI_AUTO_INCREMENT: u8 = 0x40;
const SPI_ADDRESS_MASK: u8 = 0x3F;

/// SPI-based interface implementation for the HTS221 driver.
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Creates a new interface from the provided SPI device abstraction.
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Builds the command byte used to address registers over SPI.
    fn command_byte(register: u8, is_read: bool, auto_increment: bool) -> u8 {
        let mut command = register & SPI_ADDRESS_MASK;
        if is_read {
            command |= SPI_READ;
        }
        if auto_increment {
            command |= SPI_AUTO_INCREMENT;
        }
        command
    }

    /// Provides mutable access to the wrapped SPI device.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the interface and returns the owned SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    fn read_with_command(&mut self, command: u8, buf: &mut [u8]) -> core::result::Result<(), SPI::Error> {
        let command = [command];
        let mut operations = [Operation::Write(&command), Operation::Read(buf)];
        self.spi.transaction(&mut operations)
    }
}

impl<SPI> Hts221Interface for SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error> {
        let frame = [Self::command_byte(register, false, false), value];
        self.spi.write(&frame)
    }

    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error> {
        let mut value = [0u8; 1];
        self.read_with_command(Self::command_byte(register, true, false), &mut value)?;
        Ok(value[0])
    }

    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        if buf.is_empty() {
            return Ok(());
        }

        self.read_with_command(Self::command_byte(register, true, true), buf)
    }
}

#[cfg(test)]
mod tests {
    use super::SpiInterface;
    use crate::interface::Hts221Interface;
    use core::convert::Infallible;
    use embedded_hal::spi::{ErrorType, Operation, SpiDevice};

    struct MockDevice<'a> {
        expectations: &'a [TransactionExpectation<'a>],
        index: usize,
    }

    impl<'a> MockDevice<'a> {
        fn new(expectations: &'a [TransactionExpectation<'a>]) -> Self {
            Self { expectations, index: 0 }
        }
    }

    impl<'a> Drop for MockDevice<'a> {
        fn drop(&mut self) {
            assert_eq!(
                self.index,
                self.expectations.len(),
                "not all SPI expectations consumed"
            );
        }
    }

    impl<'a> ErrorType for MockDevice<'a> {
        type Error = Infallible;
    }

    impl<'a> SpiDevice for MockDevice<'a> {
        fn transaction<'b>(
            &mut self,
            operations: &mut [Operation<'b, u8>],
        ) -> Result<(), Self::Error> {
            let expected = self
                .expectations
                .get(self.index)
                .expect("unexpected SPI transaction");
            self.index += 1;

            match *expected {
                TransactionExpectation::Read { command, response } => {
                    assert_eq!(operations.len(), 2, "expected write+read operations");
                    let (first, rest) = operations.split_first_mut().expect("missing first op");
                    match first {
                        Operation::Write(data) => {
                            assert_eq!(*data, &[command][..], "command byte mismatch");
                        }
                        _ => panic!("first operation must be write"),
                    }

                    match rest.first_mut().expect("missing second op") {
                        Operation::Read(buf) => {
                            assert_eq!(buf.len(), response.len(), "response length mismatch");
                            buf.copy_from_slice(response);
                        }
                        _ => panic!("second operation must be read"),
                    }
                }
                TransactionExpectation::Write { frame } => {
                    assert_eq!(operations.len(), 1, "expected a single write operation");
                    match &operations[0] {
                        Operation::Write(data) => {
                            assert_eq!(*data, frame, "frame mismatch");
                        }
                        _ => panic!("operation must be write"),
                    }
                }
            }

            Ok(())
        }
    }

    #[derive(Clone, Copy)]
    enum TransactionExpectation<'a> {
        Read { command: u8, response: &'a [u8] },
        Write { frame: &'a [u8] },
    }

    #[test]
    fn read_register_sets_read_bit_only() {
        let expectations = [TransactionExpectation::Read {
            command: 0x8F,
            response: &[0xBC],
        }];
        let mut interface = SpiInterface::new(MockDevice::new(&expectations));

        assert_eq!(interface.read_register(0x0F).unwrap(), 0xBC);
    }

    #[test]
    fn read_many_sets_read_and_auto_increment_bits() {
        let expectations = [TransactionExpectation::Read {
            command: 0xE8,
            response: &[0x34, 0x12],
        }];
        let mut interface = SpiInterface::new(MockDevice::new(&expectations));

        let mut buffer = [0u8; 2];
        interface.read_many(0x28, &mut buffer).unwrap();
        assert_eq!(buffer, [0x34, 0x12]);
    }

    #[test]
    fn write_register_sends_command_and_value_in_one_frame() {
        let expectations = [TransactionExpectation::Write {
            frame: &[0x20, 0x87],
        }];
        let mut interface = SpiInterface::new(MockDevice::new(&expectations));

        interface.write_register(0x20, 0x87).unwrap();
    }

    #[test]
    fn read_many_ignores_empty_buffer() {
        let expectations: [TransactionExpectation; 0] = [];
        let mut interface = SpiInterface::new(MockDevice::new(&expectations));

        interface.read_many(0x30, &mut []).unwrap();
    }
}
