//! High-level HTS221 device driver implementation.

use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;

use crate::calibration::{Calibration, InvalidCalibration};
use crate::config::{Averaging, Config};
use crate::error::{Error, Result};
use crate::interface::{Hts221Interface, I2cInterface, SpiInterface};
use crate::params::{
    BlockDataUpdate, Boot, DataReadyEnable, DataReadyLevel, FieldValue, Heater,
    HumidityAveraging, OneShot, OutputDataRate, PinMode, PowerMode, TemperatureAveraging,
};
use crate::registers::{
    AvConf, CtrlReg1, CtrlReg2, CtrlReg3, Register, RegisterAccess, RegisterField, Status,
    AV_CONF_AVGH, AV_CONF_AVGT, CALIBRATION_BLOCK_LEN, EXPECTED_WHO_AM_I, REG_AV_CONF,
    REG_CALIB_0, REG_CTRL_REG1, REG_HUMIDITY_OUT_L, REG_TEMP_OUT_L, REG_WHO_AM_I, STATUS_H_DA,
    STATUS_T_DA,
};

// Both averaging fields, for updating AV_CONF in a single read-modify-write.
const AV_CONF_AVG: RegisterField = RegisterField::new(REG_AV_CONF, AV_CONF_AVGT.mask | AV_CONF_AVGH.mask);

/// High-level synchronous driver for the HTS221 humidity and temperature sensor.
///
/// The driver owns the bus interface and nothing else: getters always read the
/// device and setters perform a read-modify-write of a single register. The read
/// and the write of a setter are separate bus transactions, so when the bus is
/// shared the caller must keep other writers away from the device for the whole
/// call (for example with an `embedded-hal-bus` device wrapper around a mutex).
///
/// Calibration coefficients are not cached either; read them once with
/// [`Hts221::read_calibration`] and pass them to the conversion helpers.
pub struct Hts221<IFACE> {
    interface: IFACE,
}

/// View of `STATUS_REG` with explicit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusSnapshot {
    /// STATUS_REG[1] H_DA.
    pub humidity_available: bool,
    /// STATUS_REG[0] T_DA.
    pub temperature_available: bool,
}

impl From<Status> for StatusSnapshot {
    fn from(status: Status) -> Self {
        Self {
            humidity_available: status.humidity_available(),
            temperature_available: status.temperature_available(),
        }
    }
}

impl<IFACE> Hts221<IFACE> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new driver instance from the provided bus interface.
    pub fn new(interface: IFACE) -> Self {
        Self { interface }
    }

    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> IFACE {
        self.interface
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }
}

impl<I2C> Hts221<I2cInterface<I2C>>
where
    I2C: I2c,
{
    // ==================================================================
    // == Bus Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for I²C transports at the default address.
    pub fn new_i2c(i2c: I2C) -> Self {
        Self::new(I2cInterface::new(i2c))
    }

    /// Convenience constructor for I²C transports at a custom address.
    pub fn new_i2c_with_address(i2c: I2C, address: u8) -> Self {
        Self::new(I2cInterface::with_address(i2c, address))
    }

    /// Releases the driver, returning the I²C bus.
    pub fn release_i2c(self) -> I2C {
        self.release().release()
    }
}

impl<SPI> Hts221<SpiInterface<SPI>>
where
    SPI: SpiDevice,
{
    /// Convenience constructor for SPI transports.
    pub fn new_spi(spi: SPI) -> Self {
        Self::new(SpiInterface::new(spi))
    }

    /// Releases the driver, returning the SPI device.
    pub fn release_spi(self) -> SPI {
        self.release().release()
    }
}

impl<IFACE, CommE> Hts221<IFACE>
where
    IFACE: Hts221Interface<Error = CommE>,
{
    // ==================================================================
    // == Identification & Status =======================================
    // ==================================================================
    /// Reads the `WHO_AM_I` register.
    pub fn device_id(&mut self) -> Result<u8, CommE> {
        self.interface
            .read_register(REG_WHO_AM_I)
            .map_err(Error::from)
    }

    /// Verifies `WHO_AM_I` against the HTS221 identifier.
    pub fn check_id(&mut self) -> Result<(), CommE> {
        let id = self.device_id()?;
        if id != EXPECTED_WHO_AM_I {
            warn!("unexpected WHO_AM_I {=u8:#x}", id);
            return Err(Error::DeviceIdMismatch(id));
        }
        Ok(())
    }

    /// Returns a snapshot of `STATUS_REG`.
    pub fn read_status(&mut self) -> Result<StatusSnapshot, CommE> {
        self.read_register_as::<Status>().map(StatusSnapshot::from)
    }

    /// Returns `true` when a new humidity sample is available.
    pub fn humidity_data_available(&mut self) -> Result<bool, CommE> {
        Ok(self.read_field(STATUS_H_DA)? != 0)
    }

    /// Returns `true` when a new temperature sample is available.
    pub fn temperature_data_available(&mut self) -> Result<bool, CommE> {
        Ok(self.read_field(STATUS_T_DA)? != 0)
    }

    // ==================================================================
    // == Register Access ===============================================
    // ==================================================================
    /// Replaces the bits of `field` with `value` and leaves every other bit of
    /// the register as read from the device.
    ///
    /// `value` is expected in register position (already shifted); bits outside
    /// `field.mask` are discarded. The register is written back even if the
    /// value does not change, so self-clearing trigger bits can be re-armed. If
    /// the read fails nothing is written.
    pub fn modify_field(&mut self, field: RegisterField, value: u8) -> Result<(), CommE> {
        let current = self
            .interface
            .read_register(field.address)
            .map_err(Error::from)?;

        let updated = field.apply(current, value);
        trace!(
            "reg {=u8:#x}: {=u8:#x} -> {=u8:#x}",
            field.address,
            current,
            updated
        );

        self.interface
            .write_register(field.address, updated)
            .map_err(Error::from)
    }

    /// Reads `field`, normalized to bit 0.
    pub fn read_field(&mut self, field: RegisterField) -> Result<u8, CommE> {
        let current = self
            .interface
            .read_register(field.address)
            .map_err(Error::from)?;

        Ok(field.extract(current))
    }

    /// Reads `buf.len()` consecutive registers starting at `start` in one bus
    /// transaction.
    pub fn read_block(&mut self, start: u8, buf: &mut [u8]) -> Result<(), CommE> {
        self.interface
            .read_many(start, buf)
            .map_err(Error::from)
    }

    /// Writes a typed field value.
    pub fn set<F: FieldValue>(&mut self, value: F) -> Result<(), CommE> {
        self.modify_field(F::FIELD, value.register_bits())
    }

    /// Reads a typed field value.
    pub fn get<F: FieldValue>(&mut self) -> Result<F, CommE> {
        self.read_field(F::FIELD).map(F::from_bits)
    }

    // ==================================================================
    // == Configuration =================================================
    // ==================================================================
    /// Applies a full configuration: one read-modify-write per configuration
    /// register, reserved bits preserved.
    pub fn configure(&mut self, config: &Config) -> Result<(), CommE> {
        self.update_register::<AvConf, _>(|reg| config.apply_av_conf(reg))?;
        self.update_register::<CtrlReg1, _>(|reg| config.apply_ctrl_reg1(reg))?;
        self.update_register::<CtrlReg2, _>(|reg| config.apply_ctrl_reg2(reg))?;
        self.update_register::<CtrlReg3, _>(|reg| config.apply_ctrl_reg3(reg))?;
        Ok(())
    }

    /// Reads the configuration currently programmed into the device.
    pub fn read_config(&mut self) -> Result<Config, CommE> {
        let av_conf = self.read_register_as::<AvConf>()?;

        let mut ctrl = [0u8; 3];
        self.read_block(REG_CTRL_REG1, &mut ctrl)?;

        Ok(Config::from_registers(
            av_conf,
            CtrlReg1::from(ctrl[0]),
            CtrlReg2::from(ctrl[1]),
            CtrlReg3::from(ctrl[2]),
        ))
    }

    /// Reads both averaging selections.
    pub fn averaging(&mut self) -> Result<Averaging, CommE> {
        let av_conf = self.read_register_as::<AvConf>()?;
        Ok(Averaging {
            temperature: av_conf.avg_t(),
            humidity: av_conf.avg_h(),
        })
    }

    /// Updates both averaging selections with a single read-modify-write.
    pub fn set_averaging(&mut self, averaging: Averaging) -> Result<(), CommE> {
        self.modify_field(
            AV_CONF_AVG,
            averaging.temperature.register_bits() | averaging.humidity.register_bits(),
        )
    }

    /// Reloads the trimming parameters from non-volatile memory.
    pub fn reboot(&mut self) -> Result<(), CommE> {
        self.set(Boot::Reboot)
    }

    /// Starts a single conversion. Only meaningful in one-shot mode.
    pub fn trigger_one_shot(&mut self) -> Result<(), CommE> {
        self.set(OneShot::Start)
    }

    // ==================================================================
    // == Data Acquisition & Calibration ================================
    // ==================================================================
    /// Reads the raw humidity output (`HUMIDITY_OUT_L/H`).
    pub fn raw_humidity(&mut self) -> Result<i16, CommE> {
        self.read_word(REG_HUMIDITY_OUT_L)
    }

    /// Reads the raw temperature output (`TEMP_OUT_L/H`).
    pub fn raw_temperature(&mut self) -> Result<i16, CommE> {
        self.read_word(REG_TEMP_OUT_L)
    }

    /// Reads and decodes the factory calibration block.
    ///
    /// A block that cannot be interpolated is still returned; conversions with
    /// it fail with [`Error::CalibrationInvalid`].
    pub fn read_calibration(&mut self) -> Result<Calibration, CommE> {
        let mut raw = [0u8; CALIBRATION_BLOCK_LEN];
        self.read_block(REG_CALIB_0, &mut raw)?;

        let calibration = Calibration::from_bytes(&raw);
        debug!(
            "calibration: t0 {=i16} degC @ {=i16}, t1 {=i16} degC @ {=i16}",
            calibration.t0_deg_c,
            calibration.t0_out,
            calibration.t1_deg_c,
            calibration.t1_out
        );
        if calibration.validate().is_err() {
            warn!("calibration block has a zero interpolation span");
        }

        Ok(calibration)
    }

    /// Reads the temperature in whole degrees Celsius.
    pub fn temperature(&mut self, calibration: &Calibration) -> Result<i32, CommE> {
        let raw = self.raw_temperature()?;
        calibration.temperature(raw).map_err(invalid_calibration)
    }

    /// Reads the temperature in tenths of a degree Celsius.
    pub fn temperature_deci(&mut self, calibration: &Calibration) -> Result<i32, CommE> {
        let raw = self.raw_temperature()?;
        calibration.temperature_deci(raw).map_err(invalid_calibration)
    }

    /// Reads the relative humidity in whole percent, clamped to `0..=100`.
    pub fn humidity(&mut self, calibration: &Calibration) -> Result<u8, CommE> {
        let raw = self.raw_humidity()?;
        calibration.humidity(raw).map_err(invalid_calibration)
    }

    /// Reads the relative humidity in tenths of a percent, clamped to `0..=1000`.
    pub fn humidity_deci(&mut self, calibration: &Calibration) -> Result<u16, CommE> {
        let raw = self.raw_humidity()?;
        calibration.humidity_deci(raw).map_err(invalid_calibration)
    }

    // ==================================================================
    // == Internal Helpers ==============================================
    // ==================================================================
    #[inline]
    fn read_word(&mut self, start: u8) -> Result<i16, CommE> {
        let mut raw = [0u8; 2];
        self.read_block(start, &mut raw)?;
        Ok(i16::from_le_bytes(raw))
    }

    fn read_register_as<R: Register>(&mut self) -> Result<R, CommE> {
        self.interface
            .read_register(R::ADDRESS)
            .map(R::from)
            .map_err(Error::from)
    }

    fn update_register<R, F>(&mut self, mutate: F) -> Result<R, CommE>
    where
        R: Register,
        F: FnOnce(&mut R),
    {
        debug_assert!(R::ACCESS == RegisterAccess::ReadWrite);

        let current = self
            .interface
            .read_register(R::ADDRESS)
            .map_err(Error::from)?;

        let mut register = R::from(current);
        mutate(&mut register);

        let updated: u8 = register.into();
        trace!(
            "reg {=u8:#x}: {=u8:#x} -> {=u8:#x}",
            R::ADDRESS,
            current,
            updated
        );
        self.interface
            .write_register(R::ADDRESS, updated)
            .map_err(Error::from)?;

        Ok(register)
    }
}

fn invalid_calibration<E>(_: InvalidCalibration) -> Error<E> {
    Error::CalibrationInvalid
}

macro_rules! field_accessors {
    ($($setter:ident / $getter:ident: $ty:ty, $what:literal;)+) => {
        impl<IFACE, CommE> Hts221<IFACE>
        where
            IFACE: Hts221Interface<Error = CommE>,
        {
            $(
                #[doc = concat!("Sets the ", $what, ".")]
                pub fn $setter(&mut self, value: $ty) -> Result<(), CommE> {
                    self.set(value)
                }

                #[doc = concat!("Reads the ", $what, ".")]
                pub fn $getter(&mut self) -> Result<$ty, CommE> {
                    self.get::<$ty>()
                }
            )+
        }
    };
}

field_accessors! {
    set_temperature_averaging / temperature_averaging: TemperatureAveraging, "temperature averaging (`AV_CONF[5:3]`)";
    set_humidity_averaging / humidity_averaging: HumidityAveraging, "humidity averaging (`AV_CONF[2:0]`)";
    set_power_mode / power_mode: PowerMode, "power-down control (`CTRL_REG1.PD`)";
    set_block_data_update / block_data_update: BlockDataUpdate, "block data update mode (`CTRL_REG1.BDU`)";
    set_output_data_rate / output_data_rate: OutputDataRate, "output data rate (`CTRL_REG1.ODR`)";
    set_boot / boot: Boot, "reboot memory content bit (`CTRL_REG2.BOOT`)";
    set_heater / heater: Heater, "heater control (`CTRL_REG2.Heater`)";
    set_one_shot / one_shot: OneShot, "one-shot trigger bit (`CTRL_REG2.ONE_SHOT`)";
    set_data_ready_level / data_ready_level: DataReadyLevel, "data-ready output level (`CTRL_REG3.DRDY_H_L`)";
    set_pin_mode / pin_mode: PinMode, "DRDY pin drive mode (`CTRL_REG3.PP_OD`)";
    set_data_ready_enable / data_ready_enable: DataReadyEnable, "data-ready enable (`CTRL_REG3.DRDY_EN`)";
}
