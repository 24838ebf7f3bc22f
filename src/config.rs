//! Configuration primitives for the HTS221 driver.
//!
//! A [`Config`] is a plain value: [`Hts221::configure`](crate::Hts221::configure)
//! writes it out and [`Hts221::read_config`](crate::Hts221::read_config) reads
//! the live state back. The driver never keeps a copy.

use crate::params::{
    BlockDataUpdate, Boot, DataReadyEnable, DataReadyLevel, Heater, HumidityAveraging, OneShot,
    OutputDataRate, PinMode, PowerMode, TemperatureAveraging,
};
use crate::registers::{AvConf, CtrlReg1, CtrlReg2, CtrlReg3};

/// Internal averaging applied to both channels (`AV_CONF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Averaging {
    /// Temperature averaging selection.
    pub temperature: TemperatureAveraging,
    /// Humidity averaging selection.
    pub humidity: HumidityAveraging,
}

impl Default for Averaging {
    fn default() -> Self {
        Self {
            temperature: TemperatureAveraging::Avg16,
            humidity: HumidityAveraging::Avg32,
        }
    }
}

/// User-facing configuration for the HTS221 sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Internal averaging.
    pub averaging: Averaging,
    /// Power-down or active mode.
    pub power_mode: PowerMode,
    /// Output register update policy.
    pub block_data_update: BlockDataUpdate,
    /// Output data rate selection.
    pub odr: OutputDataRate,
    /// Internal heater.
    pub heater: Heater,
    /// Active level of the DRDY pin.
    pub data_ready_level: DataReadyLevel,
    /// Drive mode of the DRDY pin.
    pub pin_mode: PinMode,
    /// Routing of the data-ready signal to the DRDY pin.
    pub data_ready: DataReadyEnable,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Writes the `AV_CONF` fields into `reg`, leaving reserved bits untouched.
    pub(crate) fn apply_av_conf(&self, reg: &mut AvConf) {
        reg.set_avg_t(self.averaging.temperature);
        reg.set_avg_h(self.averaging.humidity);
    }

    /// Writes the `CTRL_REG1` fields into `reg`, leaving reserved bits untouched.
    pub(crate) fn apply_ctrl_reg1(&self, reg: &mut CtrlReg1) {
        reg.set_power(self.power_mode);
        reg.set_bdu(self.block_data_update);
        reg.set_odr(self.odr);
    }

    /// Writes the `CTRL_REG2` heater field into `reg`. Boot and one-shot are
    /// triggers, not configuration, and are written as zero.
    pub(crate) fn apply_ctrl_reg2(&self, reg: &mut CtrlReg2) {
        reg.set_heater(self.heater);
        reg.set_boot(Boot::Normal);
        reg.set_one_shot(OneShot::Idle);
    }

    /// Writes the `CTRL_REG3` fields into `reg`, leaving reserved bits untouched.
    pub(crate) fn apply_ctrl_reg3(&self, reg: &mut CtrlReg3) {
        reg.set_data_ready_level(self.data_ready_level);
        reg.set_pin_mode(self.pin_mode);
        reg.set_data_ready(self.data_ready);
    }

    /// Rebuilds a configuration from the four configuration registers.
    pub(crate) fn from_registers(
        av_conf: AvConf,
        ctrl1: CtrlReg1,
        ctrl2: CtrlReg2,
        ctrl3: CtrlReg3,
    ) -> Self {
        Self {
            averaging: Averaging {
                temperature: av_conf.avg_t(),
                humidity: av_conf.avg_h(),
            },
            power_mode: ctrl1.power(),
            block_data_update: ctrl1.bdu(),
            odr: ctrl1.odr(),
            heater: ctrl2.heater(),
            data_ready_level: ctrl3.data_ready_level(),
            pin_mode: ctrl3.pin_mode(),
            data_ready: ctrl3.data_ready(),
        }
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the temperature averaging.
    pub fn temperature_averaging(mut self, averaging: TemperatureAveraging) -> Self {
        self.config.averaging.temperature = averaging;
        self
    }

    /// Overrides the humidity averaging.
    pub fn humidity_averaging(mut self, averaging: HumidityAveraging) -> Self {
        self.config.averaging.humidity = averaging;
        self
    }

    /// Selects power-down or active mode.
    pub fn power_mode(mut self, mode: PowerMode) -> Self {
        self.config.power_mode = mode;
        self
    }

    /// Selects the output register update policy.
    pub fn block_data_update(mut self, bdu: BlockDataUpdate) -> Self {
        self.config.block_data_update = bdu;
        self
    }

    /// Overrides the output data rate.
    pub fn odr(mut self, odr: OutputDataRate) -> Self {
        self.config.odr = odr;
        self
    }

    /// Enables or disables the heater.
    pub fn heater(mut self, heater: Heater) -> Self {
        self.config.heater = heater;
        self
    }

    /// Configures the DRDY pin: active level, drive mode and whether the
    /// data-ready signal is routed to it.
    pub fn data_ready(
        mut self,
        enable: DataReadyEnable,
        level: DataReadyLevel,
        pin_mode: PinMode,
    ) -> Self {
        self.config.data_ready = enable;
        self.config.data_ready_level = level;
        self.config.pin_mode = pin_mode;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Matches the datasheet reset state.
impl Default for Config {
    fn default() -> Self {
        Self {
            averaging: Averaging::default(),
            power_mode: PowerMode::PowerDown,
            block_data_update: BlockDataUpdate::Continuous,
            odr: OutputDataRate::OneShot,
            heater: Heater::Disabled,
            data_ready_level: DataReadyLevel::ActiveHigh,
            pin_mode: PinMode::PushPull,
            data_ready: DataReadyEnable::Disabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::Register;

    #[test]
    fn default_matches_reset_registers() {
        let config = Config::from_registers(
            AvConf::from(AvConf::RESET_VALUE),
            CtrlReg1::from(CtrlReg1::RESET_VALUE),
            CtrlReg2::from(CtrlReg2::RESET_VALUE),
            CtrlReg3::from(CtrlReg3::RESET_VALUE),
        );
        assert_eq!(config, Config::default());
    }

    #[test]
    fn builder_overrides_selected_fields() {
        let config = Config::new()
            .power_mode(PowerMode::Active)
            .odr(OutputDataRate::Hz12_5)
            .block_data_update(BlockDataUpdate::Block)
            .humidity_averaging(HumidityAveraging::Avg4)
            .build();

        assert_eq!(config.power_mode, PowerMode::Active);
        assert_eq!(config.odr, OutputDataRate::Hz12_5);
        assert_eq!(config.block_data_update, BlockDataUpdate::Block);
        assert_eq!(config.averaging.humidity, HumidityAveraging::Avg4);
        assert_eq!(config.averaging.temperature, TemperatureAveraging::Avg16);
        assert_eq!(config.heater, Heater::Disabled);
    }

    #[test]
    fn apply_then_read_back_is_identity() {
        let config = Config::new()
            .temperature_averaging(TemperatureAveraging::Avg64)
            .power_mode(PowerMode::Active)
            .odr(OutputDataRate::Hz1)
            .heater(Heater::Enabled)
            .data_ready(
                DataReadyEnable::Enabled,
                DataReadyLevel::ActiveLow,
                PinMode::OpenDrain,
            )
            .build();

        let mut av_conf = AvConf::from(0xC0);
        let mut ctrl1 = CtrlReg1::from(0x00);
        let mut ctrl2 = CtrlReg2::from(0x00);
        let mut ctrl3 = CtrlReg3::from(0x00);
        config.apply_av_conf(&mut av_conf);
        config.apply_ctrl_reg1(&mut ctrl1);
        config.apply_ctrl_reg2(&mut ctrl2);
        config.apply_ctrl_reg3(&mut ctrl3);

        assert_eq!(u8::from(av_conf), 0xC0 | 0b101_011);
        assert_eq!(u8::from(ctrl1), 0x81);
        assert_eq!(u8::from(ctrl2), 0x02);
        assert_eq!(u8::from(ctrl3), 0xC4);
        assert_eq!(Config::from_registers(av_conf, ctrl1, ctrl2, ctrl3), config);
    }
}
