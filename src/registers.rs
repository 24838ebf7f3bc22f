//! Register map definitions for the HTS221 humidity and temperature sensor.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::{
    BlockDataUpdate, Boot, DataReadyEnable, DataReadyLevel, Heater, HumidityAveraging, OneShot,
    OutputDataRate, PinMode, PowerMode, TemperatureAveraging,
};

/// Register address of `WHO_AM_I`.
pub const REG_WHO_AM_I: u8 = 0x0F;
/// Register address of `AV_CONF`.
pub const REG_AV_CONF: u8 = 0x10;
/// Register address of `CTRL_REG1`.
pub const REG_CTRL_REG1: u8 = 0x20;
/// Register address of `CTRL_REG2`.
pub const REG_CTRL_REG2: u8 = 0x21;
/// Register address of `CTRL_REG3`.
pub const REG_CTRL_REG3: u8 = 0x22;
/// Register address of `STATUS_REG`.
pub const REG_STATUS: u8 = 0x27;
/// Register address of `HUMIDITY_OUT_L`.
pub const REG_HUMIDITY_OUT_L: u8 = 0x28;
/// Register address of `HUMIDITY_OUT_H`.
pub const REG_HUMIDITY_OUT_H: u8 = 0x29;
/// Register address of `TEMP_OUT_L`.
pub const REG_TEMP_OUT_L: u8 = 0x2A;
/// Register address of `TEMP_OUT_H`.
pub const REG_TEMP_OUT_H: u8 = 0x2B;
/// First register of the factory calibration block (`H0_rH_x2`).
pub const REG_CALIB_0: u8 = 0x30;
/// Number of registers in the calibration block (`0x30..=0x3F`).
pub const CALIBRATION_BLOCK_LEN: usize = 16;

/// Value reported by `WHO_AM_I`.
pub const EXPECTED_WHO_AM_I: u8 = 0xBC;

/// Sub-address bit requesting address auto-increment on I²C.
pub const I2C_AUTO_INCREMENT: u8 = 0x80;

/// A single logical setting: its register, its bit mask and the position of the
/// mask's lowest bit.
///
/// Fields are contiguous. Masks of distinct fields in the same register never
/// overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterField {
    /// Register address.
    pub address: u8,
    /// Bits owned by the field, in register position.
    pub mask: u8,
    /// Position of the least significant bit of `mask`.
    pub shift: u8,
}

impl RegisterField {
    /// Describes the field covering `mask` inside the register at `address`.
    pub const fn new(address: u8, mask: u8) -> Self {
        Self {
            address,
            mask,
            shift: mask.trailing_zeros() as u8,
        }
    }

    /// Number of bits covered by the field.
    pub const fn width(self) -> u32 {
        self.mask.count_ones()
    }

    /// Mask of the field once shifted down to bit 0.
    pub const fn value_mask(self) -> u8 {
        self.mask >> self.shift
    }

    /// Moves a normalized field value into register position.
    pub const fn place(self, value: u8) -> u8 {
        (value << self.shift) & self.mask
    }

    /// Extracts the normalized field value from a full register byte.
    pub const fn extract(self, register: u8) -> u8 {
        (register & self.mask) >> self.shift
    }

    /// Replaces the field bits of `register` with the pre-shifted `value`.
    ///
    /// Bits of `value` outside the mask are discarded; bits of `register`
    /// outside the mask are kept as they are.
    pub const fn apply(self, register: u8, value: u8) -> u8 {
        (register & !self.mask) | (value & self.mask)
    }
}

/// `AV_CONF[2:0]` humidity averaging.
pub const AV_CONF_AVGH: RegisterField = RegisterField::new(REG_AV_CONF, 0x07);
/// `AV_CONF[5:3]` temperature averaging.
pub const AV_CONF_AVGT: RegisterField = RegisterField::new(REG_AV_CONF, 0x38);
/// `CTRL_REG1[1:0]` output data rate.
pub const CTRL_REG1_ODR: RegisterField = RegisterField::new(REG_CTRL_REG1, 0x03);
/// `CTRL_REG1[2]` block data update.
pub const CTRL_REG1_BDU: RegisterField = RegisterField::new(REG_CTRL_REG1, 0x04);
/// `CTRL_REG1[7]` power-down control.
pub const CTRL_REG1_PD: RegisterField = RegisterField::new(REG_CTRL_REG1, 0x80);
/// `CTRL_REG2[0]` one-shot trigger.
pub const CTRL_REG2_ONE_SHOT: RegisterField = RegisterField::new(REG_CTRL_REG2, 0x01);
/// `CTRL_REG2[1]` heater.
pub const CTRL_REG2_HEATER: RegisterField = RegisterField::new(REG_CTRL_REG2, 0x02);
/// `CTRL_REG2[7]` reboot memory content.
pub const CTRL_REG2_BOOT: RegisterField = RegisterField::new(REG_CTRL_REG2, 0x80);
/// `CTRL_REG3[2]` data-ready enable.
pub const CTRL_REG3_DRDY_EN: RegisterField = RegisterField::new(REG_CTRL_REG3, 0x04);
/// `CTRL_REG3[6]` push-pull / open-drain selection on the DRDY pin.
pub const CTRL_REG3_PP_OD: RegisterField = RegisterField::new(REG_CTRL_REG3, 0x40);
/// `CTRL_REG3[7]` data-ready output level.
pub const CTRL_REG3_DRDY_H_L: RegisterField = RegisterField::new(REG_CTRL_REG3, 0x80);
/// `STATUS_REG[0]` temperature data available.
pub const STATUS_T_DA: RegisterField = RegisterField::new(REG_STATUS, 0x01);
/// `STATUS_REG[1]` humidity data available.
pub const STATUS_H_DA: RegisterField = RegisterField::new(REG_STATUS, 0x02);

/// Access permissions encoded for each register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAccess {
    /// Read-only register.
    ReadOnly,
    /// Read/write register.
    ReadWrite,
}

/// Minimal metadata exposed by every register value type.
pub trait Register: Copy + From<u8> + Into<u8> {
    /// Register address as documented in the datasheet.
    const ADDRESS: u8;
    /// Access permission classification.
    const ACCESS: RegisterAccess;
    /// Reset/default value defined by the datasheet.
    const RESET_VALUE: u8;
}

/// Bitfield representation of the `AV_CONF` register (address `0x10`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvConf {
    // Humidity averaging selection (bits 2:0).
    pub avg_h: HumidityAveraging,
    // Temperature averaging selection (bits 5:3).
    pub avg_t: TemperatureAveraging,
    #[skip]
    __: B2,
}

/// Bitfield representation of the `CTRL_REG1` register (address `0x20`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtrlReg1 {
    // Output data rate selection (bits 1:0).
    pub odr: OutputDataRate,
    // Block data update (bit 2).
    pub bdu: BlockDataUpdate,
    #[skip]
    __: B4,
    // Power-down control (bit 7).
    pub power: PowerMode,
}

/// Bitfield representation of the `CTRL_REG2` register (address `0x21`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtrlReg2 {
    // One-shot conversion trigger (bit 0).
    pub one_shot: OneShot,
    // Heater control (bit 1).
    pub heater: Heater,
    #[skip]
    __: B5,
    // Reboot memory content (bit 7).
    pub boot: Boot,
}

/// Bitfield representation of the `CTRL_REG3` register (address `0x22`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtrlReg3 {
    #[skip]
    __: B2,
    // Data-ready signal enable (bit 2).
    pub data_ready: DataReadyEnable,
    #[skip]
    __: B3,
    // DRDY pin drive (bit 6).
    pub pin_mode: PinMode,
    // DRDY active level (bit 7).
    pub data_ready_level: DataReadyLevel,
}

/// Bitfield representation of the `STATUS_REG` register (address `0x27`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    // New temperature sample available (bit 0).
    pub temperature_available: bool,
    // New humidity sample available (bit 1).
    pub humidity_available: bool,
    #[skip]
    __: B6,
}

macro_rules! byte_register {
    ($ty:ident, $address:expr, $access:ident, $reset:expr) => {
        impl From<u8> for $ty {
            fn from(value: u8) -> Self {
                Self::from_bytes([value])
            }
        }

        impl From<$ty> for u8 {
            fn from(value: $ty) -> Self {
                value.into_bytes()[0]
            }
        }

        impl Register for $ty {
            const ADDRESS: u8 = $address;
            const ACCESS: RegisterAccess = RegisterAccess::$access;
            const RESET_VALUE: u8 = $reset;
        }
    };
}

byte_register!(AvConf, REG_AV_CONF, ReadWrite, 0x1B);
byte_register!(CtrlReg1, REG_CTRL_REG1, ReadWrite, 0x00);
byte_register!(CtrlReg2, REG_CTRL_REG2, ReadWrite, 0x00);
byte_register!(CtrlReg3, REG_CTRL_REG3, ReadWrite, 0x00);
byte_register!(Status, REG_STATUS, ReadOnly, 0x00);

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_FIELDS: [RegisterField; 13] = [
        AV_CONF_AVGH,
        AV_CONF_AVGT,
        CTRL_REG1_ODR,
        CTRL_REG1_BDU,
        CTRL_REG1_PD,
        CTRL_REG2_ONE_SHOT,
        CTRL_REG2_HEATER,
        CTRL_REG2_BOOT,
        CTRL_REG3_DRDY_EN,
        CTRL_REG3_PP_OD,
        CTRL_REG3_DRDY_H_L,
        STATUS_T_DA,
        STATUS_H_DA,
    ];

    #[test]
    fn field_masks_do_not_overlap_within_a_register() {
        for (i, a) in ALL_FIELDS.iter().enumerate() {
            for b in &ALL_FIELDS[i + 1..] {
                if a.address == b.address {
                    assert_eq!(a.mask & b.mask, 0, "{:?} overlaps {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn apply_preserves_bits_outside_the_mask() {
        for field in ALL_FIELDS {
            for seed in [0x00u8, 0xFF, 0xA5, 0x5A] {
                for value in 0..=field.value_mask() {
                    let updated = field.apply(seed, field.place(value));
                    assert_eq!(updated & !field.mask, seed & !field.mask);
                    assert_eq!(field.extract(updated), value);
                }
            }
        }
    }

    #[test]
    fn apply_on_bit_zero_leaves_upper_bits_alone() {
        let updated = CTRL_REG2_ONE_SHOT.apply(0b1010_1010, 0x01);
        assert_eq!(updated, 0b1010_1011);
        let cleared = CTRL_REG2_ONE_SHOT.apply(0b1111_1111, 0x00);
        assert_eq!(cleared, 0b1111_1110);
    }

    #[test]
    fn apply_discards_value_bits_outside_the_mask() {
        assert_eq!(CTRL_REG1_BDU.apply(0x00, 0xFF), 0x04);
    }

    #[test]
    fn shift_follows_the_mask() {
        assert_eq!(AV_CONF_AVGT.shift, 3);
        assert_eq!(AV_CONF_AVGT.width(), 3);
        assert_eq!(AV_CONF_AVGT.value_mask(), 0x07);
        assert_eq!(CTRL_REG3_DRDY_H_L.shift, 7);
    }

    /// Checks that every bitfield view agrees with the masks used by the RMW helpers.
    #[test]
    fn bitfield_views_match_field_masks() {
        let ctrl1 = CtrlReg1::from(CTRL_REG1_PD.mask | CTRL_REG1_BDU.mask | CTRL_REG1_ODR.place(0b10));
        assert_eq!(ctrl1.power(), PowerMode::Active);
        assert_eq!(ctrl1.bdu(), BlockDataUpdate::Block);
        assert_eq!(ctrl1.odr(), OutputDataRate::Hz7);

        let ctrl2 = CtrlReg2::from(CTRL_REG2_BOOT.mask | CTRL_REG2_ONE_SHOT.mask);
        assert_eq!(ctrl2.boot(), Boot::Reboot);
        assert_eq!(ctrl2.heater(), Heater::Disabled);
        assert_eq!(ctrl2.one_shot(), OneShot::Start);

        let ctrl3 = CtrlReg3::from(CTRL_REG3_PP_OD.mask | CTRL_REG3_DRDY_EN.mask);
        assert_eq!(ctrl3.pin_mode(), PinMode::OpenDrain);
        assert_eq!(ctrl3.data_ready(), DataReadyEnable::Enabled);
        assert_eq!(ctrl3.data_ready_level(), DataReadyLevel::ActiveHigh);

        let status = Status::from(STATUS_H_DA.mask);
        assert!(status.humidity_available());
        assert!(!status.temperature_available());
    }

    #[test]
    fn av_conf_reset_value_decodes_to_datasheet_defaults() {
        let av_conf = AvConf::from(AvConf::RESET_VALUE);
        assert_eq!(av_conf.avg_t(), TemperatureAveraging::Avg16);
        assert_eq!(av_conf.avg_h(), HumidityAveraging::Avg32);
    }

    #[test]
    fn reserved_bits_survive_a_bitfield_round_trip() {
        let mut ctrl1 = CtrlReg1::from(0b0111_1000);
        ctrl1.set_power(PowerMode::Active);
        ctrl1.set_odr(OutputDataRate::Hz12_5);
        assert_eq!(u8::from(ctrl1), 0b1111_1011);
    }
}
