//! Strongly typed parameter enumerations for the HTS221 driver.
//!
//! Each enum maps directly to one datasheet field encoding and is tied to the
//! [`RegisterField`] it lives in through [`FieldValue`]. Prefer these types over
//! raw integers to keep register values valid and explicit.
//!
//! # Examples
//!
//! ```rust
//! use hts221::params::{FieldValue, OutputDataRate, PowerMode};
//!
//! assert_eq!(PowerMode::Active.register_bits(), 0x80);
//! assert_eq!(OutputDataRate::from_bits(0b11), OutputDataRate::Hz12_5);
//! ```

use modular_bitfield::prelude::Specifier;

use crate::registers::{
    RegisterField, AV_CONF_AVGH, AV_CONF_AVGT, CTRL_REG1_BDU, CTRL_REG1_ODR, CTRL_REG1_PD,
    CTRL_REG2_BOOT, CTRL_REG2_HEATER, CTRL_REG2_ONE_SHOT, CTRL_REG3_DRDY_EN, CTRL_REG3_DRDY_H_L,
    CTRL_REG3_PP_OD,
};

/// A closed set of values occupying exactly one [`RegisterField`].
pub trait FieldValue: Copy {
    /// Field the value is stored in.
    const FIELD: RegisterField;

    /// Returns the value normalized to bit 0.
    fn bits(self) -> u8;

    /// Decodes a value normalized to bit 0. Bits above the field width are ignored.
    fn from_bits(bits: u8) -> Self;

    /// Returns the value shifted into register position.
    fn register_bits(self) -> u8 {
        Self::FIELD.place(self.bits())
    }
}

// Every enum below covers all bit patterns of its field, listed in encoding order.
// The const block rejects any table that does not.
macro_rules! field_value {
    ($ty:ident => $field:path { $($variant:ident),+ $(,)? }) => {
        impl $ty {
            const VARIANTS: &'static [$ty] = &[$($ty::$variant),+];
        }

        const _: () = {
            let variants = $ty::VARIANTS;
            assert!(variants.len() == 1 << $field.width());
            let mut index = 0;
            while index < variants.len() {
                assert!(variants[index] as usize == index);
                index += 1;
            }
        };

        impl FieldValue for $ty {
            const FIELD: RegisterField = $field;

            fn bits(self) -> u8 {
                self as u8
            }

            fn from_bits(bits: u8) -> Self {
                Self::VARIANTS[usize::from(bits & Self::FIELD.value_mask())]
            }
        }
    };
}

/// Number of internal humidity samples averaged into one output (`AV_CONF[2:0]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum HumidityAveraging {
    /// 4 samples.
    Avg4 = 0b000,
    /// 8 samples.
    Avg8 = 0b001,
    /// 16 samples.
    Avg16 = 0b010,
    /// 32 samples (reset default).
    Avg32 = 0b011,
    /// 64 samples.
    Avg64 = 0b100,
    /// 128 samples.
    Avg128 = 0b101,
    /// 256 samples.
    Avg256 = 0b110,
    /// 512 samples.
    Avg512 = 0b111,
}

impl HumidityAveraging {
    /// Returns the number of averaged samples.
    pub const fn samples(self) -> u16 {
        4 << (self as u16)
    }
}

field_value!(HumidityAveraging => AV_CONF_AVGH {
    Avg4, Avg8, Avg16, Avg32, Avg64, Avg128, Avg256, Avg512,
});

/// Number of internal temperature samples averaged into one output (`AV_CONF[5:3]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum TemperatureAveraging {
    /// 2 samples.
    Avg2 = 0b000,
    /// 4 samples.
    Avg4 = 0b001,
    /// 8 samples.
    Avg8 = 0b010,
    /// 16 samples (reset default).
    Avg16 = 0b011,
    /// 32 samples.
    Avg32 = 0b100,
    /// 64 samples.
    Avg64 = 0b101,
    /// 128 samples.
    Avg128 = 0b110,
    /// 256 samples.
    Avg256 = 0b111,
}

impl TemperatureAveraging {
    /// Returns the number of averaged samples.
    pub const fn samples(self) -> u16 {
        2 << (self as u16)
    }
}

field_value!(TemperatureAveraging => AV_CONF_AVGT {
    Avg2, Avg4, Avg8, Avg16, Avg32, Avg64, Avg128, Avg256,
});

/// Power-down control bit (`CTRL_REG1.PD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum PowerMode {
    /// Power-down mode (reset default).
    PowerDown = 0,
    /// Active mode.
    Active = 1,
}

field_value!(PowerMode => CTRL_REG1_PD { PowerDown, Active });

/// Block data update bit (`CTRL_REG1.BDU`).
///
/// In block mode the output registers are not updated until both the low and
/// high byte of the current sample have been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum BlockDataUpdate {
    /// Continuous update (reset default).
    Continuous = 0,
    /// Output registers not updated until MSB and LSB have been read.
    Block = 1,
}

field_value!(BlockDataUpdate => CTRL_REG1_BDU { Continuous, Block });

/// Output data rate selections encoded in `CTRL_REG1[1:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum OutputDataRate {
    /// One-shot mode; conversions only on request.
    OneShot = 0b00,
    /// 1 Hz.
    Hz1 = 0b01,
    /// 7 Hz.
    Hz7 = 0b10,
    /// 12.5 Hz.
    Hz12_5 = 0b11,
}

impl OutputDataRate {
    /// Returns the output rate in millihertz, `0` for one-shot mode.
    pub const fn millihertz(self) -> u32 {
        match self {
            Self::OneShot => 0,
            Self::Hz1 => 1_000,
            Self::Hz7 => 7_000,
            Self::Hz12_5 => 12_500,
        }
    }
}

field_value!(OutputDataRate => CTRL_REG1_ODR { OneShot, Hz1, Hz7, Hz12_5 });

/// Reboot memory content bit (`CTRL_REG2.BOOT`). Self-clearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum Boot {
    /// Normal mode.
    Normal = 0,
    /// Reload the trimming parameters from non-volatile memory.
    Reboot = 1,
}

field_value!(Boot => CTRL_REG2_BOOT { Normal, Reboot });

/// Internal heater control bit (`CTRL_REG2.Heater`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum Heater {
    /// Heater disabled.
    Disabled = 0,
    /// Heater enabled.
    Enabled = 1,
}

field_value!(Heater => CTRL_REG2_HEATER { Disabled, Enabled });

/// One-shot trigger bit (`CTRL_REG2.ONE_SHOT`). Self-clearing once the
/// conversion completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum OneShot {
    /// Waiting for a start request, or the last conversion is done.
    Idle = 0,
    /// Start a new conversion.
    Start = 1,
}

field_value!(OneShot => CTRL_REG2_ONE_SHOT { Idle, Start });

/// Data-ready output level (`CTRL_REG3.DRDY_H_L`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum DataReadyLevel {
    /// Pin is high while data is ready (reset default).
    ActiveHigh = 0,
    /// Pin is low while data is ready.
    ActiveLow = 1,
}

field_value!(DataReadyLevel => CTRL_REG3_DRDY_H_L { ActiveHigh, ActiveLow });

/// DRDY pin drive selection (`CTRL_REG3.PP_OD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum PinMode {
    /// Push-pull (reset default).
    PushPull = 0,
    /// Open drain.
    OpenDrain = 1,
}

field_value!(PinMode => CTRL_REG3_PP_OD { PushPull, OpenDrain });

/// Data-ready signal enable (`CTRL_REG3.DRDY_EN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum DataReadyEnable {
    /// Data-ready signal not routed to the pin (reset default).
    Disabled = 0,
    /// Data-ready signal routed to the pin.
    Enabled = 1,
}

field_value!(DataReadyEnable => CTRL_REG3_DRDY_EN { Disabled, Enabled });
