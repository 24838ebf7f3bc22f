//! Factory calibration decoding and two-point conversion.
//!
//! The HTS221 stores, per channel, two reference points pairing a raw ADC output
//! with a physical value. Raw samples are converted by linear interpolation
//! between them. The block lives at `0x30..=0x3F` and only changes after a
//! reboot, so callers read it once and keep the [`Calibration`] around.

use crate::registers::CALIBRATION_BLOCK_LEN;

// Offsets inside the calibration block.
const H0_RH_X2: usize = 0;
const H1_RH_X2: usize = 1;
const T0_DEGC_X8: usize = 2;
const T1_DEGC_X8: usize = 3;
const T1_T0_MSB: usize = 5;
const H0_T0_OUT: usize = 6;
const H1_T0_OUT: usize = 10;
const T0_OUT: usize = 12;
const T1_OUT: usize = 14;

const RH_MAX_DECI: i32 = 1_000;

/// The calibration block cannot be used for interpolation because both
/// reference outputs of a channel are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidCalibration;

/// Decoded calibration coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Relative humidity at the first reference point, in whole percent.
    pub h0_rh: u8,
    /// Relative humidity at the second reference point, in whole percent.
    pub h1_rh: u8,
    /// Temperature at the first reference point, in whole °C.
    pub t0_deg_c: i16,
    /// Temperature at the second reference point, in whole °C.
    pub t1_deg_c: i16,
    /// Raw humidity output at `h0_rh`.
    pub h0_t0_out: i16,
    /// Raw humidity output at `h1_rh`.
    pub h1_t0_out: i16,
    /// Raw temperature output at `t0_deg_c`.
    pub t0_out: i16,
    /// Raw temperature output at `t1_deg_c`.
    pub t1_out: i16,
}

impl Calibration {
    /// Decodes the 16-byte calibration block as read from `0x30` upwards.
    ///
    /// The temperature references are 10-bit values in 1/8 °C: the two extra
    /// high bits of each come from the shared `T1/T0 msb` byte and extend the
    /// mantissa before the division by eight.
    pub fn from_bytes(raw: &[u8; CALIBRATION_BLOCK_LEN]) -> Self {
        let msb = raw[T1_T0_MSB] & 0x0F;
        let t0_x8 = (u16::from(msb & 0x03) << 8) | u16::from(raw[T0_DEGC_X8]);
        let t1_x8 = (u16::from(msb & 0x0C) << 6) | u16::from(raw[T1_DEGC_X8]);

        Self {
            h0_rh: raw[H0_RH_X2] >> 1,
            h1_rh: raw[H1_RH_X2] >> 1,
            t0_deg_c: (t0_x8 >> 3) as i16,
            t1_deg_c: (t1_x8 >> 3) as i16,
            h0_t0_out: word(raw, H0_T0_OUT),
            h1_t0_out: word(raw, H1_T0_OUT),
            t0_out: word(raw, T0_OUT),
            t1_out: word(raw, T1_OUT),
        }
    }

    /// Checks that both channels can be interpolated.
    pub fn validate(&self) -> Result<(), InvalidCalibration> {
        if self.t0_out == self.t1_out || self.h0_t0_out == self.h1_t0_out {
            return Err(InvalidCalibration);
        }
        Ok(())
    }

    /// Converts a raw temperature sample to tenths of a degree Celsius.
    pub fn temperature_deci(&self, raw: i16) -> Result<i32, InvalidCalibration> {
        interpolate_deci(
            raw,
            (self.t0_out, i32::from(self.t0_deg_c)),
            (self.t1_out, i32::from(self.t1_deg_c)),
        )
    }

    /// Converts a raw temperature sample to whole degrees Celsius, truncated
    /// toward zero. Not clamped.
    pub fn temperature(&self, raw: i16) -> Result<i32, InvalidCalibration> {
        Ok(self.temperature_deci(raw)? / 10)
    }

    /// Converts a raw humidity sample to tenths of a percent relative humidity,
    /// clamped to `0..=1000`.
    pub fn humidity_deci(&self, raw: i16) -> Result<u16, InvalidCalibration> {
        let deci = interpolate_deci(
            raw,
            (self.h0_t0_out, i32::from(self.h0_rh)),
            (self.h1_t0_out, i32::from(self.h1_rh)),
        )?;
        Ok(deci.clamp(0, RH_MAX_DECI) as u16)
    }

    /// Converts a raw humidity sample to whole percent relative humidity,
    /// truncated toward zero and clamped to `0..=100`.
    pub fn humidity(&self, raw: i16) -> Result<u8, InvalidCalibration> {
        Ok((self.humidity_deci(raw)? / 10) as u8)
    }
}

#[inline]
fn word(raw: &[u8; CALIBRATION_BLOCK_LEN], offset: usize) -> i16 {
    i16::from_le_bytes([raw[offset], raw[offset + 1]])
}

// Interpolates in tenths so one decimal survives the integer division.
fn interpolate_deci(
    raw: i16,
    (out0, value0): (i16, i32),
    (out1, value1): (i16, i32),
) -> Result<i32, InvalidCalibration> {
    let span = i32::from(out1) - i32::from(out0);
    if span == 0 {
        return Err(InvalidCalibration);
    }

    let offset = 10 * (i32::from(raw) - i32::from(out0)) * (value1 - value0) / span;
    Ok(offset + 10 * value0)
}
