#![cfg_attr(not(test), no_std)]

mod log;

mod error;

pub mod calibration;
pub mod config;
pub mod device;
pub mod interface;
pub mod params;
pub mod registers;

pub use crate::calibration::Calibration;
pub use crate::config::Config;
pub use crate::device::Hts221;
pub use crate::error::{Error, Result};
