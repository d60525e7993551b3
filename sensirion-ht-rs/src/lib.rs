#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]
//!# Sensirion HT - Driver for the Sensirion SHT4x and SHTC3 Humidity and Temperature Sensors
//! This crate provides drivers for two command/response variants of the Sensirion
//! humidity and temperature sensor family:
//! - [`Sht4x`]: single byte measurement commands, with three precision levels and
//!   six heater settings selected through [`Mode`].
//! - [`Shtc3`]: two byte measurement commands, with a low power flag and explicit sleep/wake.
//!
//! Both implement [`HumidityTemperatureSensor`]. The bus and delay are passed to every
//! call, so several sensors can share one [`I2c`](embedded_hal::i2c::I2c) handle.
mod address;
mod checksum;
mod error;
mod mode;
mod sensor;
mod sht4x;
mod shtc3;

pub use address::*;
pub use checksum::{CRC_8_SENSIRION, crc8};
pub use error::{Error, InvalidMode};
pub use mode::{Mode, ModeInfo};
pub use sensor::{HumidityTemperatureSensor, Measurement};
pub use sht4x::{Sht4x, Sht4xBuilder};
pub use shtc3::{Shtc3, Shtc3Builder};
