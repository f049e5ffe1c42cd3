//! Pin-level GPIO register HAL for the ESP32
//!
//! The [`gpio`] module maps logical pin numbers onto the two banks of GPIO
//! matrix registers and the per-pin IO_MUX registers. Pins that are shared
//! with the RTC IO controller are handed over through the [`rtc::LowPowerIo`]
//! trait.
#![cfg_attr(not(test), no_std)]

pub mod gpio;
pub mod prelude;
pub mod rtc;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
