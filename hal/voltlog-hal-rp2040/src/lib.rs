//! RP2040-specific HAL for the battery logger firmware
//!
//! This crate provides RP2040-specific implementations:
//! - An async [`AdcReader`](voltlog_hal::AdcReader)
//! - SD card wiring on the SPI1 bus

#![no_std]

pub mod adc;
pub mod sd;

pub use adc::RpAdcReader;
pub use sd::{sd_card, SdBlockDevice, SdSpiDevice};
