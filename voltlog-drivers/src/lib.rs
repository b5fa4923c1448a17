//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in voltlog-core and voltlog-hal:
//!
//! - Battery monitor (resistor divider on an ADC input)
//! - Log file storage (FAT volume on an SD card via embedded-sdmmc)

#![no_std]
#![deny(unsafe_code)]

pub mod sensor;
pub mod storage;
