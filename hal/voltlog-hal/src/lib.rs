//! Voltlog Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits that the logger
//! application is written against. Chip-specific crates implement them so the
//! same sampling and bootstrap code can run on the RP2040 board and on the
//! host test harness.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  voltlog-firmware                       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  voltlog-core / voltlog-drivers         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  voltlog-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  voltlog-hal-rp2040                     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`adc::AdcReader`] - Single-channel analog conversions
//! - [`storage::Storage`] - Removable, append-capable file storage

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use adc::{AdcError, AdcReader};
pub use storage::{FileName, Storage, StorageError, StorageMedium, StorageSetup};
