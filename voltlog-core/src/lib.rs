//! Board-agnostic core logic for the battery logger firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Sensor abstraction trait
//! - Staged bootstrap sequencer
//! - Periodic sample-and-persist cycle with its storage session state machine
//! - Drift-free wake schedule
//! - Configuration types and parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod boot;
pub mod config;
pub mod sampler;
pub mod traits;

#[cfg(test)]
mod testing;
