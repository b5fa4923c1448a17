//! Storage drivers

pub mod sdmmc;

pub use sdmmc::{CardReset, FixedTimeSource, SdStorage};
