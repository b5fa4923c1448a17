//! Logger configuration
//!
//! Board configuration is written in a small TOML subset and parsed without
//! allocation.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
