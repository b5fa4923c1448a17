//! Configuration loading
//!
//! The configuration is compiled into the firmware from logger.toml and
//! parsed once at startup.

use defmt::*;

use voltlog_core::config::{parse_config, LoggerConfig};

/// Embedded configuration (compiled into firmware)
/// Edit logger.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../logger.toml");

/// Parse the embedded configuration
///
/// Falls back to the built-in defaults if logger.toml cannot be parsed,
/// which build.rs should already have ruled out.
pub fn load() -> LoggerConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {}", e);
            error!("Using default configuration");
            LoggerConfig::default()
        }
    }
}
