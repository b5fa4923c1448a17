//! Minimal TOML parser for the logger configuration
//!
//! Handles only the subset the logger needs:
//! - `[section]` headers
//! - `key = value` pairs with integer or quoted string values
//! - `#` comments, whole-line or trailing
//!
//! Unknown keys are ignored so older firmware accepts newer files.

use voltlog_hal::storage::{is_short_file_name, FileName, StorageMedium};

use super::types::{BatteryConfig, LoggerConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key outside any section
    MissingSection,
    /// Value has the wrong type or does not fit
    InvalidValue,
    /// File name is not an 8.3 short name
    InvalidFileName,
    /// Battery scaling would divide by zero or overflow
    InvalidScaling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Boot,
    Storage,
    Battery,
}

/// Parse TOML configuration into a [`LoggerConfig`]
///
/// Missing sections and keys keep their defaults.
pub fn parse_config(input: &str) -> Result<LoggerConfig, ParseError> {
    let mut config = LoggerConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(&header[1..header.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    if !config.battery.is_valid() {
        return Err(ParseError::InvalidScaling);
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "boot" => Ok(Section::Boot),
        "storage" => Ok(Section::Storage),
        "battery" => Ok(Section::Battery),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut LoggerConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => return Err(ParseError::MissingSection),
        Section::Boot => {
            if key == "startup_delay_ms" {
                config.boot.startup_delay_ms = parse_int(value)?;
            }
        }
        Section::Storage => match key {
            "medium" => config.storage.medium = parse_medium(value)?,
            "file_name" => config.storage.file_name = parse_file_name(value)?,
            _ => {}
        },
        Section::Battery => apply_battery(key, value, &mut config.battery)?,
    }
    Ok(())
}

fn apply_battery(key: &str, value: &str, battery: &mut BatteryConfig) -> Result<(), ParseError> {
    match key {
        "vref_mv" => battery.vref_mv = parse_int(value)?,
        "divider_num" => battery.divider_num = parse_int(value)?,
        "divider_den" => battery.divider_den = parse_int(value)?,
        "adc_max" => battery.adc_max = parse_int(value)?,
        "samples" => battery.samples = parse_int(value)?,
        _ => {}
    }
    Ok(())
}

/// Split `key = value`, dropping a trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = strip_comment(value.trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Remove a `#` comment that is not inside a quoted string
fn strip_comment(text: &str) -> &str {
    let mut in_string = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return text[..i].trim(),
            _ => {}
        }
    }
    text
}

fn parse_string(value: &str) -> Result<&str, ParseError> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    // TOML allows `_` as a digit separator
    let mut digits: heapless::String<24> = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_medium(value: &str) -> Result<StorageMedium, ParseError> {
    match parse_string(value)? {
        "sd_card" => Ok(StorageMedium::SdCard),
        "wifi_file_system" => Ok(StorageMedium::WifiFileSystem),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_file_name(value: &str) -> Result<FileName, ParseError> {
    let name = parse_string(value)?;
    if !is_short_file_name(name) {
        return Err(ParseError::InvalidFileName);
    }
    FileName::try_from(name).map_err(|_| ParseError::InvalidFileName)
}
