//! Build script for voltlog-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Validates logger.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Largest value the ADC full-scale count may take (16-bit converters)
const MAX_ADC_MAX: i64 = 65_536;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate logger.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=logger.toml");

    let config_path = Path::new("logger.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: logger.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds logger.toml as its configuration.           ║\n\
            ║  Please create one in the voltlog-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read logger.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in logger.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_boot(&config, &mut errors);
    validate_storage(&config, &mut errors);
    validate_battery(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid logger configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=logger.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only the sections the firmware parser understands may appear
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };

    for (name, value) in table {
        if !["boot", "storage", "battery"].contains(&name.as_str()) {
            errors.push(format!("Unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

fn validate_boot(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(boot) = config.get("boot") else {
        return;
    };

    match boot.get("startup_delay_ms") {
        Some(toml::Value::Integer(ms)) if *ms < 0 || *ms > i64::from(u32::MAX) => {
            errors.push("[boot] startup_delay_ms out of range".to_string());
        }
        Some(toml::Value::Integer(_)) | None => {}
        Some(_) => errors.push("[boot] startup_delay_ms must be an integer".to_string()),
    }
}

fn validate_storage(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(storage) = config.get("storage") else {
        return;
    };

    match storage.get("medium") {
        Some(toml::Value::String(medium)) if medium == "sd_card" => {}
        Some(toml::Value::String(medium)) if medium == "wifi_file_system" => {
            errors.push("[storage] medium 'wifi_file_system' is not fitted".to_string());
        }
        Some(_) => errors.push("[storage] medium must be 'sd_card'".to_string()),
        None => {}
    }

    match storage.get("file_name") {
        Some(toml::Value::String(name)) => {
            if !is_short_file_name(name) {
                errors.push(format!("[storage] file_name '{}' is not an 8.3 name", name));
            }
        }
        Some(_) => errors.push("[storage] file_name must be a string".to_string()),
        None => {}
    }
}

fn validate_battery(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(battery) = config.get("battery") else {
        return;
    };

    let limits: [(&str, i64); 5] = [
        ("vref_mv", i64::from(u32::MAX)),
        ("divider_num", i64::from(u32::MAX)),
        ("divider_den", i64::from(u32::MAX)),
        ("adc_max", MAX_ADC_MAX),
        ("samples", i64::from(u8::MAX)),
    ];

    for (key, max) in limits {
        match battery.get(key) {
            Some(toml::Value::Integer(v)) if *v < 1 || *v > max => {
                errors.push(format!("[battery] {} must be 1-{}", key, max));
            }
            Some(toml::Value::Integer(_)) | None => {}
            Some(_) => errors.push(format!("[battery] {} must be an integer", key)),
        }
    }

    // Unset keys take the firmware defaults
    let value = |key: &str, default: i64| match battery.get(key) {
        Some(toml::Value::Integer(v)) => *v,
        _ => default,
    };
    let vref = value("vref_mv", 3300);
    let num = value("divider_num", 3);
    let den = value("divider_den", 1);
    let adc_max = value("adc_max", 4096);
    if vref < 1 || num < 1 || den < 1 || adc_max < 1 {
        return;
    }

    let scaled = (vref as u128) * (num as u128);
    if scaled * (adc_max as u128) > u128::from(u64::MAX) || scaled / (den as u128) > u128::from(u32::MAX) {
        errors.push("[battery] vref_mv * divider_num / divider_den overflows".to_string());
    }
}

/// 1-8 character base, optional 1-3 character extension
fn is_short_file_name(name: &str) -> bool {
    let (base, ext) = match name.split_once('.') {
        Some((base, ext)) => (base, Some(ext)),
        None => (name, None),
    };
    let valid = |part: &str| {
        part.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    };

    !base.is_empty()
        && base.len() <= 8
        && valid(base)
        && ext.map_or(true, |e| !e.is_empty() && e.len() <= 3 && valid(e))
}
