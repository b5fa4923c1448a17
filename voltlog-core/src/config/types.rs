//! Configuration type definitions

use voltlog_hal::storage::{FileName, StorageMedium, StorageSetup};

/// Default startup grace period in milliseconds
pub const DEFAULT_STARTUP_DELAY_MS: u32 = 4192;

/// Default log file name
pub const DEFAULT_FILE_NAME: &str = "BATTVOLT.CSV";

/// Bootstrap configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootConfig {
    /// Grace period before the subsystems are brought up
    pub startup_delay_ms: u32,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            startup_delay_ms: DEFAULT_STARTUP_DELAY_MS,
        }
    }
}

/// Log file location
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StorageConfig {
    /// Medium holding the log file
    pub medium: StorageMedium,
    /// 8.3 name of the log file in the root directory
    pub file_name: FileName,
}

impl StorageConfig {
    /// Build the setup passed to the storage driver each cycle
    pub fn setup(&self) -> StorageSetup {
        StorageSetup {
            medium: self.medium,
            file_name: self.file_name.clone(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let mut file_name = FileName::new();
        // Fits: the default name is exactly 12 bytes
        let _ = file_name.push_str(DEFAULT_FILE_NAME);
        Self {
            medium: StorageMedium::SdCard,
            file_name,
        }
    }
}

/// Battery divider scaling
///
/// Converts averaged ADC counts to millivolts at the battery:
/// `mv = raw * vref_mv * divider_num / (adc_max * divider_den)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryConfig {
    /// ADC reference voltage in millivolts
    pub vref_mv: u32,
    /// Divider ratio numerator (battery side)
    pub divider_num: u32,
    /// Divider ratio denominator (ADC side)
    pub divider_den: u32,
    /// Count corresponding to the reference voltage
    pub adc_max: u32,
    /// Conversions averaged per measurement
    pub samples: u8,
}

impl BatteryConfig {
    /// Check that the scaling can be applied
    ///
    /// Besides the zero checks, the battery-side full scale must fit in a
    /// `u32` and `adc_max * vref_mv * divider_num` must fit in a `u64`, so
    /// no count below `adc_max` can overflow the conversion.
    pub fn is_valid(&self) -> bool {
        self.vref_mv > 0
            && self.divider_num > 0
            && self.divider_den > 0
            && self.adc_max > 0
            && self.adc_max <= u32::from(u16::MAX) + 1
            && self.samples > 0
            && self.full_scale_mv().is_some()
    }

    /// Battery voltage at the converter's reference input, in millivolts
    ///
    /// `None` if the scaling overflows.
    pub fn full_scale_mv(&self) -> Option<u32> {
        let scaled = u64::from(self.vref_mv).checked_mul(u64::from(self.divider_num))?;
        scaled.checked_mul(u64::from(self.adc_max))?;
        let mv = scaled.checked_div(u64::from(self.divider_den))?;
        u32::try_from(mv).ok()
    }
}

impl Default for BatteryConfig {
    /// VSYS/3 on a 12-bit converter referenced to 3.3 V
    fn default() -> Self {
        Self {
            vref_mv: 3300,
            divider_num: 3,
            divider_den: 1,
            adc_max: 4096,
            samples: 8,
        }
    }
}

/// Complete logger configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoggerConfig {
    pub boot: BootConfig,
    pub storage: StorageConfig,
    pub battery: BatteryConfig,
}
