//! Battery monitor trait

/// Errors that can occur while measuring the battery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// `measure_mv` called before a successful `init`
    NotInitialized,
    /// No sensor fitted or the input reads zero
    NoSignal,
    /// Input pinned at full scale
    Saturated,
    /// ADC conversion error
    Conversion,
    /// Configured scaling is unusable (zero divider or sample count)
    InvalidConfig,
}

/// Trait for battery voltage monitors
///
/// Implementations handle the specific front end (resistor divider on an
/// ADC pin, fuel gauge IC, etc.)
pub trait BatteryMonitor {
    /// Bring the sensor subsystem up
    ///
    /// Called once during bootstrap. A failure here is fatal to startup.
    fn init(&mut self) -> impl core::future::Future<Output = Result<(), SensorError>>;

    /// Measure the battery voltage in millivolts
    fn measure_mv(&mut self) -> impl core::future::Future<Output = Result<u32, SensorError>>;
}
