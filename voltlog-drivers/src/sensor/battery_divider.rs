//! Battery voltage through a resistor divider
//!
//! The battery feeds an ADC input through a fixed divider (VSYS/3 on the
//! RP2040 boards). The driver averages a few conversions and scales the
//! result back to the battery side with integer math only.

use voltlog_core::config::BatteryConfig;
use voltlog_core::traits::{BatteryMonitor, SensorError};
use voltlog_hal::adc::AdcReader;

/// Battery monitor reading a divided voltage on one ADC channel
pub struct BatteryDivider<A> {
    adc: A,
    config: BatteryConfig,
    ready: bool,
}

impl<A> BatteryDivider<A> {
    /// Create a new divider sensor
    ///
    /// # Arguments
    /// - `adc`: ADC channel wired to the divider tap
    /// - `config`: reference voltage, divider ratio and averaging
    pub fn new(adc: A, config: BatteryConfig) -> Self {
        Self {
            adc,
            config,
            ready: false,
        }
    }

    /// Convert an averaged raw count to battery millivolts
    ///
    /// `mv = raw * vref_mv * divider_num / (adc_max * divider_den)`
    pub fn raw_to_mv(&self, raw: u16) -> Result<u32, SensorError> {
        if raw == 0 {
            return Err(SensorError::NoSignal);
        }
        // Top code of the converter
        if u32::from(raw) >= self.config.adc_max.saturating_sub(1) {
            return Err(SensorError::Saturated);
        }

        let c = &self.config;
        let numerator = u64::from(raw)
            .checked_mul(u64::from(c.vref_mv))
            .and_then(|v| v.checked_mul(u64::from(c.divider_num)))
            .ok_or(SensorError::InvalidConfig)?;
        let denominator = u64::from(c.adc_max)
            .checked_mul(u64::from(c.divider_den))
            .ok_or(SensorError::InvalidConfig)?;

        numerator
            .checked_div(denominator)
            .and_then(|mv| u32::try_from(mv).ok())
            .ok_or(SensorError::InvalidConfig)
    }

    /// Check if `init` succeeded
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl<A: AdcReader> BatteryDivider<A> {
    async fn read_average(&mut self) -> Result<u16, SensorError> {
        let samples = u32::from(self.config.samples.max(1));
        let mut sum: u32 = 0;
        for _ in 0..samples {
            let raw = self.adc.read().await.map_err(|_| SensorError::Conversion)?;
            sum += u32::from(raw);
        }
        // Average of u16 values always fits
        Ok((sum / samples) as u16)
    }
}

impl<A: AdcReader> BatteryMonitor for BatteryDivider<A> {
    async fn init(&mut self) -> Result<(), SensorError> {
        self.ready = false;
        if !self.config.is_valid() {
            return Err(SensorError::InvalidConfig);
        }

        // One probe conversion proves the channel is wired and live
        let raw = self.adc.read().await.map_err(|_| SensorError::Conversion)?;
        self.raw_to_mv(raw)?;

        self.ready = true;
        Ok(())
    }

    async fn measure_mv(&mut self) -> Result<u32, SensorError> {
        if !self.ready {
            return Err(SensorError::NotInitialized);
        }
        let raw = self.read_average().await?;
        self.raw_to_mv(raw)
    }
}

/// ADC replaying scripted readings, then a fixed value
#[cfg(test)]
pub struct DummyAdc {
    script: &'static [Result<u16, voltlog_hal::adc::AdcError>],
    index: usize,
    fixed: u16,
}

#[cfg(test)]
impl DummyAdc {
    pub fn fixed(raw: u16) -> Self {
        Self {
            script: &[],
            index: 0,
            fixed: raw,
        }
    }

    pub fn sequence(script: &'static [Result<u16, voltlog_hal::adc::AdcError>]) -> Self {
        Self {
            script,
            index: 0,
            fixed: 0,
        }
    }
}

#[cfg(test)]
impl AdcReader for DummyAdc {
    async fn read(&mut self) -> Result<u16, voltlog_hal::adc::AdcError> {
        let reading = self.script.get(self.index).copied().unwrap_or(Ok(self.fixed));
        self.index += 1;
        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use voltlog_hal::adc::AdcError;

    fn sensor(adc: DummyAdc) -> BatteryDivider<DummyAdc> {
        BatteryDivider::new(adc, BatteryConfig::default())
    }

    #[test]
    fn test_raw_to_mv() {
        let s = sensor(DummyAdc::fixed(0));

        // 1241 counts ≈ 1.0 V at the tap, 3.0 V at the battery
        assert_eq!(s.raw_to_mv(1241), Ok(2999));
        assert_eq!(s.raw_to_mv(2048), Ok(4950));
    }

    #[test]
    fn test_no_signal_and_saturation() {
        let s = sensor(DummyAdc::fixed(0));
        assert_eq!(s.raw_to_mv(0), Err(SensorError::NoSignal));
        assert_eq!(s.raw_to_mv(4095), Err(SensorError::Saturated));
        assert!(s.raw_to_mv(4094).is_ok());
    }

    #[test]
    fn test_measure_requires_init() {
        let mut s = sensor(DummyAdc::fixed(2048));
        assert_eq!(block_on(s.measure_mv()), Err(SensorError::NotInitialized));

        block_on(s.init()).unwrap();
        assert!(s.is_ready());
        assert_eq!(block_on(s.measure_mv()), Ok(4950));
    }

    #[test]
    fn test_init_fails_without_signal() {
        let mut s = sensor(DummyAdc::fixed(0));
        assert_eq!(block_on(s.init()), Err(SensorError::NoSignal));
        assert!(!s.is_ready());
    }

    #[test]
    fn test_init_rejects_bad_config() {
        let mut config = BatteryConfig::default();
        config.divider_den = 0;
        let mut s = BatteryDivider::new(DummyAdc::fixed(2048), config);
        assert_eq!(block_on(s.init()), Err(SensorError::InvalidConfig));
    }

    #[test]
    fn test_measure_averages_samples() {
        static READINGS: [Result<u16, AdcError>; 9] = [
            Ok(2048),
            Ok(2000),
            Ok(2096),
            Ok(2000),
            Ok(2096),
            Ok(2000),
            Ok(2096),
            Ok(2000),
            Ok(2096),
        ];
        let mut s = sensor(DummyAdc::sequence(&READINGS));

        block_on(s.init()).unwrap();
        // Eight samples averaging 2048
        assert_eq!(block_on(s.measure_mv()), Ok(4950));
    }

    #[test]
    fn test_conversion_error() {
        static READINGS: [Result<u16, AdcError>; 2] = [Ok(2048), Err(AdcError::Conversion)];
        let mut s = sensor(DummyAdc::sequence(&READINGS));

        block_on(s.init()).unwrap();
        assert_eq!(block_on(s.measure_mv()), Err(SensorError::Conversion));
    }

    #[test]
    fn test_overflowing_scaling() {
        let config = BatteryConfig {
            vref_mv: u32::MAX,
            divider_num: u32::MAX,
            ..BatteryConfig::default()
        };
        let mut s = BatteryDivider::new(DummyAdc::fixed(2048), config);

        assert_eq!(s.raw_to_mv(2048), Err(SensorError::InvalidConfig));
        assert_eq!(block_on(s.init()), Err(SensorError::InvalidConfig));
        assert!(!s.is_ready());
    }
}
