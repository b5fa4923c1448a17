//! Battery sense on the RP2040 ADC
//!
//! Pico-style boards feed VSYS/3 to GPIO29 (ADC3). The firmware builds the
//! channel from that pin and hands it to [`RpAdcReader`] with the converter.

use embassy_rp::adc::{Adc, Async, Channel};
use voltlog_hal::adc::{AdcError, AdcReader};

/// One RP2040 ADC channel with its converter
///
/// The RP2040 has a single converter, so only one reader exists at a time.
pub struct RpAdcReader {
    adc: Adc<'static, Async>,
    channel: Channel<'static>,
}

impl RpAdcReader {
    /// Bind the converter to the battery channel
    pub fn new(adc: Adc<'static, Async>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl AdcReader for RpAdcReader {
    async fn read(&mut self) -> Result<u16, AdcError> {
        self.adc
            .read(&mut self.channel)
            .await
            .map_err(|_| AdcError::Conversion)
    }
}
