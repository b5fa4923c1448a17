//! Analog-to-digital conversion abstractions

/// Errors from a single ADC conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// The converter reported an error for this sample
    Conversion,
}

/// One ADC channel bound to its converter
///
/// Implementations own both the converter and the channel so a driver can
/// sample without knowing which pin it sits on.
pub trait AdcReader {
    /// Perform one conversion and return the raw count
    fn read(&mut self) -> impl core::future::Future<Output = Result<u16, AdcError>>;
}
