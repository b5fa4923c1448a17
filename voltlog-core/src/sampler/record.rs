//! Measurement record and write buffer
//!
//! Records are persisted as ASCII text, one per line:
//!
//! ```text
//! <ticks>,<millivolts>\n
//! ```
//!
//! with no header row.

use core::fmt::Write;
use heapless::String;

/// Capacity of the sampler's scratch buffer in bytes
///
/// One byte is always kept free, so a record may use at most 63 bytes.
pub const WRITE_BUFFER_LEN: usize = 64;

/// One battery measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Milliseconds since boot when the sample was taken
    pub ticks: u64,
    /// Battery voltage in millivolts
    pub millivolts: u32,
}

/// Errors from rendering a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    /// Record does not fit in the buffer with a spare byte
    Overflow,
    /// Rendering produced no bytes
    Empty,
}

/// Render a record into a string of capacity `N`
///
/// The record must leave at least one byte of the capacity unused.
pub fn format_record<const N: usize>(m: &Measurement) -> Result<String<N>, FormatError> {
    let mut text = String::new();
    writeln!(text, "{},{}", m.ticks, m.millivolts).map_err(|_| FormatError::Overflow)?;

    if text.is_empty() {
        return Err(FormatError::Empty);
    }
    if text.len() > N.saturating_sub(1) {
        return Err(FormatError::Overflow);
    }
    Ok(text)
}

/// Fixed-capacity scratch buffer plus the running file offset
///
/// Reused every cycle. The rendered record is replaced on each
/// [`render`](Self::render); the offset only moves through
/// [`advance`](Self::advance).
#[derive(Debug, Clone)]
pub struct WriteBuffer<const N: usize = WRITE_BUFFER_LEN> {
    text: String<N>,
    offset: u32,
}

impl<const N: usize> Default for WriteBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> WriteBuffer<N> {
    /// Create an empty buffer at file offset 0
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            offset: 0,
        }
    }

    /// Clear the rendered record, keeping the offset
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Render `m` into the buffer
    ///
    /// Returns the record length. On error the buffer is left empty.
    pub fn render(&mut self, m: &Measurement) -> Result<usize, FormatError> {
        self.clear();
        match format_record::<N>(m) {
            Ok(text) => {
                self.text = text;
                Ok(self.text.len())
            }
            Err(e) => Err(e),
        }
    }

    /// Bytes of the current record
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// File offset the next record is written at
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Move the offset past `written` accepted bytes
    pub fn advance(&mut self, written: usize) {
        let written = u32::try_from(written).unwrap_or(u32::MAX);
        self.offset = self.offset.saturating_add(written);
    }
}
