//! Removable storage abstractions
//!
//! Provides the session-style storage interface the sampler uses to append
//! records to a file on a removable medium. Each call maps to one step of the
//! storage lifecycle: configure, enable, append/read, disable, close.

use heapless::String;

/// Maximum length of an 8.3 short file name ("BATTVOLT.CSV")
pub const MAX_FILE_NAME_LEN: usize = 12;

/// File name on the storage medium
pub type FileName = String<MAX_FILE_NAME_LEN>;

/// Physical medium backing the storage session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageMedium {
    /// SD card on the SPI bus
    SdCard,
    /// File system served over Wi-Fi (not fitted on this board)
    WifiFileSystem,
}

/// Options passed to [`Storage::configure`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StorageSetup {
    /// Medium to select
    pub medium: StorageMedium,
    /// Destination file
    pub file_name: FileName,
}

impl StorageSetup {
    /// Create a setup for an SD card file
    ///
    /// Returns `None` if `file_name` is not a valid 8.3 short name.
    pub fn sd_card(file_name: &str) -> Option<Self> {
        if !is_short_file_name(file_name) {
            return None;
        }
        let mut name = FileName::new();
        name.push_str(file_name).ok()?;
        Some(Self {
            medium: StorageMedium::SdCard,
            file_name: name,
        })
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// The requested medium is not supported by this implementation
    UnsupportedMedium,
    /// Operation requires a configured session
    NotConfigured,
    /// Operation requires an enabled session
    NotEnabled,
    /// Session already past the configure step
    AlreadyConfigured,
    /// No card detected or the card did not answer
    NoCard,
    /// Volume or file system could not be opened
    Filesystem,
    /// File name rejected by the medium
    InvalidFileName,
    /// Offset lies beyond the end of the file
    InvalidOffset,
    /// Low-level read/write failure
    Io,
    /// Medium has no room left
    Full,
}

/// Session-style file storage
///
/// The expected call order per session is
/// `configure → enable → append/read* → disable → close`.
/// Implementations must accept `disable` and `close` at any point, including
/// after an earlier step failed, and must treat them as no-ops when there is
/// nothing to release.
pub trait Storage {
    /// Select the medium and destination file
    fn configure(
        &mut self,
        setup: &StorageSetup,
    ) -> impl core::future::Future<Output = Result<(), StorageError>>;

    /// Power up / activate the configured medium
    fn enable(&mut self) -> impl core::future::Future<Output = Result<(), StorageError>>;

    /// Write `data` at `offset` in the configured file
    ///
    /// # Returns
    /// The number of bytes actually accepted, which may be less than
    /// `data.len()`.
    fn append(
        &mut self,
        medium: StorageMedium,
        offset: u32,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<usize, StorageError>>;

    /// Read from the configured file starting at `offset`
    ///
    /// # Returns
    /// The number of bytes read into `buffer`; zero at end of file.
    fn read(
        &mut self,
        medium: StorageMedium,
        offset: u32,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, StorageError>>;

    /// Release the file and power down the medium
    fn disable(
        &mut self,
        medium: StorageMedium,
    ) -> impl core::future::Future<Output = Result<(), StorageError>>;

    /// Reset the storage subsystem
    fn close(&mut self) -> impl core::future::Future<Output = Result<(), StorageError>>;
}

/// Check that `name` is a valid 8.3 short file name
///
/// Accepts 1-8 base characters and an optional extension of 1-3 characters,
/// drawn from ASCII letters, digits, `_` and `-`.
pub fn is_short_file_name(name: &str) -> bool {
    let (base, ext) = match name.split_once('.') {
        Some((base, ext)) => (base, Some(ext)),
        None => (name, None),
    };

    let valid_chars =
        |part: &str| part.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

    if base.is_empty() || base.len() > 8 || !valid_chars(base) {
        return false;
    }

    match ext {
        Some(ext) => !ext.is_empty() && ext.len() <= 3 && valid_chars(ext),
        None => true,
    }
}
