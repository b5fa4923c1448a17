//! Log file on a FAT-formatted SD card
//!
//! Maps the session-style [`Storage`] interface onto `embedded-sdmmc`:
//!
//! | session step | embedded-sdmmc                                   |
//! |--------------|--------------------------------------------------|
//! | configure    | open volume 0                                    |
//! | enable       | open root dir, open file (create or append)      |
//! | append       | seek to offset, write                            |
//! | read         | seek to offset, read                             |
//! | disable      | close file, close root dir                       |
//! | close        | close anything still open and the volume, then   |
//! |              | reset the card                                   |
//!
//! Handles are kept as raw handles so the driver can release them in any
//! order after a partial failure. Close always ends with a card reset, so a
//! reseated or browned-out card is acquired afresh on the next configure.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;
use embedded_sdmmc::{
    BlockDevice, Error as SdError, Mode, RawDirectory, RawFile, RawVolume, SdCard, TimeSource,
    Timestamp, VolumeIdx, VolumeManager,
};
use voltlog_hal::storage::{FileName, Storage, StorageError, StorageMedium, StorageSetup};

/// Fixed timestamp used for file metadata; the board has no RTC.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedTimeSource;

impl TimeSource for FixedTimeSource {
    fn get_timestamp(&self) -> Timestamp {
        // 2026-01-01 00:00:00
        Timestamp {
            year_since_1970: 56,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

/// Block device that can be sent back through its power-up handshake
pub trait CardReset {
    /// Forget the card state; the next access re-initializes the card
    fn reset(&self);
}

impl<SPI, DELAYER> CardReset for SdCard<SPI, DELAYER>
where
    SPI: SpiDevice<u8>,
    DELAYER: DelayNs,
{
    fn reset(&self) {
        self.mark_card_uninit();
    }
}

/// SD card storage backend
pub struct SdStorage<D, T>
where
    D: BlockDevice,
    T: TimeSource,
{
    // Only `None` while close swaps in a fresh manager
    volume_mgr: Option<VolumeManager<D, T>>,
    file_name: FileName,
    volume: Option<RawVolume>,
    dir: Option<RawDirectory>,
    file: Option<RawFile>,
}

impl<D, T> SdStorage<D, T>
where
    D: BlockDevice,
    T: TimeSource,
{
    /// Wrap a block device, typically an `embedded_sdmmc::SdCard`
    pub fn new(device: D, time_source: T) -> Self {
        Self {
            volume_mgr: Some(VolumeManager::new(device, time_source)),
            file_name: FileName::new(),
            volume: None,
            dir: None,
            file: None,
        }
    }

    /// Check if a volume is open
    pub fn is_configured(&self) -> bool {
        self.volume.is_some()
    }

    /// Check if the log file is open
    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    fn volume_mgr(&mut self) -> Result<&mut VolumeManager<D, T>, StorageError> {
        self.volume_mgr.as_mut().ok_or(StorageError::Filesystem)
    }

    fn open_file(&mut self, medium: StorageMedium) -> Result<RawFile, StorageError> {
        check_medium(medium)?;
        self.file.ok_or(StorageError::NotEnabled)
    }

    /// Close file and directory, keeping the first error
    fn release_file(&mut self) -> Result<(), StorageError> {
        let file = self.file.take();
        let dir = self.dir.take();
        let mgr = self.volume_mgr()?;

        let mut result = Ok(());
        if let Some(file) = file {
            result = mgr.close_file(file).map_err(map_io_error);
        }
        if let Some(dir) = dir {
            let closed = mgr.close_dir(dir).map_err(map_io_error);
            result = result.and(closed);
        }
        result
    }
}

impl<D, T> SdStorage<D, T>
where
    D: BlockDevice + CardReset,
    T: TimeSource,
{
    /// Reset the card and start over with an empty handle table
    ///
    /// Handles a failed close left behind are dropped with the old manager.
    fn reset_card(&mut self) {
        self.volume = None;
        self.dir = None;
        self.file = None;
        if let Some(mgr) = self.volume_mgr.take() {
            let (device, time_source) = mgr.free();
            device.reset();
            self.volume_mgr = Some(VolumeManager::new(device, time_source));
        }
    }
}

impl<D, T> Storage for SdStorage<D, T>
where
    D: BlockDevice + CardReset,
    T: TimeSource,
{
    async fn configure(&mut self, setup: &StorageSetup) -> Result<(), StorageError> {
        check_medium(setup.medium)?;
        self.file_name = setup.file_name.clone();

        if self.volume.is_none() {
            let volume = self
                .volume_mgr()?
                .open_raw_volume(VolumeIdx(0))
                .map_err(map_open_error)?;
            self.volume = Some(volume);
        }
        Ok(())
    }

    async fn enable(&mut self) -> Result<(), StorageError> {
        let volume = self.volume.ok_or(StorageError::NotConfigured)?;
        if self.file.is_some() {
            return Ok(());
        }

        let dir = match self.dir {
            Some(dir) => dir,
            None => {
                let dir = self
                    .volume_mgr()?
                    .open_root_dir(volume)
                    .map_err(map_open_error)?;
                self.dir = Some(dir);
                dir
            }
        };

        let file_name = self.file_name.clone();
        let file = self
            .volume_mgr()?
            .open_file_in_dir(dir, file_name.as_str(), Mode::ReadWriteCreateOrAppend)
            .map_err(map_open_error)?;
        self.file = Some(file);
        Ok(())
    }

    async fn append(
        &mut self,
        medium: StorageMedium,
        offset: u32,
        data: &[u8],
    ) -> Result<usize, StorageError> {
        let file = self.open_file(medium)?;
        let mgr = self.volume_mgr()?;
        mgr.file_seek_from_start(file, offset)
            .map_err(map_io_error)?;
        mgr.write(file, data).map_err(map_io_error)?;
        Ok(data.len())
    }

    async fn read(
        &mut self,
        medium: StorageMedium,
        offset: u32,
        buffer: &mut [u8],
    ) -> Result<usize, StorageError> {
        let file = self.open_file(medium)?;
        let mgr = self.volume_mgr()?;
        mgr.file_seek_from_start(file, offset)
            .map_err(map_io_error)?;
        match mgr.read(file, buffer) {
            Ok(n) => Ok(n),
            Err(SdError::EndOfFile) => Ok(0),
            Err(e) => Err(map_io_error(e)),
        }
    }

    async fn disable(&mut self, medium: StorageMedium) -> Result<(), StorageError> {
        check_medium(medium)?;
        self.release_file()
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        // A skipped or failed disable leaves handles that would keep the
        // volume busy
        let released = self.release_file();

        let closed = match self.volume.take() {
            Some(volume) => self
                .volume_mgr()
                .and_then(|mgr| mgr.close_volume(volume).map_err(map_io_error)),
            None => Ok(()),
        };

        self.reset_card();
        released.and(closed)
    }
}

fn check_medium(medium: StorageMedium) -> Result<(), StorageError> {
    match medium {
        StorageMedium::SdCard => Ok(()),
        StorageMedium::WifiFileSystem => Err(StorageError::UnsupportedMedium),
    }
}

/// Errors while opening the volume, directory or file
fn map_open_error<E: core::fmt::Debug>(e: SdError<E>) -> StorageError {
    match e {
        SdError::DeviceError(_) => StorageError::NoCard,
        SdError::FilenameError(_) => StorageError::InvalidFileName,
        SdError::NotEnoughSpace | SdError::DiskFull => StorageError::Full,
        _ => StorageError::Filesystem,
    }
}

/// Errors while transferring data or releasing handles
fn map_io_error<E: core::fmt::Debug>(e: SdError<E>) -> StorageError {
    match e {
        SdError::InvalidOffset => StorageError::InvalidOffset,
        SdError::NotEnoughSpace | SdError::DiskFull => StorageError::Full,
        _ => StorageError::Io,
    }
}
