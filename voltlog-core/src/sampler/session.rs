//! Per-cycle storage session
//!
//! Wraps a [`Storage`] for the duration of one sample cycle and tracks where
//! in the lifecycle it is, so cleanup releases exactly what was acquired:
//!
//! ```text
//! Closed --configure--> Configured --enable--> Enabled
//! Configured | Enabled --disable--> Disabled --close--> Closed
//! Closed --close--> Closed
//! ```

use voltlog_hal::storage::{Storage, StorageError, StorageMedium, StorageSetup};

/// Lifecycle state of a storage session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Nothing acquired
    Closed,
    /// Medium and file selected
    Configured,
    /// Medium active; reads and appends allowed
    Enabled,
    /// Medium released, subsystem not yet reset
    Disabled,
}

/// Outcome of the cleanup pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CleanupReport {
    /// Result of disable, or `None` if configure never succeeded
    pub disable: Option<Result<(), StorageError>>,
    /// Result of close, which is always attempted
    pub close: Result<(), StorageError>,
}

impl CleanupReport {
    /// Check that every attempted cleanup step succeeded
    pub fn is_clean(&self) -> bool {
        !matches!(self.disable, Some(Err(_))) && self.close.is_ok()
    }
}

/// One configure..close session on a storage backend
///
/// Must be ended with [`finish`](Self::finish), which consumes the session
/// and walks it back to [`SessionState::Closed`].
#[must_use = "a storage session must be finished to release the medium"]
pub struct StorageSession<'s, S: Storage> {
    storage: &'s mut S,
    medium: StorageMedium,
    state: SessionState,
}

impl<'s, S: Storage> StorageSession<'s, S> {
    /// Start a session in the `Closed` state
    pub fn new(storage: &'s mut S, medium: StorageMedium) -> Self {
        Self {
            storage,
            medium,
            state: SessionState::Closed,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Select the medium and destination file
    ///
    /// The session stays `Closed` on failure.
    pub async fn configure(&mut self, setup: &StorageSetup) -> Result<(), StorageError> {
        if self.state != SessionState::Closed {
            return Err(StorageError::AlreadyConfigured);
        }
        self.storage.configure(setup).await?;
        self.medium = setup.medium;
        self.state = SessionState::Configured;
        Ok(())
    }

    /// Activate the configured medium
    ///
    /// The session stays `Configured` on failure so cleanup still disables.
    pub async fn enable(&mut self) -> Result<(), StorageError> {
        if self.state != SessionState::Configured {
            return Err(StorageError::NotConfigured);
        }
        self.storage.enable().await?;
        self.state = SessionState::Enabled;
        Ok(())
    }

    /// Append `data` at `offset`, returning the bytes accepted
    pub async fn append(&mut self, offset: u32, data: &[u8]) -> Result<usize, StorageError> {
        if self.state != SessionState::Enabled {
            return Err(StorageError::NotEnabled);
        }
        self.storage.append(self.medium, offset, data).await
    }

    /// Read back from the file starting at `offset`
    pub async fn read(&mut self, offset: u32, buffer: &mut [u8]) -> Result<usize, StorageError> {
        if self.state != SessionState::Enabled {
            return Err(StorageError::NotEnabled);
        }
        self.storage.read(self.medium, offset, buffer).await
    }

    /// Release everything the session acquired
    ///
    /// Disables the medium if configure succeeded, then closes the storage
    /// subsystem unconditionally. Failures are reported, never retried.
    pub async fn finish(mut self) -> CleanupReport {
        let disable = match self.state {
            SessionState::Configured | SessionState::Enabled => {
                let result = self.storage.disable(self.medium).await;
                self.state = SessionState::Disabled;
                Some(result)
            }
            SessionState::Closed | SessionState::Disabled => None,
        };

        let close = self.storage.close().await;
        self.state = SessionState::Closed;

        CleanupReport { disable, close }
    }
}
