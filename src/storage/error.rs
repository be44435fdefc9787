//! Storage setup errors

use crate::platform::PlatformError;
use core::fmt;
use opentracker_core::storage::StoreError;

/// Failure to bring up the tracker's storage partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Flash region rejected by the platform layer
    Platform(PlatformError),
    /// Store could not be created over its partition
    Store(StoreError),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Platform(e) => write!(f, "platform error: {}", e),
            StorageError::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl From<PlatformError> for StorageError {
    fn from(error: PlatformError) -> Self {
        StorageError::Platform(error)
    }
}

impl From<StoreError> for StorageError {
    fn from(error: StoreError) -> Self {
        StorageError::Store(error)
    }
}
