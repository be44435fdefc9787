//! Storage error types

use crate::medium::MediumError;
use core::fmt;

/// Errors from record and settings store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Recovery scan found inconsistent markers; the store is locked until wiped
    StoreInvalid,
    /// Append rejected, every slot holds a live record
    Full,
    /// Requested count exceeds the number of live records
    OutOfRange,
    /// Settings CRC does not match the stored record
    ChecksumMismatch,
    /// Settings were written with a different layout size
    SchemaMismatch,
    /// No settings record has been written to the partition
    NoRecord,
    /// Stored payload bytes could not be decoded
    MalformedPayload,
    /// Partition cannot hold a single record, or lies outside the medium
    PartitionTooSmall,
    /// Underlying medium rejected a write
    Medium(MediumError),
}

impl StoreError {
    /// Short description without the medium detail
    pub const fn as_str(&self) -> &'static str {
        match self {
            StoreError::StoreInvalid => "store invalid, wipe required",
            StoreError::Full => "store full",
            StoreError::OutOfRange => "count exceeds stored records",
            StoreError::ChecksumMismatch => "checksum mismatch",
            StoreError::SchemaMismatch => "settings layout size mismatch",
            StoreError::NoRecord => "no stored record",
            StoreError::MalformedPayload => "malformed payload",
            StoreError::PartitionTooSmall => "partition too small",
            StoreError::Medium(_) => "medium error",
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Medium(e) => write!(f, "medium error: {}", e),
            other => f.write_str(other.as_str()),
        }
    }
}

impl From<MediumError> for StoreError {
    fn from(error: MediumError) -> Self {
        StoreError::Medium(error)
    }
}
