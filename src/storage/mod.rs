//! Flash-backed tracker storage
//!
//! Binds the storage engine from `opentracker_core` to the flash driver:
//!
//! - [`flash_medium`]: flash region exposed as a `BlockMedium`
//! - [`layout`]: partition map
//! - [`config`]: settings load with fallback to compiled-in defaults
//! - [`tracker`]: boot sequence over one flash device

pub mod config;
pub mod error;
pub mod flash_medium;
pub mod layout;
pub mod tracker;

pub use config::{default_settings, ConfigLoader, ConfigSource};
pub use error::StorageError;
pub use flash_medium::FlashMedium;
pub use tracker::{TelemetryLog, TrackerStorage};
