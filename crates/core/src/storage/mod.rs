//! Persistent storage engine
//!
//! Two partition types live on a [`BlockMedium`](crate::medium::BlockMedium):
//!
//! - [`RecordStore`]: circular FIFO log of fixed-size framed records with a
//!   boot-time recovery scan
//! - [`SettingsStore`]: single-slot configuration record guarded by a layout
//!   size check and a CRC-32
//!
//! Neither store logs or retries. Failures are returned as [`StoreError`] and
//! the caller decides what to do (wipe, fall back to defaults, retry later).

pub mod crc;
pub mod error;
pub mod log;
pub mod record;
pub mod settings;

pub use self::crc::{calculate_crc32, validate_crc32};
pub use error::StoreError;
pub use self::log::{LogIndex, RecordBlock, RecordStore, RecoveryFault};
pub use record::{slot_size, Marker, RecordPayload, MARKER_SIZE};
pub use settings::{record_size, SettingsStore, SETTINGS_MARKER};
