//! Flash partition map
//!
//! ```text
//! [Firmware]        0x000000 - 0x040000 (256 KB)
//! [Settings]        0x040000 - 0x041000 (4 KB, one erase block)
//! [Telemetry Log]   0x041000 - 0x080000 (252 KB, 5376 slots of 48 bytes)
//! [Log Spare]       0x080000 - 0x082000 (shadow block + swap journal)
//! [Settings Spare]  0x082000 - 0x084000 (shadow block + swap journal)
//! ```
//!
//! Each partition starts on an erase block boundary, so rewriting one never
//! erases the other. Every partition owns a spare area that
//! [`FlashMedium`](super::FlashMedium) uses to rewrite blocks without losing
//! them to a power cut.

use opentracker_core::settings::Settings;
use opentracker_core::storage::{record_size, slot_size, RecordPayload};
use opentracker_core::telemetry::ServerData;

/// Erase block size the partition map is aligned to
pub const FLASH_BLOCK_SIZE: u32 = 4096;

/// Settings partition base address
pub const SETTINGS_BASE: u32 = 0x040000;

/// Settings partition size
pub const SETTINGS_SIZE: u32 = FLASH_BLOCK_SIZE;

/// Telemetry log partition base address
pub const LOG_BASE: u32 = SETTINGS_BASE + SETTINGS_SIZE;

/// Telemetry log partition size
pub const LOG_SIZE: u32 = 63 * FLASH_BLOCK_SIZE;

/// Size of a spare area: one shadow block and one journal block
pub const SPARE_SIZE: u32 = 2 * FLASH_BLOCK_SIZE;

/// Spare area of the telemetry log
pub const LOG_SPARE_BASE: u32 = LOG_BASE + LOG_SIZE;

/// Spare area of the settings partition
pub const SETTINGS_SPARE_BASE: u32 = LOG_SPARE_BASE + SPARE_SIZE;

/// Number of telemetry records the log can buffer
pub const LOG_CAPACITY: usize = LOG_SIZE as usize / slot_size(ServerData::SIZE);

/// Records per uplink batch
pub const UPLINK_BATCH: usize = 32;

const _: () = assert!(record_size(Settings::SIZE) <= SETTINGS_SIZE as usize);
const _: () = assert!(LOG_BASE % FLASH_BLOCK_SIZE == 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_capacity() {
        assert_eq!(LOG_CAPACITY, 5376);
    }

    #[test]
    fn test_partitions_do_not_overlap() {
        assert!(SETTINGS_BASE + SETTINGS_SIZE <= LOG_BASE);
        assert_eq!(LOG_BASE + LOG_SIZE, 0x080000);
        assert_eq!(LOG_SPARE_BASE, 0x080000);
        assert_eq!(SETTINGS_SPARE_BASE + SPARE_SIZE, 0x084000);
    }
}
