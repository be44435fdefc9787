//! CRC32 calculation for settings record validation
//!
//! Detects torn or corrupted settings writes in flash.

use crc::{Crc, CRC_32_ISO_HDLC};

/// CRC32 algorithm (ISO HDLC / Ethernet / ZIP)
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Calculate CRC32 checksum of data
///
/// Uses the CRC-32-ISO-HDLC algorithm (polynomial 0x04C11DB7).
///
/// # Example
///
/// ```
/// use opentracker_core::storage::calculate_crc32;
///
/// assert_eq!(calculate_crc32(b"123456789"), 0xCBF43926);
/// ```
pub fn calculate_crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

/// Validate data against CRC32 checksum
pub fn validate_crc32(data: &[u8], expected_crc: u32) -> bool {
    calculate_crc32(data) == expected_crc
}
