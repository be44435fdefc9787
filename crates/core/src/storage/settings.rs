//! Single-record settings store
//!
//! Persists one configuration record per partition, validated by CRC32:
//!
//! ```text
//! offset 0      marker   u32 = SETTINGS_MARKER
//! offset 4      size     u32 = payload length N
//! offset 8      payload  N bytes
//! offset 8+N    crc32    u32 over bytes 0..8+N
//! ```
//!
//! All fields are little-endian. A missing marker means nothing was ever
//! saved; a size that differs from the current payload layout means the
//! record belongs to another firmware version. Both are reported so the
//! caller can fall back to defaults.

use super::crc::{calculate_crc32, validate_crc32};
use super::error::StoreError;
use super::record::RecordPayload;
use crate::medium::{BlockMedium, MediumError, Partition, READ_SENTINEL};
use alloc::vec;
use alloc::vec::Vec;
use core::marker::PhantomData;

/// Magic number marking a saved settings record ("SETT")
pub const SETTINGS_MARKER: u32 = 0x5345_5454;

/// Marker and size words preceding the payload
const HEADER_SIZE: usize = 8;
const CRC_SIZE: usize = 4;

/// Total persisted size of a settings record with `payload_size` bytes
pub const fn record_size(payload_size: usize) -> usize {
    HEADER_SIZE + payload_size + CRC_SIZE
}

/// Settings persistence over a medium partition
pub struct SettingsStore<S, M> {
    medium: M,
    partition: Partition,
    _settings: PhantomData<fn() -> S>,
}

impl<S: RecordPayload, M: BlockMedium> SettingsStore<S, M> {
    pub fn new(medium: M, partition: Partition) -> Result<Self, StoreError> {
        if partition.size < record_size(S::SIZE) || !partition.fits_in(medium.len()) {
            return Err(StoreError::PartitionTooSmall);
        }
        Ok(Self {
            medium,
            partition,
            _settings: PhantomData,
        })
    }

    /// Load and validate the stored settings
    ///
    /// # Errors
    ///
    /// - [`StoreError::NoRecord`] if no settings were ever saved
    /// - [`StoreError::SchemaMismatch`] if the stored size differs from `S::SIZE`
    /// - [`StoreError::ChecksumMismatch`] if the record is corrupted
    /// - [`StoreError::MalformedPayload`] if the payload fails to decode
    pub fn init(&self) -> Result<S, StoreError> {
        let base = self.partition.base;

        let mut header = [0u8; HEADER_SIZE];
        self.medium.read_into(base, &mut header)?;
        let marker = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if marker != SETTINGS_MARKER {
            return Err(StoreError::NoRecord);
        }
        if size as usize != S::SIZE {
            return Err(StoreError::SchemaMismatch);
        }

        let record = self
            .medium
            .read_span(base, record_size(S::SIZE))
            .ok_or(MediumError::OutOfBounds)?;
        let (body, crc) = record.split_at(HEADER_SIZE + S::SIZE);
        let stored_crc = u32::from_le_bytes([crc[0], crc[1], crc[2], crc[3]]);
        if !validate_crc32(body, stored_crc) {
            return Err(StoreError::ChecksumMismatch);
        }

        S::from_bytes(&body[HEADER_SIZE..]).ok_or(StoreError::MalformedPayload)
    }

    /// Persist `settings`, replacing any previous record
    ///
    /// The whole record goes to the medium in a single write.
    pub fn save(&mut self, settings: &S) -> Result<(), StoreError> {
        let record = Self::encode(settings);
        self.medium.write_span(self.partition.base, &record)?;
        Ok(())
    }

    /// Erase the stored record so the next [`init`](Self::init) reports `NoRecord`
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.medium.fill(
            self.partition.base,
            record_size(S::SIZE),
            READ_SENTINEL,
        )?;
        Ok(())
    }

    /// Serialized form of a settings record
    pub fn encode(settings: &S) -> Vec<u8> {
        let mut record = vec![0u8; record_size(S::SIZE)];
        record[0..4].copy_from_slice(&SETTINGS_MARKER.to_le_bytes());
        record[4..8].copy_from_slice(&(S::SIZE as u32).to_le_bytes());
        settings.write_bytes(&mut record[HEADER_SIZE..HEADER_SIZE + S::SIZE]);

        let crc = calculate_crc32(&record[..HEADER_SIZE + S::SIZE]);
        record[HEADER_SIZE + S::SIZE..].copy_from_slice(&crc.to_le_bytes());
        record
    }

    /// Get medium reference (for testing)
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Get mutable medium reference (for testing)
    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    pub fn into_medium(self) -> M {
        self.medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::RamMedium;

    #[derive(Debug, Clone, PartialEq)]
    struct Profile {
        interval: u16,
        enabled: bool,
    }

    impl RecordPayload for Profile {
        const SIZE: usize = 3;

        fn write_bytes(&self, buf: &mut [u8]) {
            buf[0..2].copy_from_slice(&self.interval.to_le_bytes());
            buf[2] = self.enabled as u8;
        }

        fn from_bytes(buf: &[u8]) -> Option<Self> {
            let enabled = match buf[2] {
                0 => false,
                1 => true,
                _ => return None,
            };
            Some(Self {
                interval: u16::from_le_bytes([buf[0], buf[1]]),
                enabled,
            })
        }
    }

    /// Layout from a build with a larger settings record
    struct Wider;

    impl RecordPayload for Wider {
        const SIZE: usize = 5;

        fn write_bytes(&self, buf: &mut [u8]) {
            buf.fill(0x5A);
        }

        fn from_bytes(_buf: &[u8]) -> Option<Self> {
            Some(Wider)
        }
    }

    fn store() -> SettingsStore<Profile, RamMedium> {
        let medium = RamMedium::new(64);
        SettingsStore::new(medium, Partition::new(16, 32)).unwrap()
    }

    #[test]
    fn test_fresh_partition_has_no_record() {
        assert_eq!(store().init(), Err(StoreError::NoRecord));
    }

    #[test]
    fn test_save_then_init() {
        let mut store = store();
        let profile = Profile {
            interval: 600,
            enabled: true,
        };
        store.save(&profile).unwrap();
        assert_eq!(store.init(), Ok(profile));

        let bytes = store.medium().as_bytes();
        assert_eq!(&bytes[16..20], b"TTES");
        assert_eq!(&bytes[20..24], &[3, 0, 0, 0]);
        assert_eq!(&bytes[24..27], &[0x58, 0x02, 0x01]);
        let crc = calculate_crc32(&bytes[16..27]);
        assert_eq!(&bytes[27..31], &crc.to_le_bytes());
    }

    #[test]
    fn test_save_overwrites_previous() {
        let mut store = store();
        store
            .save(&Profile {
                interval: 1,
                enabled: false,
            })
            .unwrap();
        store
            .save(&Profile {
                interval: 2,
                enabled: true,
            })
            .unwrap();
        assert_eq!(store.init().unwrap().interval, 2);
    }

    #[test]
    fn test_corrupted_payload_detected() {
        let mut store = store();
        store
            .save(&Profile {
                interval: 30,
                enabled: true,
            })
            .unwrap();
        store.medium_mut().as_bytes_mut()[24] ^= 0x04;
        assert_eq!(store.init(), Err(StoreError::ChecksumMismatch));
    }

    #[test]
    fn test_corrupted_crc_detected() {
        let mut store = store();
        store
            .save(&Profile {
                interval: 30,
                enabled: true,
            })
            .unwrap();
        store.medium_mut().as_bytes_mut()[30] ^= 0x80;
        assert_eq!(store.init(), Err(StoreError::ChecksumMismatch));
    }

    #[test]
    fn test_size_mismatch_reported() {
        let medium = RamMedium::new(64);
        let mut wider = SettingsStore::<Wider, _>::new(medium, Partition::new(16, 32)).unwrap();
        wider.save(&Wider).unwrap();

        let medium = wider.into_medium();
        let narrow = SettingsStore::<Profile, _>::new(medium, Partition::new(16, 32)).unwrap();
        assert_eq!(narrow.init(), Err(StoreError::SchemaMismatch));
    }

    #[test]
    fn test_malformed_payload_with_valid_crc() {
        let mut record = SettingsStore::<Profile, RamMedium>::encode(&Profile {
            interval: 5,
            enabled: true,
        });
        record[10] = 7;
        let crc = calculate_crc32(&record[..11]);
        record[11..].copy_from_slice(&crc.to_le_bytes());

        let mut medium = RamMedium::new(32);
        medium.write_span(0, &record).unwrap();
        let store = SettingsStore::<Profile, _>::new(medium, Partition::new(0, 32)).unwrap();
        assert_eq!(store.init(), Err(StoreError::MalformedPayload));
    }

    #[test]
    fn test_clear() {
        let mut store = store();
        store
            .save(&Profile {
                interval: 9,
                enabled: false,
            })
            .unwrap();
        store.clear().unwrap();
        assert_eq!(store.init(), Err(StoreError::NoRecord));
    }

    #[test]
    fn test_partition_too_small() {
        let medium = RamMedium::new(64);
        assert!(matches!(
            SettingsStore::<Profile, _>::new(medium.clone(), Partition::new(0, 14)),
            Err(StoreError::PartitionTooSmall)
        ));
        assert!(matches!(
            SettingsStore::<Profile, _>::new(medium, Partition::new(60, 15)),
            Err(StoreError::PartitionTooSmall)
        ));
    }
}
