//! Record slot framing
//!
//! Each slot of the telemetry log is a marker word followed by the payload,
//! padded to a multiple of 4 bytes:
//!
//! ```text
//! offset 0  marker   u32 (little-endian)
//! offset 4  payload  RecordPayload::SIZE bytes
//! ...       padding  up to the next 4-byte boundary
//! ```
//!
//! Marker values are chosen so every lifecycle step only clears bits
//! (`Empty -> Start|Valid -> Tombstoned`), which flash can do in place.

/// Size of the marker word in bytes
pub const MARKER_SIZE: usize = 4;

/// Marker of an unwritten slot (erased flash)
pub const MARKER_EMPTY: u32 = 0xFFFF_FFFF;
/// Marker of the first record written to a freshly wiped partition
pub const MARKER_START: u32 = 0x1111_1111;
/// Marker of every other live record
pub const MARKER_VALID: u32 = 0xAA55_7700;
/// Marker of a consumed record
pub const MARKER_TOMBSTONED: u32 = 0x0000_0000;

/// Lifecycle tag of a record slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Never written since the last wipe
    Empty,
    /// First record written after a wipe
    Start,
    /// Live record
    Valid,
    /// Consumed record, reclaimed only by a wipe
    Tombstoned,
    /// Unrecognized marker word (torn write or corruption)
    Unknown(u32),
}

impl Marker {
    /// Classify a raw marker word
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            MARKER_EMPTY => Marker::Empty,
            MARKER_START => Marker::Start,
            MARKER_VALID => Marker::Valid,
            MARKER_TOMBSTONED => Marker::Tombstoned,
            other => Marker::Unknown(other),
        }
    }

    /// Raw marker word as persisted
    pub const fn to_raw(self) -> u32 {
        match self {
            Marker::Empty => MARKER_EMPTY,
            Marker::Start => MARKER_START,
            Marker::Valid => MARKER_VALID,
            Marker::Tombstoned => MARKER_TOMBSTONED,
            Marker::Unknown(raw) => raw,
        }
    }

    /// Decode the marker at the start of a slot frame
    pub fn from_bytes(buf: &[u8]) -> Self {
        match buf {
            [a, b, c, d, ..] => Self::from_raw(u32::from_le_bytes([*a, *b, *c, *d])),
            _ => Marker::Empty,
        }
    }

    pub const fn to_bytes(self) -> [u8; MARKER_SIZE] {
        self.to_raw().to_le_bytes()
    }

    /// Whether the slot holds an unconsumed record
    pub const fn is_live(self) -> bool {
        matches!(self, Marker::Start | Marker::Valid)
    }
}

/// Fixed-size payload that can be framed into a record slot
///
/// Implementations serialize to exactly `SIZE` bytes at fixed offsets. The
/// size is part of the on-media format: changing it changes the slot size and
/// requires wiping existing partitions.
pub trait RecordPayload: Sized {
    /// Serialized size in bytes
    const SIZE: usize;

    /// Serialize into `buf`, which is exactly `SIZE` bytes long
    fn write_bytes(&self, buf: &mut [u8]);

    /// Deserialize from `buf`, which is exactly `SIZE` bytes long
    ///
    /// Returns `None` if the bytes do not form a valid value.
    fn from_bytes(buf: &[u8]) -> Option<Self>;
}

/// Slot size for a payload of `payload_size` bytes (marker + payload, 4-byte aligned)
pub const fn slot_size(payload_size: usize) -> usize {
    (MARKER_SIZE + payload_size + 3) & !3
}
