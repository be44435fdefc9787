//! Byte-addressable storage media
//!
//! The storage engine never touches hardware directly. It reads and writes
//! through [`BlockMedium`], which is implemented by the RAM adapter in this
//! crate and by the flash adapter in `opentracker`. Both expose the same
//! semantics, so a [`RecordStore`](crate::storage::RecordStore) works unchanged
//! over either.

pub mod ram;

use alloc::borrow::Cow;
use core::fmt;
use core::ops::Range;

pub use ram::RamMedium;

/// Value returned by [`BlockMedium::read`] for addresses outside the medium
///
/// Matches the erased state of flash, so an out-of-range marker read decodes
/// as an empty slot rather than faulting.
pub const READ_SENTINEL: u8 = 0xFF;

/// Errors reported by a medium
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediumError {
    /// Target range falls outside the medium
    OutOfBounds,
    /// Underlying device rejected the operation
    Device,
}

impl fmt::Display for MediumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediumError::OutOfBounds => write!(f, "address range outside medium"),
            MediumError::Device => write!(f, "storage device error"),
        }
    }
}

/// Byte-addressable storage capability
///
/// # Contract
///
/// - Reads never fault: out-of-range bytes read back as [`READ_SENTINEL`]
/// - A write whose range is not fully inside the medium fails with
///   [`MediumError::OutOfBounds`] and has no effect
/// - A successful write is visible to every subsequent read, whatever the
///   medium has to do internally to overwrite previous contents
pub trait BlockMedium {
    /// Size of the medium in bytes
    fn len(&self) -> usize;

    /// Whether the medium has zero size
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a single byte
    fn read(&self, addr: usize) -> u8;

    /// Read `len` bytes starting at `addr`
    ///
    /// Media that are directly addressable return a borrowed view; others
    /// return a copy. Returns `None` if the span is not inside the medium.
    fn read_span(&self, addr: usize, len: usize) -> Option<Cow<'_, [u8]>>;

    /// Write a single byte
    fn write(&mut self, addr: usize, value: u8) -> Result<(), MediumError> {
        self.write_span(addr, &[value])
    }

    /// Write `data` starting at `addr`
    fn write_span(&mut self, addr: usize, data: &[u8]) -> Result<(), MediumError>;

    /// Set `len` bytes starting at `addr` to `value`
    fn fill(&mut self, addr: usize, len: usize, value: u8) -> Result<(), MediumError> {
        const CHUNK: usize = 64;
        let chunk = [value; CHUNK];
        if !span_fits(addr, len, self.len()) {
            return Err(MediumError::OutOfBounds);
        }
        let mut offset = 0;
        while offset < len {
            let n = (len - offset).min(CHUNK);
            self.write_span(addr + offset, &chunk[..n])?;
            offset += n;
        }
        Ok(())
    }

    /// Copy `buf.len()` bytes starting at `addr` into `buf`
    fn read_into(&self, addr: usize, buf: &mut [u8]) -> Result<(), MediumError> {
        let span = self
            .read_span(addr, buf.len())
            .ok_or(MediumError::OutOfBounds)?;
        buf.copy_from_slice(&span);
        Ok(())
    }
}

/// Check that `addr..addr + len` lies inside a medium of `size` bytes
pub fn span_fits(addr: usize, len: usize, size: usize) -> bool {
    addr.checked_add(len).is_some_and(|end| end <= size)
}

/// Contiguous byte range of a medium owned by one store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Offset of the first byte inside the medium
    pub base: usize,
    /// Size in bytes
    pub size: usize,
}

impl Partition {
    pub const fn new(base: usize, size: usize) -> Self {
        Self { base, size }
    }

    /// Partition covering an entire medium
    pub fn whole<M: BlockMedium + ?Sized>(medium: &M) -> Self {
        Self::new(0, medium.len())
    }

    /// Byte range inside the medium
    pub fn range(&self) -> Range<usize> {
        self.base..self.base + self.size
    }

    /// Number of fixed-size slots that fit in this partition
    pub const fn slots(&self, slot_size: usize) -> usize {
        if slot_size == 0 {
            0
        } else {
            self.size / slot_size
        }
    }

    /// Whether the partition lies inside a medium of `medium_len` bytes
    pub fn fits_in(&self, medium_len: usize) -> bool {
        span_fits(self.base, self.size, medium_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_fits() {
        assert!(span_fits(0, 16, 16));
        assert!(span_fits(15, 1, 16));
        assert!(!span_fits(15, 2, 16));
        assert!(!span_fits(usize::MAX, 2, 16));
    }

    #[test]
    fn test_partition_slots() {
        let partition = Partition::new(128, 1000);
        assert_eq!(partition.slots(48), 20);
        assert_eq!(partition.slots(0), 0);
        assert_eq!(partition.range(), 128..1128);
        assert!(partition.fits_in(1128));
        assert!(!partition.fits_in(1127));
    }
}
