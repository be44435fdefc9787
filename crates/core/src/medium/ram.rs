//! RAM-backed medium
//!
//! Owns a heap buffer sized once at construction. Used for volatile buffering
//! when no flash partition is configured, and as the reference medium in tests.

use super::{span_fits, BlockMedium, MediumError, READ_SENTINEL};
use alloc::borrow::Cow;
use alloc::vec;
use alloc::vec::Vec;

/// Heap buffer medium supporting arbitrary overwrites
#[derive(Debug, Clone)]
pub struct RamMedium {
    data: Vec<u8>,
}

impl RamMedium {
    /// Create a medium of `size` bytes in the erased state (all `0xFF`)
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![READ_SENTINEL; size],
        }
    }

    /// Wrap existing contents, e.g. a snapshot taken from another medium
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Raw contents (for test verification)
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw contents, bypassing the write contract (for corruption tests)
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl BlockMedium for RamMedium {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn read(&self, addr: usize) -> u8 {
        self.data.get(addr).copied().unwrap_or(READ_SENTINEL)
    }

    fn read_span(&self, addr: usize, len: usize) -> Option<Cow<'_, [u8]>> {
        if !span_fits(addr, len, self.data.len()) {
            return None;
        }
        Some(Cow::Borrowed(&self.data[addr..addr + len]))
    }

    fn write(&mut self, addr: usize, value: u8) -> Result<(), MediumError> {
        let slot = self.data.get_mut(addr).ok_or(MediumError::OutOfBounds)?;
        *slot = value;
        Ok(())
    }

    fn write_span(&mut self, addr: usize, data: &[u8]) -> Result<(), MediumError> {
        if !span_fits(addr, data.len(), self.data.len()) {
            return Err(MediumError::OutOfBounds);
        }
        self.data[addr..addr + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn fill(&mut self, addr: usize, len: usize, value: u8) -> Result<(), MediumError> {
        if !span_fits(addr, len, self.data.len()) {
            return Err(MediumError::OutOfBounds);
        }
        self.data[addr..addr + len].fill(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_medium_is_erased() {
        let medium = RamMedium::new(32);
        assert_eq!(medium.len(), 32);
        assert!(medium.as_bytes().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_read_out_of_range_returns_sentinel() {
        let medium = RamMedium::new(4);
        assert_eq!(medium.read(4), READ_SENTINEL);
        assert_eq!(medium.read(usize::MAX), READ_SENTINEL);
        assert!(medium.read_span(2, 3).is_none());
    }

    #[test]
    fn test_overwrite_any_bits() {
        let mut medium = RamMedium::new(8);
        medium.write_span(0, &[0x00, 0x00]).unwrap();
        medium.write_span(0, &[0xAB, 0xFF]).unwrap();
        assert_eq!(medium.read(0), 0xAB);
        assert_eq!(medium.read(1), 0xFF);
    }

    #[test]
    fn test_read_span_is_borrowed() {
        let mut medium = RamMedium::new(8);
        medium.write_span(2, &[1, 2, 3]).unwrap();
        let span = medium.read_span(2, 3).unwrap();
        assert!(matches!(span, Cow::Borrowed(_)));
        assert_eq!(&*span, &[1, 2, 3]);
    }

    #[test]
    fn test_out_of_bounds_write_has_no_effect() {
        let mut medium = RamMedium::new(4);
        assert_eq!(
            medium.write_span(2, &[0, 0, 0]),
            Err(MediumError::OutOfBounds)
        );
        assert_eq!(medium.write(4, 0), Err(MediumError::OutOfBounds));
        assert!(medium.as_bytes().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_fill() {
        let mut medium = RamMedium::new(8);
        medium.fill(2, 4, 0x00).unwrap();
        assert_eq!(medium.as_bytes(), &[0xFF, 0xFF, 0, 0, 0, 0, 0xFF, 0xFF]);
        assert!(medium.fill(6, 4, 0).is_err());
    }
}
