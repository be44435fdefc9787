//! Mock Flash implementation for testing
//!
//! Provides in-memory Flash simulation for unit and integration tests.

use crate::platform::{error::FlashError, traits::FlashInterface, Result};
use alloc::vec;
use alloc::vec::Vec;

/// Flash block size (4 KB)
const BLOCK_SIZE: u32 = 4096;

/// Flash capacity (4 MB)
const FLASH_CAPACITY: u32 = 4 * 1024 * 1024;

/// Protected firmware image (first 256 KB)
const FIRMWARE_SIZE: u32 = 0x40000;

/// Mock Flash implementation
///
/// Simulates NOR flash in memory. Supports:
/// - Bit-clearing writes and block erases
/// - Erase and write counting, to check how often the storage layer erases
/// - Torn writes and power cuts for recovery testing
/// - Corruption injection
///
/// # Example
///
/// ```
/// use opentracker::platform::mock::MockFlash;
/// use opentracker::platform::traits::FlashInterface;
///
/// let mut flash = MockFlash::new();
///
/// flash.write(0x041000, &[0x00, 0x77, 0x55, 0xAA]).unwrap();
/// flash.erase(0x041000, 4096).unwrap();
///
/// let mut buf = [0u8; 4];
/// flash.read(0x041000, &mut buf).unwrap();
/// assert_eq!(buf, [0xFF; 4]);
/// assert_eq!(flash.get_erase_count(0x041000), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockFlash {
    /// Flash storage (initialized to 0xFF - erased state)
    storage: Vec<u8>,
    /// Erase count per block
    erase_counts: Vec<u32>,
    /// Number of successful write calls
    write_count: u32,
    /// Next write only programs its first half
    torn_write: bool,
    /// Writes left before the power is cut; `Some(0)` means no power
    power_budget: Option<u32>,
    /// Erases left before the power is cut; `Some(0)` means no power
    erase_budget: Option<u32>,
}

impl MockFlash {
    /// Create a new, fully erased mock Flash
    pub fn new() -> Self {
        let block_count = (FLASH_CAPACITY / BLOCK_SIZE) as usize;
        Self {
            storage: vec![0xFF; FLASH_CAPACITY as usize],
            erase_counts: vec![0; block_count],
            write_count: 0,
            torn_write: false,
            power_budget: None,
            erase_budget: None,
        }
    }

    /// Get Flash contents (for test verification)
    pub fn get_contents(&self, address: u32, len: usize) -> Vec<u8> {
        self.storage[address as usize..address as usize + len].to_vec()
    }

    /// Overwrite a range with a fixed pattern, bypassing flash semantics
    pub fn inject_corruption(&mut self, address: u32, len: usize) {
        self.storage[address as usize..address as usize + len].fill(0xAA);
    }

    /// Number of times the block containing `address` has been erased
    pub fn get_erase_count(&self, address: u32) -> u32 {
        self.erase_counts[(address / BLOCK_SIZE) as usize]
    }

    /// Total erase count across all blocks
    pub fn get_total_erase_count(&self) -> u32 {
        self.erase_counts.iter().sum()
    }

    /// Number of successful write calls
    pub fn get_write_count(&self) -> u32 {
        self.write_count
    }

    /// The next write only programs the first half of its data
    pub fn simulate_power_loss(&mut self) {
        self.torn_write = true;
    }

    /// Let `writes` more writes succeed, then fail every write and erase
    pub fn power_off_after(&mut self, writes: u32) {
        self.power_budget = Some(writes);
    }

    /// Let `erases` more erases succeed, then fail every write and erase
    ///
    /// Cuts power right after a block was erased, before it is reprogrammed.
    pub fn power_off_after_erases(&mut self, erases: u32) {
        self.erase_budget = Some(erases);
    }

    /// Undo a scheduled power cut, as after a reboot
    pub fn restore_power(&mut self) {
        self.power_budget = None;
        self.erase_budget = None;
    }

    fn has_power(&self) -> bool {
        self.power_budget != Some(0) && self.erase_budget != Some(0)
    }

    fn is_writable(&self, address: u32, len: usize) -> bool {
        address >= FIRMWARE_SIZE && address as usize + len <= FLASH_CAPACITY as usize
    }
}

impl Default for MockFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashInterface for MockFlash {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        let start = address as usize;
        if start + buf.len() > FLASH_CAPACITY as usize {
            return Err(FlashError::InvalidAddress.into());
        }
        buf.copy_from_slice(&self.storage[start..start + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        if !self.is_writable(address, data.len()) {
            return Err(FlashError::InvalidAddress.into());
        }
        if !self.has_power() {
            return Err(FlashError::WriteFailed.into());
        }

        let write_len = if self.torn_write {
            self.torn_write = false;
            data.len() / 2
        } else {
            data.len()
        };

        // Programming can only clear bits
        let start = address as usize;
        for (cell, byte) in self.storage[start..start + write_len].iter_mut().zip(data) {
            *cell &= *byte;
        }

        self.write_count += 1;
        if let Some(budget) = self.power_budget.as_mut() {
            *budget -= 1;
        }
        Ok(())
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<()> {
        if !self.is_writable(address, size as usize)
            || !address.is_multiple_of(BLOCK_SIZE)
            || !size.is_multiple_of(BLOCK_SIZE)
        {
            return Err(FlashError::InvalidAddress.into());
        }
        if !self.has_power() {
            return Err(FlashError::EraseFailed.into());
        }

        let start = address as usize;
        self.storage[start..start + size as usize].fill(0xFF);

        let first = (address / BLOCK_SIZE) as usize;
        for count in &mut self.erase_counts[first..first + (size / BLOCK_SIZE) as usize] {
            *count += 1;
        }
        if let Some(budget) = self.erase_budget.as_mut() {
            *budget -= 1;
        }
        Ok(())
    }

    fn block_size(&self) -> u32 {
        BLOCK_SIZE
    }

    fn capacity(&self) -> u32 {
        FLASH_CAPACITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_flash_write_only_clears_bits() {
        let mut flash = MockFlash::new();

        flash.write(0x040000, &[0x0F]).unwrap();
        flash.write(0x040000, &[0xF3]).unwrap();

        let mut buf = [0u8; 1];
        flash.read(0x040000, &mut buf).unwrap();
        assert_eq!(buf[0], 0x03);
    }

    #[test]
    fn test_mock_flash_erase() {
        let mut flash = MockFlash::new();
        flash.write(0x040000, &[0x55; 256]).unwrap();
        flash.erase(0x040000, 4096).unwrap();
        flash.erase(0x040000, 4096).unwrap();

        assert!(flash.get_contents(0x040000, 256).iter().all(|&b| b == 0xFF));
        assert_eq!(flash.get_erase_count(0x040000), 2);
        assert_eq!(flash.get_total_erase_count(), 2);
    }

    #[test]
    fn test_mock_flash_protects_firmware() {
        let mut flash = MockFlash::new();
        assert_eq!(
            flash.write(0x000000, &[0x00; 4]),
            Err(FlashError::InvalidAddress.into())
        );
        assert!(flash.erase(0x03F000, 4096).is_err());

        let mut buf = [0u8; 4];
        assert!(flash.read(FLASH_CAPACITY - 2, &mut buf).is_err());
    }

    #[test]
    fn test_mock_flash_unaligned_erase() {
        let mut flash = MockFlash::new();
        assert!(flash.erase(0x040100, 4096).is_err());
        assert!(flash.erase(0x040000, 1024).is_err());
    }

    #[test]
    fn test_mock_flash_torn_write() {
        let mut flash = MockFlash::new();
        flash.simulate_power_loss();
        flash.write(0x040000, &[0x55; 256]).unwrap();

        let contents = flash.get_contents(0x040000, 256);
        assert_eq!(&contents[..128], &[0x55; 128]);
        assert_eq!(&contents[128..], &[0xFF; 128]);

        // Only the next write is torn
        flash.write(0x040100, &[0x11; 4]).unwrap();
        assert_eq!(flash.get_contents(0x040100, 4), [0x11; 4]);
    }

    #[test]
    fn test_mock_flash_power_off() {
        let mut flash = MockFlash::new();
        flash.power_off_after(1);
        flash.write(0x040000, &[0x01]).unwrap();
        assert_eq!(
            flash.write(0x040001, &[0x02]),
            Err(FlashError::WriteFailed.into())
        );
        assert!(flash.erase(0x040000, 4096).is_err());
        assert_eq!(flash.get_contents(0x040000, 2), [0x01, 0xFF]);

        flash.restore_power();
        flash.write(0x040001, &[0x02]).unwrap();
        assert_eq!(flash.get_write_count(), 2);
    }

    #[test]
    fn test_mock_flash_power_off_after_erase() {
        let mut flash = MockFlash::new();
        flash.write(0x040000, &[0x00; 4]).unwrap();
        flash.power_off_after_erases(1);

        flash.erase(0x040000, 4096).unwrap();
        assert_eq!(
            flash.write(0x040000, &[0x12]),
            Err(FlashError::WriteFailed.into())
        );
        assert!(flash.erase(0x041000, 4096).is_err());
        assert_eq!(flash.get_contents(0x040000, 4), [0xFF; 4]);

        flash.restore_power();
        flash.write(0x040000, &[0x12]).unwrap();
    }
}
