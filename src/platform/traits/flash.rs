//! Flash interface trait
//!
//! This module defines the Flash storage interface that platform implementations must provide.
//! Flash holds the tracker's settings record and the buffered telemetry log.

use crate::platform::Result;

/// Flash interface trait
///
/// Platform implementations must provide this interface for Flash read/write/erase operations.
///
/// # Flash Characteristics
///
/// - Flash is organized in erase blocks (typically 4 KB)
/// - Erase operations set all bytes to 0xFF
/// - Write operations can only change bits from 1→0 (must erase first to reset to 1)
/// - Flash operations are blocking
///
/// # Safety Invariants
///
/// - Only one owner per Flash instance (share it through a `RefCell`)
/// - Must not erase/write the firmware region (implementations must validate addresses)
///
/// # Memory Layout
///
/// ```text
/// [Firmware]           0x000000 - 0x040000 (256 KB) - DO NOT WRITE
/// [Settings]           0x040000 - 0x041000 (4 KB)
/// [Telemetry Log]      0x041000 - 0x080000 (252 KB)
/// [Log Spare]          0x080000 - 0x082000 (8 KB)
/// [Settings Spare]     0x082000 - 0x084000 (8 KB)
/// ```
///
/// See [`crate::storage::layout`] for the authoritative constants.
pub trait FlashInterface {
    /// Read `buf.len()` bytes starting at `address`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the range is out of bounds.
    /// Returns `PlatformError::Flash(FlashError::ReadFailed)` if the read operation fails.
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()>;

    /// Program `data` starting at `address`
    ///
    /// Bits can only be cleared: the stored byte becomes `old & new`. Callers
    /// needing to set bits must erase the containing block first.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if address is in firmware region.
    /// Returns `PlatformError::Flash(FlashError::WriteFailed)` if the write operation fails.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<()>;

    /// Erase `size` bytes starting at `address`, setting them to 0xFF
    ///
    /// Address and size must be multiples of [`block_size`](Self::block_size).
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the range is
    /// protected or misaligned.
    /// Returns `PlatformError::Flash(FlashError::EraseFailed)` if the erase operation fails.
    fn erase(&mut self, address: u32, size: u32) -> Result<()>;

    /// Minimum erasable unit size in bytes
    fn block_size(&self) -> u32;

    /// Total Flash size in bytes
    fn capacity(&self) -> u32;
}
