//! Flash-backed storage medium
//!
//! Maps logical offsets `0..size` onto a fixed, block-aligned flash region.
//! NOR flash can only clear bits, so each write is classified per erase block:
//!
//! - every new byte only clears bits of the old one: programmed in place
//! - a whole block is being reset to 0xFF: erased
//! - otherwise: the block is merged with the new bytes and swapped in through
//!   the spare area
//!
//! # Block swap
//!
//! The spare area is two erase blocks owned by this medium: a shadow block and
//! a journal of 16-byte swap entries.
//!
//! ```text
//! 1. erase shadow, program merged block into shadow
//! 2. append journal entry { magic, target, crc32(shadow), state = pending }
//! 3. erase target, program merged block into target
//! 4. clear entry state (done)
//! ```
//!
//! The target is only erased once a verified copy exists in the shadow block.
//! [`FlashMedium::new`] finishes a swap whose last journal entry is still
//! pending, so a power cut at any step leaves either the old or the new block.
//!
//! Record markers only ever clear bits, so appends to erased slots and
//! tombstoning never erase. Reusing a tombstoned slot or saving settings over
//! an existing record costs one block swap.

use crate::platform::{FlashError, FlashInterface, PlatformError};
use crate::{log_error, log_warn};
use alloc::borrow::Cow;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;
use opentracker_core::medium::{span_fits, BlockMedium, MediumError, READ_SENTINEL};
use opentracker_core::storage::calculate_crc32;

/// Journal entry magic ("SWAP")
const SWAP_MAGIC: u32 = 0x5357_4150;
const SWAP_PENDING: u32 = 0xFFFF_FFFF;
const SWAP_DONE: u32 = 0;
const ENTRY_SIZE: usize = 16;
/// Offset of the state word inside an entry
const ENTRY_STATE: usize = 12;

/// One journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SwapEntry {
    magic: u32,
    /// Physical address of the block being replaced
    target: u32,
    /// CRC-32 of the shadow block contents
    crc: u32,
    state: u32,
}

impl SwapEntry {
    fn pending(target: u32, crc: u32) -> Self {
        Self {
            magic: SWAP_MAGIC,
            target,
            crc,
            state: SWAP_PENDING,
        }
    }

    fn from_bytes(buf: &[u8]) -> Self {
        let word = |i: usize| u32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
        Self {
            magic: word(0),
            target: word(4),
            crc: word(8),
            state: word(ENTRY_STATE),
        }
    }

    fn to_bytes(self) -> [u8; ENTRY_SIZE] {
        let mut buf = [0u8; ENTRY_SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..8].copy_from_slice(&self.target.to_le_bytes());
        buf[8..12].copy_from_slice(&self.crc.to_le_bytes());
        buf[ENTRY_STATE..].copy_from_slice(&self.state.to_le_bytes());
        buf
    }
}

fn region_fits(start: u32, len: u32, capacity: u32) -> bool {
    start.checked_add(len).is_some_and(|end| end <= capacity)
}

/// Flash region exposed as a [`BlockMedium`]
///
/// Borrows the flash driver through a `RefCell` so several partitions can
/// share one device. Each medium needs its own spare area.
pub struct FlashMedium<'a, F: FlashInterface> {
    flash: &'a RefCell<F>,
    base: u32,
    size: usize,
    block_size: usize,
    /// Shadow block; the journal block follows it
    spare: u32,
    /// Next free journal entry
    journal_next: usize,
    /// A swap failed after its journal entry was written
    interrupted: bool,
}

impl<'a, F: FlashInterface> FlashMedium<'a, F> {
    /// Expose `size` bytes of flash starting at `base`, with the two-block
    /// spare area at `spare`
    ///
    /// Completes a block swap interrupted by a power cut.
    ///
    /// # Errors
    ///
    /// `PlatformError::Flash(FlashError::InvalidAddress)` if the region or the
    /// spare area is not aligned to erase blocks, exceeds the device, or the
    /// two overlap. Flash errors while completing a swap are passed through.
    pub fn new(
        flash: &'a RefCell<F>,
        base: u32,
        size: u32,
        spare: u32,
    ) -> Result<Self, PlatformError> {
        let (block_size, capacity) = {
            let flash = flash.borrow();
            (flash.block_size(), flash.capacity())
        };

        let spare_size = block_size.saturating_mul(2);
        let valid = block_size != 0
            && base.is_multiple_of(block_size)
            && size.is_multiple_of(block_size)
            && spare.is_multiple_of(block_size)
            && region_fits(base, size, capacity)
            && region_fits(spare, spare_size, capacity)
            && (spare + spare_size <= base || spare >= base + size);
        if !valid {
            log_error!(
                "Flash region {:#x}+{:#x} with spare {:#x} invalid",
                base,
                size,
                spare
            );
            return Err(FlashError::InvalidAddress.into());
        }

        let mut medium = Self {
            flash,
            base,
            size: size as usize,
            block_size: block_size as usize,
            spare,
            journal_next: 0,
            interrupted: false,
        };
        medium.recover()?;
        Ok(medium)
    }

    /// Physical address of the first byte
    pub fn base(&self) -> u32 {
        self.base
    }

    fn physical(&self, addr: usize) -> u32 {
        self.base + addr as u32
    }

    fn journal_base(&self) -> u32 {
        self.spare + self.block_size as u32
    }

    fn entry_addr(&self, slot: usize) -> u32 {
        self.journal_base() + (slot * ENTRY_SIZE) as u32
    }

    fn journal_slots(&self) -> usize {
        self.block_size / ENTRY_SIZE
    }

    fn owns_block(&self, target: u32) -> bool {
        target >= self.base
            && ((target - self.base) as usize) < self.size
            && ((target - self.base) as usize).is_multiple_of(self.block_size)
    }

    fn read_raw(&self, addr: usize, buf: &mut [u8]) -> Result<(), MediumError> {
        self.flash
            .borrow_mut()
            .read(self.physical(addr), buf)
            .map_err(|e| self.device_error("read", addr, e))
    }

    fn device_error(&self, op: &str, addr: usize, error: PlatformError) -> MediumError {
        log_warn!("Flash {} at {:#x} failed: {:?}", op, self.physical(addr), error);
        MediumError::Device
    }

    /// Locate the journal head and finish a pending swap
    fn recover(&mut self) -> Result<(), PlatformError> {
        let flash = self.flash;
        let mut journal = vec![0u8; self.block_size];
        flash.borrow_mut().read(self.journal_base(), &mut journal)?;

        let last = journal
            .chunks_exact(ENTRY_SIZE)
            .rposition(|entry| entry.iter().any(|&b| b != READ_SENTINEL));
        self.journal_next = last.map_or(0, |slot| slot + 1);
        self.interrupted = false;

        let Some(slot) = last else {
            return Ok(());
        };
        let entry = SwapEntry::from_bytes(&journal[slot * ENTRY_SIZE..(slot + 1) * ENTRY_SIZE]);
        if entry.magic != SWAP_MAGIC || entry.state != SWAP_PENDING || !self.owns_block(entry.target)
        {
            return Ok(());
        }

        let mut shadow = vec![0u8; self.block_size];
        flash.borrow_mut().read(self.spare, &mut shadow)?;
        if calculate_crc32(&shadow) != entry.crc {
            log_warn!("Discarding incomplete swap of block {:#x}", entry.target);
            return Ok(());
        }

        log_warn!("Completing interrupted swap of block {:#x}", entry.target);
        let mut flash = flash.borrow_mut();
        flash.erase(entry.target, self.block_size as u32)?;
        flash.write(entry.target, &shadow)?;
        flash.write(self.entry_addr(slot) + ENTRY_STATE as u32, &SWAP_DONE.to_le_bytes())
    }

    /// Replace the block at `block_start` with `block` through the spare area
    fn swap_block(&mut self, block_start: usize, block: &[u8]) -> Result<(), PlatformError> {
        let target = self.physical(block_start);
        let block_len = self.block_size as u32;
        let flash = self.flash;
        let mut flash = flash.borrow_mut();

        flash.erase(self.spare, block_len)?;
        if self.journal_next >= self.journal_slots() {
            // Safe only after the shadow is gone: no stale entry can match it
            flash.erase(self.journal_base(), block_len)?;
            self.journal_next = 0;
        }
        flash.write(self.spare, block)?;

        let slot = self.journal_next;
        self.journal_next += 1;
        let entry = SwapEntry::pending(target, calculate_crc32(block));
        flash.write(self.entry_addr(slot), &entry.to_bytes())?;

        self.interrupted = true;
        flash.erase(target, block_len)?;
        flash.write(target, block)?;
        flash.write(self.entry_addr(slot) + ENTRY_STATE as u32, &SWAP_DONE.to_le_bytes())?;
        self.interrupted = false;
        Ok(())
    }

    /// Apply `len` new bytes starting at `addr`, where byte `i` is `source(i)`
    fn update(
        &mut self,
        addr: usize,
        len: usize,
        source: impl Fn(usize) -> u8,
    ) -> Result<(), MediumError> {
        if !span_fits(addr, len, self.size) {
            return Err(MediumError::OutOfBounds);
        }
        if self.interrupted {
            self.recover().map_err(|e| self.device_error("recover", 0, e))?;
        }

        let end = addr + len;
        let mut pos = addr;
        while pos < end {
            let block_start = pos - pos % self.block_size;
            let chunk_end = end.min(block_start + self.block_size);
            let new: Vec<u8> = (pos..chunk_end).map(|p| source(p - addr)).collect();
            self.update_block(block_start, pos, &new)?;
            pos = chunk_end;
        }
        Ok(())
    }

    /// Write `new` at `pos`, which lies within the block at `block_start`
    fn update_block(&mut self, block_start: usize, pos: usize, new: &[u8]) -> Result<(), MediumError> {
        let mut old = vec![0u8; new.len()];
        self.read_raw(pos, &mut old)?;

        if old == new {
            return Ok(());
        }

        if old.iter().zip(new).all(|(o, n)| o & n == *n) {
            return self
                .flash
                .borrow_mut()
                .write(self.physical(pos), new)
                .map_err(|e| self.device_error("write", pos, e));
        }

        let whole_block = pos == block_start && new.len() == self.block_size;
        if whole_block && new.iter().all(|&b| b == READ_SENTINEL) {
            return self
                .flash
                .borrow_mut()
                .erase(self.physical(block_start), self.block_size as u32)
                .map_err(|e| self.device_error("erase", block_start, e));
        }

        let mut block = vec![0u8; self.block_size];
        self.read_raw(block_start, &mut block)?;
        let offset = pos - block_start;
        block[offset..offset + new.len()].copy_from_slice(new);

        self.swap_block(block_start, &block)
            .map_err(|e| self.device_error("swap", block_start, e))
    }
}

impl<F: FlashInterface> BlockMedium for FlashMedium<'_, F> {
    fn len(&self) -> usize {
        self.size
    }

    fn read(&self, addr: usize) -> u8 {
        let mut byte = [READ_SENTINEL];
        if addr >= self.size || self.read_raw(addr, &mut byte).is_err() {
            return READ_SENTINEL;
        }
        byte[0]
    }

    fn read_span(&self, addr: usize, len: usize) -> Option<Cow<'_, [u8]>> {
        if !span_fits(addr, len, self.size) {
            return None;
        }
        let mut buf = vec![0u8; len];
        self.read_raw(addr, &mut buf).ok()?;
        Some(Cow::Owned(buf))
    }

    fn write_span(&mut self, addr: usize, data: &[u8]) -> Result<(), MediumError> {
        self.update(addr, data.len(), |i| data[i])
    }

    fn fill(&mut self, addr: usize, len: usize, value: u8) -> Result<(), MediumError> {
        self.update(addr, len, |_| value)
    }
}
