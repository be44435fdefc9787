//! Circular telemetry log
//!
//! A [`RecordStore`] divides its partition into fixed-size slots and keeps a
//! FIFO of framed records in them. The in-memory [`LogIndex`] is only a cache:
//! [`RecordStore::init`] rebuilds it from the slot markers after every boot.
//!
//! # Slot lifecycle
//!
//! ```text
//! Empty --append--> Start | Valid --forget_oldest--> Tombstoned --wipe--> Empty
//! ```
//!
//! Live records always form a single contiguous run (wrapping at the end of
//! the partition). The first record written after a wipe is marked `Start`, so
//! a run whose head is `Valid` must be preceded by a tombstone.
//!
//! # Recovery policy
//!
//! Any marker layout that cannot be produced by the operations above marks the
//! store invalid. An invalid store rejects every operation with
//! [`StoreError::StoreInvalid`] until [`RecordStore::wipe`] is called; the scan
//! never guesses which records are trustworthy.

use super::error::StoreError;
use super::record::{slot_size, Marker, RecordPayload, MARKER_SIZE};
use crate::medium::{BlockMedium, MediumError, Partition, READ_SENTINEL};
use alloc::borrow::Cow;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

/// Derived index of the live records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogIndex {
    /// False if the recovery scan found an inconsistent layout
    pub valid: bool,
    /// Number of live records
    pub count: usize,
    /// Slot of the oldest live record, `Some` iff `count > 0`
    pub oldest: Option<usize>,
}

impl LogIndex {
    const fn empty() -> Self {
        Self {
            valid: true,
            count: 0,
            oldest: None,
        }
    }

    const fn invalid() -> Self {
        Self {
            valid: false,
            count: 0,
            oldest: None,
        }
    }
}

/// Marker layout the recovery scan refused to interpret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryFault {
    /// More than one slot carries the `Start` marker
    MultipleStart,
    /// The oldest live record is `Valid` but not preceded by a tombstone
    OrphanValid,
    /// A `Start` record sits behind older live records
    StartNotOldest,
    /// Live records are split by empty, tombstoned or unknown slots
    FragmentedRun,
    /// Every slot is live and none is marked `Start`, so the oldest is unknown.
    ///
    /// A ring that wrapped and then filled up again reaches this state on the
    /// next boot. Recovery then needs `wipe`, which discards the whole
    /// backlog: drain at least one record before a power cycle whenever
    /// `is_full` reports true after a wrap.
    FullWithoutStart,
}

impl RecoveryFault {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RecoveryFault::MultipleStart => "multiple start markers",
            RecoveryFault::OrphanValid => "valid record without preceding start",
            RecoveryFault::StartNotOldest => "start marker inside live range",
            RecoveryFault::FragmentedRun => "live records not contiguous",
            RecoveryFault::FullWithoutStart => "full log without start marker",
        }
    }
}

impl fmt::Display for RecoveryFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful recovery scan
struct Recovered {
    count: usize,
    oldest: Option<usize>,
    head: usize,
    fresh: bool,
}

/// Contiguous batch of live records read from the oldest end of the log
///
/// Holds the raw slot frames, borrowed from the medium when it is directly
/// addressable. The network layer can transmit [`frames`](Self::frames) as-is
/// or decode the payloads.
pub struct RecordBlock<'a, T> {
    frames: Cow<'a, [u8]>,
    used: usize,
    slot_size: usize,
    _payload: PhantomData<fn() -> T>,
}

impl<'a, T: RecordPayload> RecordBlock<'a, T> {
    fn empty(slot_size: usize) -> Self {
        Self {
            frames: Cow::Borrowed(&[]),
            used: 0,
            slot_size,
            _payload: PhantomData,
        }
    }

    /// Number of records in the block
    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Raw slot frames (marker + payload + padding per record)
    pub fn frames(&self) -> &[u8] {
        &self.frames
    }

    /// Payload bytes of the `i`-th record
    pub fn payload(&self, i: usize) -> Option<&[u8]> {
        if i >= self.used {
            return None;
        }
        let start = i * self.slot_size + MARKER_SIZE;
        self.frames.get(start..start + T::SIZE)
    }

    /// Iterate over payload bytes in FIFO order
    pub fn payloads(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.used).filter_map(move |i| self.payload(i))
    }

    /// Decode every record in the block
    pub fn decode(&self) -> Result<Vec<T>, StoreError> {
        self.payloads()
            .map(|bytes| T::from_bytes(bytes).ok_or(StoreError::MalformedPayload))
            .collect()
    }
}

/// Circular FIFO of fixed-size records over a medium partition
///
/// # Example
///
/// ```
/// use opentracker_core::medium::{Partition, RamMedium};
/// use opentracker_core::storage::RecordStore;
/// use opentracker_core::telemetry::ServerData;
///
/// let medium = RamMedium::new(1024);
/// let partition = Partition::new(0, 1024);
/// let mut log = RecordStore::<ServerData, _>::new(medium, partition).unwrap();
/// log.init().unwrap();
///
/// log.append(&ServerData::default()).unwrap();
/// let batch = log.read_oldest_block(8).unwrap();
/// log.forget_oldest(batch.len()).unwrap();
/// assert_eq!(log.count(), 0);
/// ```
pub struct RecordStore<T, M> {
    medium: M,
    partition: Partition,
    slot_size: usize,
    capacity: usize,
    index: LogIndex,
    /// Slot the next append writes to
    head: usize,
    /// Nothing has been written since the last wipe; next append is `Start`
    fresh: bool,
    fault: Option<RecoveryFault>,
    scratch: Vec<u8>,
    _payload: PhantomData<fn() -> T>,
}

impl<T: RecordPayload, M: BlockMedium> RecordStore<T, M> {
    /// Create a store over `partition` of `medium`
    ///
    /// The store starts out invalid; call [`init`](Self::init) before any
    /// other operation.
    pub fn new(medium: M, partition: Partition) -> Result<Self, StoreError> {
        let slot_size = slot_size(T::SIZE);
        let capacity = partition.slots(slot_size);
        if capacity == 0 || !partition.fits_in(medium.len()) {
            return Err(StoreError::PartitionTooSmall);
        }

        Ok(Self {
            medium,
            partition,
            slot_size,
            capacity,
            index: LogIndex::invalid(),
            head: 0,
            fresh: false,
            fault: None,
            scratch: vec![0; T::SIZE],
            _payload: PhantomData,
        })
    }

    /// Rebuild the index from the slot markers
    ///
    /// Returns the recovered index, or [`StoreError::StoreInvalid`] if the
    /// layout is inconsistent (see [`recovery_fault`](Self::recovery_fault)).
    pub fn init(&mut self) -> Result<LogIndex, StoreError> {
        match self.scan() {
            Ok(recovered) => {
                self.index = LogIndex {
                    valid: true,
                    count: recovered.count,
                    oldest: recovered.oldest,
                };
                self.head = recovered.head;
                self.fresh = recovered.fresh;
                self.fault = None;
                Ok(self.index)
            }
            Err(fault) => {
                self.index = LogIndex::invalid();
                self.fault = Some(fault);
                Err(StoreError::StoreInvalid)
            }
        }
    }

    /// Append a record after the newest one
    ///
    /// Fails with [`StoreError::Full`] instead of overwriting the oldest
    /// record. The payload is written before the marker, so a torn append
    /// leaves the slot looking unwritten.
    pub fn append(&mut self, record: &T) -> Result<(), StoreError> {
        self.ensure_valid()?;
        if self.index.count == self.capacity {
            return Err(StoreError::Full);
        }

        let slot = self.head;
        let addr = self.slot_addr(slot);

        record.write_bytes(&mut self.scratch);
        self.medium.write_span(addr + MARKER_SIZE, &self.scratch)?;

        let marker = if self.fresh {
            Marker::Start
        } else {
            Marker::Valid
        };
        self.medium.write_span(addr, &marker.to_bytes())?;

        self.fresh = false;
        if self.index.count == 0 {
            self.index.oldest = Some(slot);
        }
        self.index.count += 1;
        self.head = self.next_slot(slot);
        Ok(())
    }

    /// Oldest record without consuming it
    pub fn peek_oldest(&self) -> Result<Option<T>, StoreError> {
        self.ensure_valid()?;
        let Some(oldest) = self.index.oldest else {
            return Ok(None);
        };

        let span = self
            .medium
            .read_span(self.slot_addr(oldest) + MARKER_SIZE, T::SIZE)
            .ok_or(MediumError::OutOfBounds)?;
        T::from_bytes(&span)
            .map(Some)
            .ok_or(StoreError::MalformedPayload)
    }

    /// Up to `max_count` contiguous records starting at the oldest
    ///
    /// Stops early at the number of live records or at the physical end of the
    /// partition; the next call continues from the start of the partition.
    pub fn oldest_block(&self, max_count: usize) -> Result<RecordBlock<'_, T>, StoreError> {
        self.ensure_valid()?;
        let Some(oldest) = self.index.oldest else {
            return Ok(RecordBlock::empty(self.slot_size));
        };

        let used = max_count
            .min(self.index.count)
            .min(self.capacity - oldest);
        if used == 0 {
            return Ok(RecordBlock::empty(self.slot_size));
        }

        let frames = self
            .medium
            .read_span(self.slot_addr(oldest), used * self.slot_size)
            .ok_or(MediumError::OutOfBounds)?;
        Ok(RecordBlock {
            frames,
            used,
            slot_size: self.slot_size,
            _payload: PhantomData,
        })
    }

    /// Decoded copy of [`oldest_block`](Self::oldest_block); `len()` is the count used
    pub fn read_oldest_block(&self, max_count: usize) -> Result<Vec<T>, StoreError> {
        self.oldest_block(max_count)?.decode()
    }

    /// Tombstone the `n` oldest records, releasing their capacity
    pub fn forget_oldest(&mut self, n: usize) -> Result<(), StoreError> {
        self.ensure_valid()?;
        if n > self.index.count {
            return Err(StoreError::OutOfRange);
        }

        for _ in 0..n {
            let Some(slot) = self.index.oldest else {
                break;
            };
            let addr = self.slot_addr(slot);
            self.medium
                .write_span(addr, &Marker::Tombstoned.to_bytes())?;

            self.index.count -= 1;
            self.index.oldest = if self.index.count == 0 {
                None
            } else {
                Some(self.next_slot(slot))
            };
        }
        Ok(())
    }

    /// Reset every slot to `Empty` and clear the index
    ///
    /// The only way to recover an invalid store and to turn tombstones back
    /// into empty slots.
    pub fn wipe(&mut self) -> Result<(), StoreError> {
        let len = self.capacity * self.slot_size;
        if let Err(e) = self.medium.fill(self.partition.base, len, READ_SENTINEL) {
            self.index = LogIndex::invalid();
            return Err(e.into());
        }

        self.index = LogIndex::empty();
        self.head = 0;
        self.fresh = true;
        self.fault = None;
        Ok(())
    }

    /// Current index
    pub fn index(&self) -> LogIndex {
        self.index
    }

    /// Number of live records
    pub fn count(&self) -> usize {
        self.index.count
    }

    /// Number of slots in the partition
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_valid(&self) -> bool {
        self.index.valid
    }

    pub fn is_empty(&self) -> bool {
        self.index.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.index.count == self.capacity
    }

    /// Bytes per slot (marker + payload, word aligned)
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// Why the last recovery scan rejected the partition
    pub fn recovery_fault(&self) -> Option<RecoveryFault> {
        self.fault
    }

    /// Marker currently stored in `slot`
    pub fn marker(&self, slot: usize) -> Option<Marker> {
        (slot < self.capacity).then(|| self.marker_at(slot))
    }

    /// Get medium reference (for testing)
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Get mutable medium reference (for testing)
    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    /// Release the medium, e.g. to reopen it as after a reboot
    pub fn into_medium(self) -> M {
        self.medium
    }

    fn ensure_valid(&self) -> Result<(), StoreError> {
        if self.index.valid {
            Ok(())
        } else {
            Err(StoreError::StoreInvalid)
        }
    }

    fn slot_addr(&self, slot: usize) -> usize {
        self.partition.base + slot * self.slot_size
    }

    fn next_slot(&self, slot: usize) -> usize {
        (slot + 1) % self.capacity
    }

    fn marker_at(&self, slot: usize) -> Marker {
        match self.medium.read_span(self.slot_addr(slot), MARKER_SIZE) {
            Some(bytes) => Marker::from_bytes(&bytes),
            None => Marker::Empty,
        }
    }

    /// Single linear pass over the slot markers
    fn scan(&self) -> Result<Recovered, RecoveryFault> {
        let capacity = self.capacity;
        let mut start = None;
        let mut run_head = None;
        let mut run_pred = Marker::Empty;
        let mut runs = 0;
        let mut live = 0;
        let mut written = false;
        let mut first_unused = None;

        // Slot 0's predecessor is the last slot
        let mut prev = self.marker_at(capacity - 1);

        for slot in 0..capacity {
            let marker = self.marker_at(slot);
            match marker {
                Marker::Start => {
                    if start.replace(slot).is_some() {
                        return Err(RecoveryFault::MultipleStart);
                    }
                }
                Marker::Empty | Marker::Unknown(_) => {
                    if first_unused.is_none() {
                        first_unused = Some(slot);
                    }
                }
                Marker::Valid | Marker::Tombstoned => {}
            }

            if marker.is_live() || marker == Marker::Tombstoned {
                written = true;
            }

            if marker.is_live() {
                live += 1;
                if !prev.is_live() {
                    runs += 1;
                    run_head = Some(slot);
                    run_pred = prev;
                }
            }
            prev = marker;
        }

        if live == 0 {
            return Ok(Recovered {
                count: 0,
                oldest: None,
                head: first_unused.unwrap_or(0),
                fresh: !written,
            });
        }

        let oldest = match (runs, run_head) {
            (0, _) => start.ok_or(RecoveryFault::FullWithoutStart)?,
            (1, Some(head)) => {
                match start {
                    Some(slot) if slot != head => return Err(RecoveryFault::StartNotOldest),
                    Some(_) => {}
                    None if run_pred != Marker::Tombstoned => {
                        return Err(RecoveryFault::OrphanValid)
                    }
                    None => {}
                }
                head
            }
            _ => return Err(RecoveryFault::FragmentedRun),
        };

        Ok(Recovered {
            count: live,
            oldest: Some(oldest),
            head: (oldest + live) % capacity,
            fresh: false,
        })
    }
}

impl<T, M> fmt::Debug for RecordStore<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("partition", &self.partition)
            .field("slot_size", &self.slot_size)
            .field("capacity", &self.capacity)
            .field("index", &self.index)
            .field("head", &self.head)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::RamMedium;
    use crate::storage::record::{MARKER_START, MARKER_TOMBSTONED, MARKER_VALID};

    /// 6-byte payload, 12-byte slot
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Sample {
        seq: u32,
        tag: u16,
    }

    impl Sample {
        fn new(seq: u32) -> Self {
            Self {
                seq,
                tag: (seq as u16).wrapping_mul(7),
            }
        }
    }

    impl RecordPayload for Sample {
        const SIZE: usize = 6;

        fn write_bytes(&self, buf: &mut [u8]) {
            buf[0..4].copy_from_slice(&self.seq.to_le_bytes());
            buf[4..6].copy_from_slice(&self.tag.to_le_bytes());
        }

        fn from_bytes(buf: &[u8]) -> Option<Self> {
            Some(Self {
                seq: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
                tag: u16::from_le_bytes([buf[4], buf[5]]),
            })
        }
    }

    const SLOT: usize = 12;

    fn store(slots: usize) -> RecordStore<Sample, RamMedium> {
        let medium = RamMedium::new(slots * SLOT);
        let partition = Partition::whole(&medium);
        let mut store = RecordStore::new(medium, partition).unwrap();
        store.init().unwrap();
        store
    }

    fn reboot(store: RecordStore<Sample, RamMedium>) -> RecordStore<Sample, RamMedium> {
        let medium = store.into_medium();
        let partition = Partition::whole(&medium);
        RecordStore::new(medium, partition).unwrap()
    }

    fn set_marker(store: &mut RecordStore<Sample, RamMedium>, slot: usize, raw: u32) {
        let addr = slot * SLOT;
        store.medium_mut().as_bytes_mut()[addr..addr + 4].copy_from_slice(&raw.to_le_bytes());
    }

    #[test]
    fn test_new_partition_is_empty() {
        let store = store(8);
        assert_eq!(store.capacity(), 8);
        assert_eq!(store.slot_size(), SLOT);
        assert_eq!(
            store.index(),
            LogIndex {
                valid: true,
                count: 0,
                oldest: None
            }
        );
        assert_eq!(store.peek_oldest().unwrap(), None);
        assert!(store.read_oldest_block(4).unwrap().is_empty());
    }

    #[test]
    fn test_partition_too_small() {
        let medium = RamMedium::new(64);
        assert_eq!(
            RecordStore::<Sample, _>::new(medium.clone(), Partition::new(0, SLOT - 1)).unwrap_err(),
            StoreError::PartitionTooSmall
        );
        assert_eq!(
            RecordStore::<Sample, _>::new(medium, Partition::new(60, SLOT)).unwrap_err(),
            StoreError::PartitionTooSmall
        );
    }

    #[test]
    fn test_operations_before_init_rejected() {
        let medium = RamMedium::new(4 * SLOT);
        let partition = Partition::whole(&medium);
        let mut store = RecordStore::<Sample, _>::new(medium, partition).unwrap();
        assert_eq!(store.append(&Sample::new(1)), Err(StoreError::StoreInvalid));
    }

    #[test]
    fn test_first_record_marked_start() {
        let mut store = store(4);
        store.append(&Sample::new(1)).unwrap();
        store.append(&Sample::new(2)).unwrap();
        assert_eq!(store.marker(0), Some(Marker::Start));
        assert_eq!(store.marker(1), Some(Marker::Valid));
        assert_eq!(store.marker(2), Some(Marker::Empty));
        assert_eq!(store.marker(4), None);
    }

    #[test]
    fn test_fifo_order() {
        let mut store = store(10);
        for seq in 0..7 {
            store.append(&Sample::new(seq)).unwrap();
        }

        let mut received = Vec::new();
        while !store.is_empty() {
            let batch = store.read_oldest_block(3).unwrap();
            store.forget_oldest(batch.len()).unwrap();
            received.extend(batch.into_iter().map(|s| s.seq));
        }
        assert_eq!(received, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_capacity_law() {
        let mut store = store(5);
        for seq in 0..5 {
            assert_eq!(store.count(), seq as usize);
            store.append(&Sample::new(seq)).unwrap();
        }
        assert!(store.is_full());
        assert_eq!(store.append(&Sample::new(99)), Err(StoreError::Full));
        assert_eq!(store.count(), 5);
        assert_eq!(store.peek_oldest().unwrap(), Some(Sample::new(0)));
    }

    #[test]
    fn test_reclaim_after_forget() {
        let mut store = store(3);
        for seq in 0..3 {
            store.append(&Sample::new(seq)).unwrap();
        }
        store.forget_oldest(2).unwrap();
        assert_eq!(store.count(), 1);
        assert_eq!(store.index().oldest, Some(2));

        store.append(&Sample::new(3)).unwrap();
        store.append(&Sample::new(4)).unwrap();
        assert!(store.is_full());
        assert_eq!(store.marker(0), Some(Marker::Valid));

        let all: Vec<u32> = drain(&mut store);
        assert_eq!(all, [2, 3, 4]);
    }

    fn drain(store: &mut RecordStore<Sample, RamMedium>) -> Vec<u32> {
        let mut out = Vec::new();
        while !store.is_empty() {
            let batch = store.read_oldest_block(usize::MAX).unwrap();
            store.forget_oldest(batch.len()).unwrap();
            out.extend(batch.iter().map(|s| s.seq));
        }
        out
    }

    #[test]
    fn test_block_stops_at_wrap_boundary() {
        let mut store = store(4);
        for seq in 0..4 {
            store.append(&Sample::new(seq)).unwrap();
        }
        store.forget_oldest(3).unwrap();
        store.append(&Sample::new(4)).unwrap();
        store.append(&Sample::new(5)).unwrap();

        // Oldest is slot 3; the batch cannot cross into slot 0
        let batch = store.read_oldest_block(10).unwrap();
        assert_eq!(batch, [Sample::new(3)]);
        store.forget_oldest(1).unwrap();

        let batch = store.read_oldest_block(10).unwrap();
        assert_eq!(batch, [Sample::new(4), Sample::new(5)]);
    }

    #[test]
    fn test_block_is_read_only() {
        let mut store = store(4);
        store.append(&Sample::new(1)).unwrap();
        store.append(&Sample::new(2)).unwrap();

        let block = store.oldest_block(1).unwrap();
        assert_eq!(block.len(), 1);
        assert_eq!(block.frames().len(), SLOT);
        assert_eq!(block.payload(0), Some(&block.frames()[4..10]));
        assert_eq!(block.payload(1), None);
        assert_eq!(store.count(), 2);
        assert_eq!(store.read_oldest_block(0).unwrap(), []);
    }

    #[test]
    fn test_forget_out_of_range() {
        let mut store = store(4);
        store.append(&Sample::new(1)).unwrap();
        assert_eq!(store.forget_oldest(2), Err(StoreError::OutOfRange));
        assert_eq!(store.count(), 1);
        store.forget_oldest(0).unwrap();
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_forget_tombstones_slots() {
        let mut store = store(4);
        store.append(&Sample::new(1)).unwrap();
        store.append(&Sample::new(2)).unwrap();
        store.forget_oldest(2).unwrap();
        assert_eq!(store.marker(0), Some(Marker::Tombstoned));
        assert_eq!(store.marker(1), Some(Marker::Tombstoned));
        assert_eq!(store.index().oldest, None);
    }

    #[test]
    fn test_wipe_law() {
        let mut store = store(4);
        store.append(&Sample::new(1)).unwrap();
        store.append(&Sample::new(2)).unwrap();
        store.forget_oldest(1).unwrap();

        store.wipe().unwrap();
        assert_eq!(
            store.index(),
            LogIndex {
                valid: true,
                count: 0,
                oldest: None
            }
        );
        for slot in 0..4 {
            assert_eq!(store.marker(slot), Some(Marker::Empty));
        }
        assert!(store.medium().as_bytes().iter().all(|&b| b == 0xFF));

        store.append(&Sample::new(3)).unwrap();
        assert_eq!(store.marker(0), Some(Marker::Start));
    }

    #[test]
    fn test_recovery_reproduces_index() {
        let mut store = store(6);
        for seq in 0..4 {
            store.append(&Sample::new(seq)).unwrap();
        }
        let before = store.index();

        let mut store = reboot(store);
        assert_eq!(store.init().unwrap(), before);
        assert_eq!(store.peek_oldest().unwrap(), Some(Sample::new(0)));
    }

    #[test]
    fn test_recovery_after_forget_and_wrap() {
        let mut store = store(4);
        for seq in 0..4 {
            store.append(&Sample::new(seq)).unwrap();
        }
        store.forget_oldest(2).unwrap();
        store.append(&Sample::new(4)).unwrap();
        let before = store.index();
        assert_eq!(before.oldest, Some(2));
        assert_eq!(before.count, 3);

        let mut store = reboot(store);
        assert_eq!(store.init().unwrap(), before);

        // Next append continues after the newest record
        store.append(&Sample::new(5)).unwrap();
        assert_eq!(store.marker(1), Some(Marker::Valid));
        assert_eq!(drain(&mut store), [2, 3, 4, 5]);
    }

    #[test]
    fn test_recovery_of_drained_log_continues_after_tombstones() {
        let mut store = store(5);
        for seq in 0..3 {
            store.append(&Sample::new(seq)).unwrap();
        }
        store.forget_oldest(3).unwrap();

        let mut store = reboot(store);
        let index = store.init().unwrap();
        assert_eq!(index.count, 0);

        store.append(&Sample::new(7)).unwrap();
        assert_eq!(store.marker(3), Some(Marker::Valid));

        let mut store = reboot(store);
        let index = store.init().unwrap();
        assert_eq!(index.oldest, Some(3));
        assert_eq!(store.peek_oldest().unwrap(), Some(Sample::new(7)));
    }

    #[test]
    fn test_recovery_of_full_log_after_wrap() {
        let mut store = store(3);
        for seq in 0..3 {
            store.append(&Sample::new(seq)).unwrap();
        }
        let before = store.index();

        let mut store = reboot(store);
        assert_eq!(store.init().unwrap(), before);
        assert_eq!(store.append(&Sample::new(3)), Err(StoreError::Full));
    }

    #[test]
    fn test_recovery_rejects_multiple_start() {
        let mut store = store(4);
        store.append(&Sample::new(0)).unwrap();
        store.append(&Sample::new(1)).unwrap();
        set_marker(&mut store, 1, MARKER_START);

        let mut store = reboot(store);
        assert_eq!(store.init(), Err(StoreError::StoreInvalid));
        assert_eq!(store.recovery_fault(), Some(RecoveryFault::MultipleStart));
        assert!(!store.is_valid());
        assert_eq!(store.append(&Sample::new(2)), Err(StoreError::StoreInvalid));
        assert_eq!(store.peek_oldest(), Err(StoreError::StoreInvalid));
        assert_eq!(store.forget_oldest(0), Err(StoreError::StoreInvalid));
        assert!(store.read_oldest_block(1).is_err());
    }

    #[test]
    fn test_recovery_rejects_valid_without_start() {
        let mut store = store(4);
        set_marker(&mut store, 0, MARKER_VALID);

        let mut store = reboot(store);
        assert_eq!(store.init(), Err(StoreError::StoreInvalid));
        assert_eq!(store.recovery_fault(), Some(RecoveryFault::OrphanValid));
    }

    #[test]
    fn test_recovery_rejects_unknown_inside_live_range() {
        let mut store = store(5);
        for seq in 0..4 {
            store.append(&Sample::new(seq)).unwrap();
        }
        set_marker(&mut store, 2, 0x1234_5678);

        let mut store = reboot(store);
        assert_eq!(store.init(), Err(StoreError::StoreInvalid));
        assert_eq!(store.recovery_fault(), Some(RecoveryFault::FragmentedRun));
    }

    #[test]
    fn test_recovery_rejects_start_behind_live_records() {
        let mut store = store(4);
        set_marker(&mut store, 0, MARKER_TOMBSTONED);
        set_marker(&mut store, 1, MARKER_VALID);
        set_marker(&mut store, 2, MARKER_START);

        let mut store = reboot(store);
        assert_eq!(store.init(), Err(StoreError::StoreInvalid));
        assert_eq!(store.recovery_fault(), Some(RecoveryFault::StartNotOldest));
    }

    #[test]
    fn test_recovery_rejects_full_ring_without_start() {
        let mut store = store(3);
        for slot in 0..3 {
            set_marker(&mut store, slot, MARKER_VALID);
        }

        let mut store = reboot(store);
        assert_eq!(store.init(), Err(StoreError::StoreInvalid));
        assert_eq!(store.recovery_fault(), Some(RecoveryFault::FullWithoutStart));
    }

    #[test]
    fn test_torn_append_is_invisible() {
        let mut store = store(4);
        store.append(&Sample::new(0)).unwrap();
        // Payload of slot 1 written, marker never reached the medium
        let addr = SLOT + MARKER_SIZE;
        store.medium_mut().as_bytes_mut()[addr..addr + 6].fill(0x42);

        let mut store = reboot(store);
        assert_eq!(store.init().unwrap().count, 1);
        store.append(&Sample::new(1)).unwrap();
        assert_eq!(drain(&mut store), [0, 1]);
    }

    #[test]
    fn test_wipe_recovers_invalid_store() {
        let mut store = store(4);
        set_marker(&mut store, 1, 0xDEAD_BEEF);
        set_marker(&mut store, 0, MARKER_VALID);

        let mut store = reboot(store);
        assert!(store.init().is_err());
        store.wipe().unwrap();
        assert!(store.is_valid());
        assert_eq!(store.recovery_fault(), None);
        store.append(&Sample::new(1)).unwrap();
        assert_eq!(store.peek_oldest().unwrap(), Some(Sample::new(1)));
    }

    #[test]
    fn test_store_in_partition_offset() {
        let medium = RamMedium::new(100);
        let partition = Partition::new(40, 36);
        let mut store = RecordStore::<Sample, _>::new(medium, partition).unwrap();
        store.init().unwrap();
        assert_eq!(store.capacity(), 3);

        store.append(&Sample::new(9)).unwrap();
        store.wipe().unwrap();
        store.append(&Sample::new(10)).unwrap();

        let bytes = store.medium().as_bytes();
        assert!(bytes[..40].iter().all(|&b| b == 0xFF));
        assert_eq!(&bytes[40..44], &MARKER_START.to_le_bytes());
        assert!(bytes[76..].iter().all(|&b| b == 0xFF));
    }
}
