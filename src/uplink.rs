//! Telemetry upload
//!
//! The network layer drains the telemetry log in batches:
//!
//! ```text
//! oldest_block(batch) --> Uplink::send --ok--> forget_oldest(sent)
//!                                      \-err-> log left untouched
//! ```
//!
//! Records are only forgotten after the server accepted them, so a failed or
//! interrupted upload is retried from the same record on the next drain.

use crate::{log_debug, log_warn};
use core::fmt;
use opentracker_core::medium::BlockMedium;
use opentracker_core::storage::{RecordBlock, RecordPayload, RecordStore, StoreError};

/// Transport that delivers a batch of records to the server
///
/// Implementations either encode the decoded payloads or forward
/// [`RecordBlock::frames`] as-is. Returning `Ok` confirms delivery of every
/// record in the batch.
pub trait Uplink<T: RecordPayload> {
    type Error;

    fn send(&mut self, batch: &RecordBlock<'_, T>) -> Result<(), Self::Error>;
}

/// Drain failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainError<E> {
    /// Reading or consuming the log failed
    Store(StoreError),
    /// The transport rejected the batch
    Uplink(E),
}

impl<E: fmt::Display> fmt::Display for DrainError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrainError::Store(e) => write!(f, "store error: {}", e),
            DrainError::Uplink(e) => write!(f, "uplink error: {}", e),
        }
    }
}

impl<E> From<StoreError> for DrainError<E> {
    fn from(error: StoreError) -> Self {
        DrainError::Store(error)
    }
}

/// Send up to `batch` of the oldest records and forget the ones delivered
///
/// Returns the number of records sent; `0` when the log is empty. A batch
/// never spans the physical end of the log, so draining a wrapped log takes
/// one extra call.
pub fn drain_once<T, M, U>(
    store: &mut RecordStore<T, M>,
    uplink: &mut U,
    batch: usize,
) -> Result<usize, DrainError<U::Error>>
where
    T: RecordPayload,
    M: BlockMedium,
    U: Uplink<T>,
{
    let used = {
        let block = store.oldest_block(batch)?;
        if block.is_empty() {
            return Ok(0);
        }
        if let Err(e) = uplink.send(&block) {
            log_warn!("Uplink of {} records failed, keeping them", block.len());
            return Err(DrainError::Uplink(e));
        }
        block.len()
    };

    store.forget_oldest(used)?;
    log_debug!("Uplinked {} records, {} remaining", used, store.count());
    Ok(used)
}

/// Drain until the log is empty or a call fails; returns the records sent
pub fn drain_all<T, M, U>(
    store: &mut RecordStore<T, M>,
    uplink: &mut U,
    batch: usize,
) -> Result<usize, DrainError<U::Error>>
where
    T: RecordPayload,
    M: BlockMedium,
    U: Uplink<T>,
{
    let mut total = 0;
    loop {
        match drain_once(store, uplink, batch)? {
            0 => return Ok(total),
            sent => total += sent,
        }
    }
}
