//! Batches and the batcher that builds them.

use std::fmt;

use crate::config::MAX_PREALLOCATED_BATCH;
use crate::record::Record;

/// Which records a batch covers, for error context and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRange {
    /// 0-based batch sequence number in arrival order
    pub sequence: u64,
    /// 1-based index of the first parsed record in the batch
    pub first: u64,
    /// 1-based index of the last parsed record in the batch
    pub last: u64,
}

impl fmt::Display for BatchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch #{} (records {}-{})",
            self.sequence, self.first, self.last
        )
    }
}

/// An ordered, non-empty group of records handed to exactly one writer.
///
/// Never mutated after it leaves the [`Batcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    sequence: u64,
    first: u64,
    records: Vec<Record>,
}

impl Batch {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn range(&self) -> BatchRange {
        BatchRange {
            sequence: self.sequence,
            first: self.first,
            last: self.first + self.records.len() as u64 - 1,
        }
    }
}

/// Groups records into batches of a fixed size, preserving arrival order.
pub struct Batcher {
    batch_size: usize,
    pending: Vec<Record>,
    next_sequence: u64,
    next_first: u64,
}

impl Batcher {
    /// Creates a batcher. A `batch_size` of 0 is treated as 1.
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            pending: Vec::with_capacity(batch_size.min(MAX_PREALLOCATED_BATCH)),
            next_sequence: 0,
            next_first: 1,
        }
    }

    /// Adds a record; returns a completed batch once `batch_size` is reached.
    pub fn push(&mut self, record: Record) -> Option<Batch> {
        self.pending.push(record);
        if self.pending.len() >= self.batch_size {
            let reserve = self.batch_size.min(MAX_PREALLOCATED_BATCH);
            let full = std::mem::replace(&mut self.pending, Vec::with_capacity(reserve));
            Some(self.seal(full))
        } else {
            None
        }
    }

    /// Returns the final partial batch, if any records are pending.
    pub fn finish(&mut self) -> Option<Batch> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(self.seal(rest))
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn seal(&mut self, records: Vec<Record>) -> Batch {
        let batch = Batch {
            sequence: self.next_sequence,
            first: self.next_first,
            records,
        };
        self.next_sequence += 1;
        self.next_first += batch.records.len() as u64;
        batch
    }
}
