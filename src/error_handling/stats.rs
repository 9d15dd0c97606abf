//! Load statistics tracking.
//!
//! This module provides thread-safe counters shared by the reader and the
//! writer tasks of a load run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::SkipReason;

/// Thread-safe load statistics tracker.
///
/// The coordinator updates the read-side counters, writer tasks update the
/// write-side counters. Shared across tasks using `Arc`.
pub struct LoadStats {
    rows_read: AtomicUsize,
    records_parsed: AtomicUsize,
    batches_written: AtomicUsize,
    records_written: AtomicUsize,
    skipped: HashMap<SkipReason, AtomicUsize>,
}

impl LoadStats {
    pub fn new() -> Self {
        let mut skipped = HashMap::new();
        for reason in SkipReason::iter() {
            skipped.insert(reason, AtomicUsize::new(0));
        }

        LoadStats {
            rows_read: AtomicUsize::new(0),
            records_parsed: AtomicUsize::new(0),
            batches_written: AtomicUsize::new(0),
            records_written: AtomicUsize::new(0),
            skipped,
        }
    }

    pub fn record_row_read(&self) {
        self.rows_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parsed(&self) {
        self.records_parsed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch_written(&self, records: usize) {
        self.batches_written.fetch_add(1, Ordering::Relaxed);
        self.records_written.fetch_add(records, Ordering::Relaxed);
    }

    /// Increment a skip counter.
    pub fn record_skip(&self, reason: SkipReason) {
        if let Some(counter) = self.skipped.get(&reason) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment skip counter for {:?} which is not in the map",
                reason
            );
        }
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read.load(Ordering::SeqCst)
    }

    pub fn records_parsed(&self) -> usize {
        self.records_parsed.load(Ordering::SeqCst)
    }

    pub fn batches_written(&self) -> usize {
        self.batches_written.load(Ordering::SeqCst)
    }

    pub fn records_written(&self) -> usize {
        self.records_written.load(Ordering::SeqCst)
    }

    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.skipped
            .get(&reason)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }
}

impl Default for LoadStats {
    fn default() -> Self {
        Self::new()
    }
}
