//! Store statistics.
//!
//! All counters are atomic and can be read while operations are in
//! progress. A snapshot is not a consistent cut across counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Operation counters for a [`ShardedStore`](crate::ShardedStore).
#[derive(Debug, Default)]
pub struct StoreStats {
    /// Lookups that found an entry.
    reads: AtomicU64,
    /// Lookups that found nothing.
    misses: AtomicU64,
    /// Successful writes (inserts and overwrites).
    writes: AtomicU64,
    /// Successful deletions.
    deletes: AtomicU64,
    /// Writes refused by admission control.
    rejections: AtomicU64,
}

impl StoreStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejection(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time copy of all counters.
    pub fn snapshot(&self) -> StoreStatsSnapshot {
        StoreStatsSnapshot {
            reads: self.reads.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`StoreStats`] counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStatsSnapshot {
    /// Lookups that found an entry.
    pub reads: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Successful writes.
    pub writes: u64,
    /// Successful deletions.
    pub deletes: u64,
    /// Writes refused by admission control.
    pub rejections: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        assert_eq!(StoreStats::new().snapshot(), StoreStatsSnapshot::default());
    }

    #[test]
    fn record_methods_increment() {
        let stats = StoreStats::new();
        stats.record_read();
        stats.record_read();
        stats.record_miss();
        stats.record_write();
        stats.record_delete();
        stats.record_rejection();

        let snap = stats.snapshot();
        assert_eq!(snap.reads, 2);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.writes, 1);
        assert_eq!(snap.deletes, 1);
        assert_eq!(snap.rejections, 1);
    }
}
