//! Sharded, capacity-bounded entry store.
//!
//! Keys are routed to one of a fixed, power-of-two number of segments by
//! FNV-1a hash and bitmask. Each segment has its own read/write lock. A
//! single usage counter, guarded by its own lock, tracks accounted bytes
//! across all segments and is the sole authority for admitting writes.
//!
//! # Lock order
//!
//! Segment lock first, then the usage lock. The usage lock is only held
//! for the delta computation, never across a whole write.

use crate::config::StoreConfig;
use crate::entry::Entry;
use crate::error::{StoreError, StoreResult};
use crate::stats::{StoreStats, StoreStatsSnapshot};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, warn};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a hash of a key.
#[must_use]
pub fn fnv1a(key: &str) -> u64 {
    key.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// An independently locked partition of the keyspace.
#[derive(Debug, Default)]
struct Segment {
    entries: RwLock<HashMap<String, Entry>>,
}

/// A capacity-bounded, segment-partitioned hash table of entries.
///
/// # Thread Safety
///
/// All operations take `&self`; share the store behind an `Arc`. Readers of
/// one segment proceed in parallel and never block writers to other
/// segments.
///
/// # Example
///
/// ```rust
/// use datahub_store::{Entry, Measurements, ShardedStore, StoreConfig};
/// use uuid::Uuid;
///
/// let store = ShardedStore::new(StoreConfig::new().segments(16).max_bytes(256));
/// let entry = Entry::new(Uuid::new_v4(), "A-1", Measurements::new(0.1, 20.0, 0.0));
/// store.put("A-1", entry).unwrap();
///
/// assert_eq!(store.size(), 119);
/// assert_eq!(store.get("A-1").unwrap().modification_count, 1);
/// ```
#[derive(Debug)]
pub struct ShardedStore {
    segments: Box<[Segment]>,
    segment_mask: u64,
    max_bytes: u64,
    entry_overhead: u64,
    used: RwLock<u64>,
    stats: StoreStats,
}

impl ShardedStore {
    /// Creates an empty store.
    ///
    /// The segment count is rounded up to the next power of two.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let count = config.normalized_segments();
        let segments = (0..count).map(|_| Segment::default()).collect();

        debug!(
            segments = count,
            max_bytes = config.max_bytes,
            "created sharded store"
        );

        Self {
            segments,
            segment_mask: (count - 1) as u64,
            max_bytes: config.max_bytes,
            entry_overhead: config.entry_overhead,
            used: RwLock::new(0),
            stats: StoreStats::new(),
        }
    }

    /// Creates a store with the default entry overhead.
    #[must_use]
    pub fn with_capacity(segments: usize, max_bytes: u64) -> Self {
        Self::new(StoreConfig::new().segments(segments).max_bytes(max_bytes))
    }

    /// Index of the segment owning `key`.
    #[must_use]
    pub fn segment_for(&self, key: &str) -> usize {
        (fnv1a(key) & self.segment_mask) as usize
    }

    fn segment(&self, key: &str) -> &Segment {
        &self.segments[self.segment_for(key)]
    }

    /// Accounted size of `entry` stored under `key`.
    ///
    /// Fixed overhead plus key length plus identifier length. Measurement
    /// fields are not counted.
    #[must_use]
    pub fn accounted_size(&self, key: &str, entry: &Entry) -> u64 {
        self.entry_overhead + key.len() as u64 + entry.id_len()
    }

    /// Returns a copy of the entry stored under `key`.
    pub fn get(&self, key: &str) -> StoreResult<Entry> {
        let entries = self.segment(key).entries.read();
        match entries.get(key) {
            Some(entry) => {
                self.stats.record_read();
                Ok(entry.clone())
            }
            None => {
                self.stats.record_miss();
                Err(StoreError::key_not_found(key))
            }
        }
    }

    /// Returns true if an entry exists under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.segment(key).entries.read().contains_key(key)
    }

    /// Stores `entry` under `key`, replacing any previous entry.
    ///
    /// The store stamps `last_updated`. On
    /// [`StoreError::InsufficientCapacity`] nothing is modified.
    pub fn put(&self, key: &str, entry: Entry) -> StoreResult<()> {
        self.update(key, move |_| entry).map(|_| ())
    }

    /// Computes and stores a new entry under the segment's exclusive lock.
    ///
    /// `merge` receives the current entry, if any, and returns the entry to
    /// store. No other writer can touch `key` between the read and the
    /// write, so read-modify-write sequences built on this method cannot
    /// lose updates. Admission follows the same rules as [`put`](Self::put).
    ///
    /// # Deadlocks
    ///
    /// `merge` runs while the segment's write lock is held. It must not call
    /// back into this store: any access to a key in the same segment blocks
    /// forever.
    pub fn update<F>(&self, key: &str, merge: F) -> StoreResult<Entry>
    where
        F: FnOnce(Option<&Entry>) -> Entry,
    {
        // Advisory: may be stale by the time the segment lock is held.
        let used = *self.used.read();
        if used >= self.max_bytes {
            return Err(self.reject(key, used));
        }

        let mut entries = self.segment(key).entries.write();
        let current = entries.get(key);
        let previous = current.map(|old| (self.accounted_size(key, old), old.last_updated()));

        let mut entry = merge(current);
        let new_size = self.accounted_size(key, &entry);
        let old_size = previous.map_or(0, |(size, _)| size);
        self.admit(key, new_size, old_size)?;

        entry.stamp(previous.map(|(_, stamp)| stamp));
        entries.insert(key.to_owned(), entry.clone());
        drop(entries);

        self.stats.record_write();
        debug!(
            key,
            size = new_size,
            modification_count = entry.modification_count,
            "stored entry"
        );
        Ok(entry)
    }

    /// Removes the entry stored under `key` and returns it.
    pub fn delete(&self, key: &str) -> StoreResult<Entry> {
        let mut entries = self.segment(key).entries.write();
        let Some(entry) = entries.remove(key) else {
            self.stats.record_miss();
            return Err(StoreError::key_not_found(key));
        };

        let size = self.accounted_size(key, &entry);
        {
            let mut used = self.used.write();
            *used = used.saturating_sub(size);
        }
        drop(entries);

        self.stats.record_delete();
        debug!(key, size, "deleted entry");
        Ok(entry)
    }

    /// Applies a signed usage delta under the usage lock.
    fn admit(&self, key: &str, new_size: u64, old_size: u64) -> StoreResult<()> {
        let mut used = self.used.write();
        if new_size > old_size {
            let growth = new_size - old_size;
            if used.saturating_add(growth) > self.max_bytes {
                let current = *used;
                drop(used);
                return Err(self.reject(key, current));
            }
            *used += growth;
        } else {
            *used = used.saturating_sub(old_size - new_size);
        }
        Ok(())
    }

    fn reject(&self, key: &str, used: u64) -> StoreError {
        self.stats.record_rejection();
        warn!(key, used, max = self.max_bytes, "write rejected: capacity exhausted");
        StoreError::InsufficientCapacity {
            used,
            max: self.max_bytes,
        }
    }

    /// Accounted bytes currently in use.
    #[must_use]
    pub fn size(&self) -> u64 {
        *self.used.read()
    }

    /// Configured capacity ceiling in bytes.
    #[must_use]
    pub fn max_size(&self) -> u64 {
        self.max_bytes
    }

    /// Number of segments after power-of-two normalization.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of stored entries.
    ///
    /// Segments are visited one at a time, so under concurrent mutation the
    /// total can mix states from different instants.
    #[must_use]
    pub fn count(&self) -> usize {
        self.segments
            .iter()
            .map(|segment| segment.entries.read().len())
            .sum()
    }

    /// Returns true if no segment holds an entry.
    ///
    /// Weakly consistent, like [`count`](Self::count).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| segment.entries.read().is_empty())
    }

    /// All stored keys, in no particular order.
    ///
    /// Weakly consistent, like [`count`](Self::count).
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for segment in self.segments.iter() {
            keys.extend(segment.entries.read().keys().cloned());
        }
        keys
    }

    /// Returns a copy of the operation counters.
    #[must_use]
    pub fn stats(&self) -> StoreStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Measurements;
    use std::sync::Arc;
    use std::thread;
    use uuid::Uuid;

    fn reading(key: &str, temperature_c: f32) -> Entry {
        Entry::new(Uuid::new_v4(), key, Measurements::new(0.5, temperature_c, 0.01))
    }

    #[test]
    fn fnv1a_matches_reference_vectors() {
        assert_eq!(fnv1a(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a("a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a("foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn segment_count_is_power_of_two() {
        assert_eq!(ShardedStore::with_capacity(10, 1024).segment_count(), 16);
        assert_eq!(ShardedStore::with_capacity(16, 1024).segment_count(), 16);
        assert_eq!(ShardedStore::with_capacity(0, 1024).segment_count(), 1);
    }

    #[test]
    fn routing_is_deterministic_and_in_range() {
        let store = ShardedStore::with_capacity(16, 1024);
        for i in 0..500 {
            let key = format!("ZONE-{i}");
            let segment = store.segment_for(&key);
            assert_eq!(segment, store.segment_for(&key));
            assert!(segment < 16);
        }
    }

    #[test]
    fn get_missing_key_is_not_found() {
        let store = ShardedStore::with_capacity(16, 1024);
        let err = store.get("NOPE-1").unwrap_err();
        assert_eq!(err, StoreError::key_not_found("NOPE-1"));
        assert!(!store.contains("NOPE-1"));
    }

    #[test]
    fn put_then_get_returns_measurements() {
        let store = ShardedStore::with_capacity(16, 1024);
        let entry = reading("A-1", 21.5);
        store.put("A-1", entry.clone()).unwrap();

        let stored = store.get("A-1").unwrap();
        assert_eq!(stored.id, entry.id);
        assert_eq!(stored.measurements(), entry.measurements());
        assert!(stored.last_updated() > 0);
        assert!(store.contains("A-1"));
    }

    #[test]
    fn last_updated_is_non_decreasing() {
        let store = ShardedStore::with_capacity(16, 4096);
        let mut last = 0;
        for i in 0..50 {
            store.put("A-1", reading("A-1", i as f32)).unwrap();
            let stamp = store.get("A-1").unwrap().last_updated();
            assert!(stamp >= last);
            last = stamp;
        }
    }

    #[test]
    fn capacity_scenario() {
        let store = ShardedStore::with_capacity(16, 256);

        store.put("A-1", reading("A-1", 1.0)).unwrap();
        assert_eq!(store.size(), 119);

        store.put("B-2", reading("B-2", 2.0)).unwrap();
        assert_eq!(store.size(), 238);

        let err = store.put("C-3", reading("C-3", 3.0)).unwrap_err();
        assert!(err.is_capacity());
        assert_eq!(store.size(), 238);
        assert!(!store.contains("C-3"));
        assert_eq!(store.count(), 2);
        assert_eq!(store.stats().rejections, 1);
    }

    #[test]
    fn rejected_write_leaves_existing_entry_untouched() {
        // Room for exactly one entry: the store is full after the first put,
        // so even an overwrite is refused by the advisory check.
        let store = ShardedStore::with_capacity(4, 119);
        store.put("A-1", reading("A-1", 1.0)).unwrap();
        let before = store.get("A-1").unwrap();

        let err = store
            .update("A-1", |current| {
                let mut next = current.cloned().unwrap_or_else(|| reading("A-1", 0.0));
                next.modification_count += 1;
                next
            })
            .unwrap_err();

        assert!(err.is_capacity());
        assert_eq!(store.get("A-1").unwrap(), before);
        assert_eq!(store.size(), 119);
    }

    #[test]
    fn overwrite_with_same_size_keeps_usage() {
        let store = ShardedStore::with_capacity(16, 1024);
        store.put("A-1", reading("A-1", 1.0)).unwrap();
        let size = store.size();

        store.put("A-1", reading("A-1", 2.0)).unwrap();
        assert_eq!(store.size(), size);
        assert_eq!(store.count(), 1);
        assert_eq!(store.get("A-1").unwrap().temperature_c, 2.0);
    }

    #[test]
    fn usage_sums_entries_of_different_sizes() {
        let store = ShardedStore::with_capacity(16, 1024);
        let key = "LONGKEY-abcdef";
        store.put("A-1", reading("A-1", 1.0)).unwrap();
        store.put(key, reading(key, 1.0)).unwrap();

        let expected = 100 + 3 + 16 + 100 + key.len() as u64 + 16;
        assert_eq!(store.size(), expected);
    }

    #[test]
    fn admit_applies_signed_delta() {
        // Within one store an overwrite keeps the key and the 16-byte id, so
        // its delta is always zero. Exercise growth and shrink directly.
        let store = ShardedStore::with_capacity(16, 1000);

        store.admit("A-1", 300, 0).unwrap();
        assert_eq!(store.size(), 300);

        store.admit("A-1", 450, 300).unwrap();
        assert_eq!(store.size(), 450);

        store.admit("A-1", 200, 450).unwrap();
        assert_eq!(store.size(), 200);

        store.admit("A-1", 200, 200).unwrap();
        assert_eq!(store.size(), 200);

        let err = store.admit("A-1", 1001, 200).unwrap_err();
        assert!(err.is_capacity());
        assert_eq!(store.size(), 200);
        assert_eq!(store.stats().rejections, 1);
    }

    #[test]
    fn update_increments_sequentially() {
        let store = ShardedStore::with_capacity(16, 1024);
        for _ in 0..10 {
            store
                .update("A-1", |current| match current {
                    Some(existing) => {
                        let mut next = existing.clone();
                        next.modification_count += 1;
                        next
                    }
                    None => reading("A-1", 0.0),
                })
                .unwrap();
        }
        assert_eq!(store.get("A-1").unwrap().modification_count, 10);
    }

    #[test]
    fn delete_releases_accounted_size() {
        let store = ShardedStore::with_capacity(16, 1024);
        store.put("A-1", reading("A-1", 1.0)).unwrap();
        store.put("B-22", reading("B-22", 1.0)).unwrap();
        assert_eq!(store.size(), 119 + 120);

        let removed = store.delete("A-1").unwrap();
        assert_eq!(removed.location_id, "A-1");
        assert_eq!(store.size(), 120);
        assert!(store.get("A-1").unwrap_err().is_not_found());
    }

    #[test]
    fn delete_missing_key_keeps_usage() {
        let store = ShardedStore::with_capacity(16, 1024);
        store.put("A-1", reading("A-1", 1.0)).unwrap();

        assert!(store.delete("Z-9").unwrap_err().is_not_found());
        assert_eq!(store.size(), 119);
    }

    #[test]
    fn delete_then_recreate_resets_count() {
        let store = ShardedStore::with_capacity(16, 1024);
        let mut entry = reading("A-1", 1.0);
        entry.modification_count = 7;
        store.put("A-1", entry).unwrap();
        store.delete("A-1").unwrap();

        store.put("A-1", reading("A-1", 1.0)).unwrap();
        assert_eq!(store.get("A-1").unwrap().modification_count, 1);
    }

    #[test]
    fn keys_and_count_cover_all_segments() {
        let store = ShardedStore::with_capacity(8, 1 << 20);
        assert!(store.is_empty());

        for i in 0..100 {
            let key = format!("K-{i}");
            store.put(&key, reading(&key, i as f32)).unwrap();
        }

        assert_eq!(store.count(), 100);
        assert!(!store.is_empty());
        let mut keys = store.keys();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 100);
        assert!(keys.contains(&"K-42".to_string()));
    }

    #[test]
    fn stats_track_operations() {
        let store = ShardedStore::with_capacity(16, 1024);
        store.put("A-1", reading("A-1", 1.0)).unwrap();
        store.get("A-1").unwrap();
        let _ = store.get("B-1");
        store.delete("A-1").unwrap();

        let stats = store.stats();
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.reads, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.deletes, 1);
    }

    #[test]
    fn concurrent_writers_to_distinct_keys() {
        let store = Arc::new(ShardedStore::with_capacity(16, 1 << 20));
        let threads = 8;
        let per_thread = 200;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..per_thread {
                        let key = format!("T{t}-{i}");
                        store.put(&key, reading(&key, i as f32)).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert_eq!(store.count(), threads * per_thread);
        let expected: u64 = store
            .keys()
            .iter()
            .map(|key| 100 + key.len() as u64 + 16)
            .sum();
        assert_eq!(store.size(), expected);
    }

    #[test]
    fn concurrent_writers_never_exceed_capacity() {
        // Room for 10 entries of 119 bytes.
        let store = Arc::new(ShardedStore::with_capacity(4, 1190));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..10 {
                        let key = format!("{t}-{i}");
                        let _ = store.put(&key, reading(&key, 0.0));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert_eq!(store.count(), 10);
        assert_eq!(store.size(), 1190);
        assert!(store.size() <= store.max_size());
    }
}
