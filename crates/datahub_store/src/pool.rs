//! Size-keyed reusable buffer pools.
//!
//! A [`PoolManager`] maps a byte size to a [`BytePool`] handing out
//! zero-filled buffers of exactly that size. Buffers are zeroed when they
//! are returned, so no data leaks from one user to the next.
//!
//! The manager is an ordinary owned value: construct one at startup and
//! pass it to whoever needs it.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Default number of idle buffers a single pool retains.
pub const DEFAULT_MAX_RETAINED: usize = 64;

/// A free-list of fixed-size byte buffers.
#[derive(Debug)]
pub struct BytePool {
    size: usize,
    max_retained: usize,
    free: Mutex<Vec<Vec<u8>>>,
}

impl BytePool {
    /// Creates an empty pool for buffers of `size` bytes.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self::with_max_retained(size, DEFAULT_MAX_RETAINED)
    }

    /// Creates an empty pool that keeps at most `max_retained` idle buffers.
    #[must_use]
    pub fn with_max_retained(size: usize, max_retained: usize) -> Self {
        Self {
            size,
            max_retained,
            free: Mutex::new(Vec::new()),
        }
    }

    /// Buffer size served by this pool.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Takes a buffer of `size()` zero bytes, reusing an idle one if present.
    #[must_use]
    pub fn get(&self) -> Vec<u8> {
        self.free
            .lock()
            .pop()
            .unwrap_or_else(|| vec![0u8; self.size])
    }

    /// Returns a buffer to the pool.
    ///
    /// Buffers with less capacity than the pool size are discarded, as are
    /// buffers arriving while the pool already retains its maximum. Returns
    /// true if the buffer was kept.
    pub fn put(&self, mut buffer: Vec<u8>) -> bool {
        if buffer.capacity() < self.size {
            return false;
        }

        buffer.clear();
        buffer.resize(self.size, 0);

        let mut free = self.free.lock();
        if free.len() >= self.max_retained {
            return false;
        }
        free.push(buffer);
        true
    }

    /// Number of idle buffers ready for reuse.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }
}

/// Registry of [`BytePool`]s keyed by buffer size.
///
/// One lock guards the map, not the pools; each pool has its own free-list
/// lock.
#[derive(Debug, Default)]
pub struct PoolManager {
    pools: RwLock<HashMap<usize, Arc<BytePool>>>,
}

impl PoolManager {
    /// Creates a manager with no pools.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pool for `size`, creating it on first use.
    pub fn pool(&self, size: usize) -> Arc<BytePool> {
        if let Some(pool) = self.pools.read().get(&size) {
            return Arc::clone(pool);
        }

        // Another thread may have created it between the two locks.
        let mut pools = self.pools.write();
        let pool = pools.entry(size).or_insert_with(|| {
            debug!(size, "created buffer pool");
            Arc::new(BytePool::new(size))
        });
        Arc::clone(pool)
    }

    /// Takes a zero-filled buffer of exactly `size` bytes.
    #[must_use]
    pub fn get(&self, size: usize) -> Vec<u8> {
        self.pool(size).get()
    }

    /// Returns a buffer to the pool matching its capacity.
    ///
    /// Returns true if the buffer was retained for reuse.
    pub fn put(&self, buffer: Vec<u8>) -> bool {
        self.pool(buffer.capacity()).put(buffer)
    }

    /// Number of distinct buffer sizes currently pooled.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.read().len()
    }

    /// Drops every pool and the buffers they retain.
    ///
    /// Meant for process teardown. Pools handed out earlier stay usable but
    /// are no longer reachable through the manager.
    pub fn cleanup(&self) {
        let mut pools = self.pools.write();
        let dropped = pools.len();
        pools.clear();
        debug!(pools = dropped, "released buffer pools");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn fresh_buffer_is_zeroed() {
        let pool = BytePool::new(32);
        let buffer = pool.get();
        assert_eq!(buffer.len(), 32);
        assert!(buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn returned_buffer_is_zeroed_and_reused() {
        let pool = BytePool::new(8);
        let mut buffer = pool.get();
        buffer.copy_from_slice(b"secret!!");

        assert!(pool.put(buffer));
        assert_eq!(pool.available(), 1);

        let reused = pool.get();
        assert_eq!(reused, vec![0u8; 8]);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn truncated_buffer_is_restored_to_pool_size() {
        let pool = BytePool::new(16);
        let mut buffer = pool.get();
        buffer.truncate(3);

        assert!(pool.put(buffer));
        assert_eq!(pool.get().len(), 16);
    }

    #[test]
    fn undersized_buffer_is_discarded() {
        let pool = BytePool::new(64);
        assert!(!pool.put(Vec::with_capacity(8)));
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn retention_is_bounded() {
        let pool = BytePool::with_max_retained(4, 2);
        assert!(pool.put(vec![1; 4]));
        assert!(pool.put(vec![2; 4]));
        assert!(!pool.put(vec![3; 4]));
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn manager_creates_one_pool_per_size() {
        let manager = PoolManager::new();
        let a = manager.pool(128);
        let b = manager.pool(128);
        let c = manager.pool(256);

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(manager.pool_count(), 2);
    }

    #[test]
    fn manager_routes_by_capacity() {
        let manager = PoolManager::new();
        let buffer = manager.get(100);
        assert_eq!(buffer.len(), 100);

        assert!(manager.put(buffer));
        assert_eq!(manager.pool(100).available(), 1);
    }

    #[test]
    fn cleanup_drops_all_pools() {
        let manager = PoolManager::new();
        let buffer = manager.get(10);
        manager.put(buffer);
        let _ = manager.get(20);
        assert_eq!(manager.pool_count(), 2);

        manager.cleanup();
        assert_eq!(manager.pool_count(), 0);
        assert_eq!(manager.pool(10).available(), 0);
    }

    #[test]
    fn concurrent_pool_creation_yields_single_pool() {
        let manager = Arc::new(PoolManager::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || manager.pool(4096))
            })
            .collect();

        let pools: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("Thread panicked"))
            .collect();

        assert_eq!(manager.pool_count(), 1);
        assert!(pools.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
