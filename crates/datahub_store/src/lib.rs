//! # DataHub Store
//!
//! Bounded, in-memory storage engine for per-location sensor readings.
//!
//! This crate provides:
//! - [`ShardedStore`] - a hash table split into independently locked
//!   segments, with a global byte-capacity ceiling
//! - [`Entry`] - one reading for a location
//! - [`PoolManager`] - size-keyed pools of reusable byte buffers
//!
//! ## Capacity accounting
//!
//! Every entry costs a fixed overhead (100 bytes by default) plus the byte
//! length of its key plus the byte length of its 16-byte identifier.
//! Measurement fields are not counted. Writes that would push total usage
//! past the ceiling fail with [`StoreError::InsufficientCapacity`]; nothing
//! is ever evicted.
//!
//! ## Consistency
//!
//! Operations on one key are serialized by that key's segment lock.
//! [`ShardedStore::count`] and [`ShardedStore::keys`] visit segments one at
//! a time and are only weakly consistent under concurrent mutation.
//!
//! ## Example
//!
//! ```rust
//! use datahub_store::{Entry, Measurements, ShardedStore, StoreError};
//! use uuid::Uuid;
//!
//! let store = ShardedStore::with_capacity(16, 256);
//! store.put("A-1", Entry::new(Uuid::new_v4(), "A-1", Measurements::default())).unwrap();
//! store.put("B-2", Entry::new(Uuid::new_v4(), "B-2", Measurements::default())).unwrap();
//! assert_eq!(store.size(), 238);
//!
//! let full = store.put("C-3", Entry::new(Uuid::new_v4(), "C-3", Measurements::default()));
//! assert!(matches!(full, Err(StoreError::InsufficientCapacity { .. })));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod entry;
mod error;
mod pool;
mod stats;
mod store;

pub use config::{
    StoreConfig, DEFAULT_ENTRY_OVERHEAD, DEFAULT_MAX_BYTES, DEFAULT_SEGMENTS, MAX_SEGMENTS,
};
pub use entry::{Entry, Measurements};
pub use error::{StoreError, StoreResult};
pub use pool::{BytePool, PoolManager, DEFAULT_MAX_RETAINED};
pub use stats::{StoreStats, StoreStatsSnapshot};
pub use store::{fnv1a, ShardedStore};
