//! Store configuration.

/// Default number of segments.
pub const DEFAULT_SEGMENTS: usize = 16;

/// Default capacity ceiling (3 GiB of accounted bytes).
pub const DEFAULT_MAX_BYTES: u64 = 3 * 1024 * 1024 * 1024;

/// Fixed per-entry cost added to key and identifier lengths.
pub const DEFAULT_ENTRY_OVERHEAD: u64 = 100;

/// Upper bound on the segment count after normalization.
pub const MAX_SEGMENTS: usize = 1 << 16;

/// Configuration for constructing a [`ShardedStore`](crate::ShardedStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Requested segment count. Rounded up to a power of two at construction.
    pub segments: usize,

    /// Maximum total accounted bytes.
    pub max_bytes: u64,

    /// Fixed per-entry overhead used by capacity accounting.
    pub entry_overhead: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            segments: DEFAULT_SEGMENTS,
            max_bytes: DEFAULT_MAX_BYTES,
            entry_overhead: DEFAULT_ENTRY_OVERHEAD,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the requested segment count.
    #[must_use]
    pub const fn segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    /// Sets the capacity ceiling in bytes.
    #[must_use]
    pub const fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Sets the per-entry accounting overhead.
    #[must_use]
    pub const fn entry_overhead(mut self, overhead: u64) -> Self {
        self.entry_overhead = overhead;
        self
    }

    /// Segment count after rounding up to the next power of two.
    ///
    /// Zero is treated as one; requests above [`MAX_SEGMENTS`] are clamped.
    #[must_use]
    pub fn normalized_segments(&self) -> usize {
        self.segments.clamp(1, MAX_SEGMENTS).next_power_of_two()
    }
}
