//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
///
/// Both variants are expected, recoverable conditions. The store never
/// retries internally and remains usable after either of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No entry exists under the requested key.
    #[error("key not found: {key}")]
    KeyNotFound {
        /// The key that was looked up.
        key: String,
    },

    /// Admitting the write would push usage past the configured maximum.
    #[error("insufficient capacity: {used} of {max} bytes in use")]
    InsufficientCapacity {
        /// Accounted bytes in use when the write was rejected.
        used: u64,
        /// Configured capacity ceiling.
        max: u64,
    },
}

impl StoreError {
    /// Creates a not-found error for the given key.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Returns true if this error signals an absent key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }

    /// Returns true if this error signals capacity exhaustion.
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::InsufficientCapacity { .. })
    }
}
