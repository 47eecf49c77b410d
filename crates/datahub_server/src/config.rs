//! Server configuration.

use datahub_store::StoreConfig;
use std::net::SocketAddr;
use std::time::Duration;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5555;

/// How the handler performs read-merge-write updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Read the entry, merge, then write it back as two store calls.
    ///
    /// Concurrent updates to one key can interleave between the read and
    /// the write and lose increments.
    #[default]
    ReadModifyWrite,
    /// Merge under the segment's exclusive lock in a single store call.
    Atomic,
}

/// Configuration for the DataHub server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Store construction parameters.
    pub store: StoreConfig,
    /// Per-request timeout enforced at the HTTP layer.
    pub request_timeout: Duration,
    /// Update strategy for `PUT`.
    pub update_mode: UpdateMode,
    /// Whether to reject location ids that are not `LETTERS-alnum{1,6}`.
    pub strict_location_ids: bool,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            store: StoreConfig::default(),
            request_timeout: Duration::from_secs(30),
            update_mode: UpdateMode::default(),
            strict_location_ids: false,
        }
    }

    /// Sets the store configuration.
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the update strategy.
    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    /// Enables or disables location id validation.
    pub fn with_strict_location_ids(mut self, strict: bool) -> Self {
        self.strict_location_ids = strict;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 5555);
        assert_eq!(config.store, StoreConfig::default());
        assert_eq!(config.update_mode, UpdateMode::ReadModifyWrite);
        assert!(!config.strict_location_ids);
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::new("127.0.0.1:9000".parse().unwrap())
            .with_store(StoreConfig::new().segments(4).max_bytes(512))
            .with_request_timeout(Duration::from_millis(250))
            .with_update_mode(UpdateMode::Atomic)
            .with_strict_location_ids(true);

        assert_eq!(config.store.segments, 4);
        assert_eq!(config.store.max_bytes, 512);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.update_mode, UpdateMode::Atomic);
        assert!(config.strict_location_ids);
    }
}
