//! Test fixtures.
//!
//! Convenience constructors for stores, entries, handlers and a
//! loopback server.

use datahub_server::{
    DataHubServer, RequestHandler, ServerConfig, ServerResult, UpdateMode, UpdateRequest,
};
use datahub_store::{Entry, Measurements, ShardedStore, StoreConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Capacity large enough that tests never hit the ceiling by accident.
pub const ROOMY_CAPACITY: u64 = 1 << 30;

/// Creates a store with 16 segments and the given capacity.
pub fn store_with_capacity(max_bytes: u64) -> ShardedStore {
    ShardedStore::new(StoreConfig::new().segments(16).max_bytes(max_bytes))
}

/// Creates a shared store that will not fill up during a test.
pub fn roomy_store() -> Arc<ShardedStore> {
    Arc::new(store_with_capacity(ROOMY_CAPACITY))
}

/// Creates a handler over a fresh, roomy store.
pub fn test_handler(mode: UpdateMode) -> RequestHandler {
    RequestHandler::new(roomy_store(), mode)
}

/// Deterministic measurements derived from a seed.
pub fn sample_measurements(seed: u32) -> Measurements {
    let s = seed as f32;
    Measurements::new(s * 0.1, 15.0 + s, s * 0.001)
}

/// A fresh entry for `location_id` with a random identifier.
pub fn sample_entry(location_id: &str, seed: u32) -> Entry {
    Entry::new(Uuid::new_v4(), location_id, sample_measurements(seed))
}

/// A validated update with a random identifier.
pub fn sample_update(seed: u32) -> UpdateRequest {
    UpdateRequest {
        id: Uuid::new_v4(),
        measurements: sample_measurements(seed),
    }
}

/// Location id number `n` in the `ZONE-<n>` family.
pub fn location(n: usize) -> String {
    format!("ZONE-{n}")
}

/// Accounted size of an entry under `key` with the default overhead.
pub fn expected_size(key: &str) -> u64 {
    datahub_store::DEFAULT_ENTRY_OVERHEAD + key.len() as u64 + 16
}

/// A server running on an ephemeral loopback port.
///
/// The configured bind address is ignored.
pub struct TestServer {
    base_url: String,
    server: DataHubServer,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<ServerResult<()>>,
}

impl TestServer {
    /// Binds `127.0.0.1:0` and starts serving in a background task.
    pub async fn start(config: ServerConfig) -> ServerResult<Self> {
        let config = ServerConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            ..config
        };
        let server = DataHubServer::new(config);
        let listener = server.bind().await?;
        let addr = listener.local_addr()?;

        let (stop, stopped) = oneshot::channel::<()>();
        let serving = server.clone();
        let task = tokio::spawn(async move {
            serving
                .serve(listener, async {
                    let _ = stopped.await;
                })
                .await
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            server,
            stop: Some(stop),
            task,
        })
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The running server.
    pub fn server(&self) -> &DataHubServer {
        &self.server
    }

    /// Triggers graceful shutdown and waits for the serve task to finish.
    pub async fn shutdown(mut self) -> ServerResult<DataHubServer> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.task.await.expect("Server task panicked")?;
        Ok(self.server)
    }
}
