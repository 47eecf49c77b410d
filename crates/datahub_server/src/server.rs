//! Main DataHub server.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::RequestHandler;
use crate::http;
use crate::protocol::validate_location_id;
use axum::Router;
use datahub_store::{PoolManager, ShardedStore};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

/// State shared by every request.
#[derive(Debug)]
pub struct ServerState {
    config: ServerConfig,
    handler: RequestHandler,
    pool: Arc<PoolManager>,
    ready: AtomicBool,
}

impl ServerState {
    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Request handler over the store.
    pub fn handler(&self) -> &RequestHandler {
        &self.handler
    }

    /// Buffer pool manager owned by the server.
    pub fn pool(&self) -> &Arc<PoolManager> {
        &self.pool
    }

    /// Whether the health endpoint reports ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Sets the readiness flag.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    /// Validates a location id when strict validation is enabled.
    pub fn check_location(&self, location_id: &str) -> ServerResult<()> {
        if self.config.strict_location_ids {
            validate_location_id(location_id)
        } else {
            Ok(())
        }
    }
}

/// The DataHub server.
///
/// Owns the store, the buffer pool manager and the readiness flag, and
/// serves them over HTTP.
///
/// # Example
///
/// ```rust,no_run
/// use datahub_server::{DataHubServer, ServerConfig};
///
/// # async fn run() -> datahub_server::ServerResult<()> {
/// let server = DataHubServer::new(ServerConfig::default());
/// let listener = server.bind().await?;
/// server.serve(listener, async { let _ = tokio::signal::ctrl_c().await; }).await
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DataHubServer {
    state: Arc<ServerState>,
}

impl DataHubServer {
    /// Creates a server with a fresh store and pool manager.
    ///
    /// The server starts not ready; [`serve`](Self::serve) flips the flag.
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(ShardedStore::new(config.store));
        Self::with_parts(config, store, Arc::new(PoolManager::new()))
    }

    /// Creates a server over an existing store and pool manager.
    pub fn with_parts(config: ServerConfig, store: Arc<ShardedStore>, pool: Arc<PoolManager>) -> Self {
        let handler = RequestHandler::new(store, config.update_mode);
        let state = Arc::new(ServerState {
            config,
            handler,
            pool,
            ready: AtomicBool::new(false),
        });
        Self { state }
    }

    /// Shared request state.
    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<ShardedStore> {
        self.state.handler.store()
    }

    /// Sets the readiness flag reported by `/health`.
    pub fn set_ready(&self, ready: bool) {
        self.state.set_ready(ready);
    }

    /// Whether the server reports ready.
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Builds the HTTP router.
    pub fn router(&self) -> Router {
        http::router(Arc::clone(&self.state))
    }

    /// Binds a listener on the configured address.
    pub async fn bind(&self) -> ServerResult<TcpListener> {
        Ok(TcpListener::bind(self.state.config.bind_addr).await?)
    }

    /// Serves requests until `shutdown` resolves.
    ///
    /// Readiness is set once serving starts and cleared as soon as shutdown
    /// begins. Buffer pools are released after the last connection closes.
    pub async fn serve<S>(&self, listener: TcpListener, shutdown: S) -> ServerResult<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        let store = self.store();
        tracing::info!(
            %addr,
            segments = store.segment_count(),
            max_bytes = store.max_size(),
            update_mode = ?self.state.config.update_mode,
            "DataHub listening"
        );

        self.set_ready(true);
        let state = Arc::clone(&self.state);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.await;
                state.set_ready(false);
                tracing::info!("shutdown requested, draining connections");
            })
            .await?;

        self.state.pool.cleanup();
        tracing::info!(entries = self.store().count(), "DataHub stopped");
        Ok(())
    }
}
