//! Serve command - runs the HTTP server until interrupted.

use clap::Args;
use datahub_server::{DataHubServer, ServerConfig, UpdateMode, DEFAULT_PORT};
use datahub_store::{StoreConfig, DEFAULT_MAX_BYTES, DEFAULT_SEGMENTS};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Arguments for `datahub serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port the server listens on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Number of store segments (rounded up to a power of two)
    #[arg(long, default_value_t = DEFAULT_SEGMENTS)]
    segments: usize,

    /// Store capacity in accounted bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BYTES)]
    capacity: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout: u64,

    /// Merge updates under the segment lock instead of read-then-write
    #[arg(long)]
    atomic_updates: bool,

    /// Reject location ids not shaped like `ZONE-a1b2`
    #[arg(long)]
    strict_location_ids: bool,
}

impl ServeArgs {
    pub(crate) fn config(&self) -> ServerConfig {
        let update_mode = if self.atomic_updates {
            UpdateMode::Atomic
        } else {
            UpdateMode::ReadModifyWrite
        };

        ServerConfig::new(SocketAddr::new(self.host, self.port))
            .with_store(
                StoreConfig::new()
                    .segments(self.segments)
                    .max_bytes(self.capacity),
            )
            .with_request_timeout(Duration::from_secs(self.request_timeout))
            .with_update_mode(update_mode)
            .with_strict_location_ids(self.strict_location_ids)
    }
}

/// Starts the server and blocks until Ctrl-C.
pub fn run(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.config();
    tracing::info!("Starting DataHub on {}", config.bind_addr);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let server = DataHubServer::new(config);
        let listener = server.bind().await?;
        server.serve(listener, shutdown_signal()).await
    })?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
