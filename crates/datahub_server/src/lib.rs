//! # DataHub Server
//!
//! HTTP boundary for the DataHub sensor store.
//!
//! This crate provides:
//! - Read and update flows over [`datahub_store::ShardedStore`]
//! - HTTP routes (`/health`, `GET` and `PUT /{location_id}`)
//! - Mapping of store errors to HTTP outcomes
//! - Readiness reporting and graceful shutdown
//!
//! # Update semantics
//!
//! `PUT /{location_id}` merges into the existing entry: the identifier is
//! kept, the three measurements are overwritten and `modification_count`
//! goes up by one. A location without an entry gets a new one with the
//! caller's identifier and a count of 1.
//!
//! By default the merge is a read followed by a separate write, so
//! concurrent updates to one location can lose increments. Configure
//! [`UpdateMode::Atomic`] to merge under the store's segment lock instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use datahub_server::{DataHubServer, ServerConfig, UpdateMode};
//!
//! let config = ServerConfig::default().with_update_mode(UpdateMode::Atomic);
//! let server = DataHubServer::new(config);
//! let listener = server.bind().await?;
//! server.serve(listener, shutdown_signal()).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod http;
mod protocol;
mod server;

pub use config::{ServerConfig, UpdateMode, DEFAULT_PORT};
pub use error::{ServerError, ServerResult};
pub use handler::{merge, RequestHandler};
pub use http::router;
pub use protocol::{
    validate_location_id, EntryResponse, PutRequest, UpdateRequest, ENDPOINT_HEALTH,
    LOCATION_ID_PATTERN,
};
pub use server::{DataHubServer, ServerState};
