//! Read and update flows over the store.
//!
//! An update merges the incoming measurements into the existing entry for
//! a location, or creates a new one. In [`UpdateMode::ReadModifyWrite`]
//! the read and the write are separate store calls: two concurrent updates
//! to the same location can both read the same entry and one increment of
//! `modification_count` is lost. [`UpdateMode::Atomic`] performs the merge
//! under the segment lock and cannot lose updates.

use crate::config::UpdateMode;
use crate::error::{ServerError, ServerResult};
use crate::protocol::UpdateRequest;
use datahub_store::{Entry, ShardedStore, StoreError};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Merges an update into the current entry for a location.
///
/// An existing entry keeps its identifier and gains one modification; a
/// missing one is created with the caller's identifier and a count of 1.
#[must_use]
pub fn merge(existing: Option<Entry>, location_id: &str, update: &UpdateRequest) -> Entry {
    match existing {
        Some(mut entry) => {
            entry.modification_count += 1;
            entry.apply(update.measurements);
            entry
        }
        None => Entry::new(update.id, location_id, update.measurements),
    }
}

/// Handler for location reads and updates.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    store: Arc<ShardedStore>,
    update_mode: UpdateMode,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(store: Arc<ShardedStore>, update_mode: UpdateMode) -> Self {
        Self { store, update_mode }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<ShardedStore> {
        &self.store
    }

    /// Returns the configured update strategy.
    pub fn update_mode(&self) -> UpdateMode {
        self.update_mode
    }

    /// Handles a read of one location.
    pub fn handle_get(&self, location_id: &str) -> ServerResult<Entry> {
        self.store.get(location_id).map_err(ServerError::from)
    }

    /// Handles an update of one location.
    ///
    /// Returns the modification count written.
    pub fn handle_put(&self, location_id: &str, update: UpdateRequest) -> ServerResult<u64> {
        let count = match self.update_mode {
            UpdateMode::ReadModifyWrite => {
                let entry = self.prepare_update(location_id, &update)?;
                let count = entry.modification_count;
                self.commit_update(location_id, entry)?;
                count
            }
            UpdateMode::Atomic => {
                self.store
                    .update(location_id, |current| {
                        merge(current.cloned(), location_id, &update)
                    })
                    .map_err(|e| write_error(location_id, e))?
                    .modification_count
            }
        };

        debug!(location_id, modification_count = count, "location updated");
        Ok(count)
    }

    /// First half of a read-modify-write update: read and merge.
    ///
    /// Any store failure other than a missing key aborts the update.
    pub fn prepare_update(&self, location_id: &str, update: &UpdateRequest) -> ServerResult<Entry> {
        match self.store.get(location_id) {
            Ok(existing) => Ok(merge(Some(existing), location_id, update)),
            Err(e) if e.is_not_found() => Ok(merge(None, location_id, update)),
            Err(e) => {
                error!(location_id, error = %e, "read before update failed");
                Err(ServerError::Internal(e.to_string()))
            }
        }
    }

    /// Second half of a read-modify-write update: write the merged entry.
    pub fn commit_update(&self, location_id: &str, entry: Entry) -> ServerResult<()> {
        self.store
            .put(location_id, entry)
            .map_err(|e| write_error(location_id, e))
    }
}

fn write_error(location_id: &str, err: StoreError) -> ServerError {
    match err {
        StoreError::InsufficientCapacity { .. } => {
            warn!(location_id, error = %err, "update rejected");
            ServerError::from(err)
        }
        other => {
            error!(location_id, error = %other, "write rejected");
            ServerError::Internal(format!("write rejected: {other}"))
        }
    }
}
