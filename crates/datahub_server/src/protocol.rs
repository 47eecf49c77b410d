//! Wire format for the HTTP boundary.
//!
//! Request and response bodies are JSON. The store's `last_updated` stamp
//! is never serialized.

use crate::error::{ServerError, ServerResult};
use datahub_store::{Entry, Measurements};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

/// Health check endpoint.
pub const ENDPOINT_HEALTH: &str = "/health";

/// Shape of a location id under strict validation.
pub const LOCATION_ID_PATTERN: &str = r"^[A-Z]+-[a-zA-Z0-9]{1,6}$";

static LOCATION_ID_REGEX: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// Body of `PUT /{location_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutRequest {
    /// Identifier of the reading, as a UUID string.
    pub id: String,
    /// Seismic activity reading.
    pub seismic_activity: f32,
    /// Temperature in degrees Celsius.
    pub temperature_c: f32,
    /// Radiation level reading.
    pub radiation_level: f32,
}

impl PutRequest {
    /// Validates the identifier and returns the decoded update.
    pub fn into_update(self) -> ServerResult<UpdateRequest> {
        let id = Uuid::parse_str(&self.id).map_err(|e| ServerError::InvalidId(e.to_string()))?;
        Ok(UpdateRequest {
            id,
            measurements: Measurements::new(
                self.seismic_activity,
                self.temperature_c,
                self.radiation_level,
            ),
        })
    }
}

/// A validated update for one location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateRequest {
    /// Identifier used when the location has no entry yet.
    pub id: Uuid,
    /// New measurement values.
    pub measurements: Measurements,
}

/// Body of a successful `GET /{location_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryResponse {
    /// Identifier of the reading.
    pub id: Uuid,
    /// Seismic activity reading.
    pub seismic_activity: f32,
    /// Temperature in degrees Celsius.
    pub temperature_c: f32,
    /// Radiation level reading.
    pub radiation_level: f32,
    /// The location the entry is stored under.
    pub location_id: String,
    /// Number of successful writes since creation.
    pub modification_count: u64,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            seismic_activity: entry.seismic_activity,
            temperature_c: entry.temperature_c,
            radiation_level: entry.radiation_level,
            location_id: entry.location_id,
            modification_count: entry.modification_count,
        }
    }
}

/// Compiled [`LOCATION_ID_PATTERN`], built on first use.
fn location_id_regex() -> ServerResult<&'static Regex> {
    LOCATION_ID_REGEX
        .get_or_init(|| Regex::new(LOCATION_ID_PATTERN))
        .as_ref()
        .map_err(|e| ServerError::Internal(format!("location id pattern: {e}")))
}

/// Checks a location id against [`LOCATION_ID_PATTERN`].
pub fn validate_location_id(location_id: &str) -> ServerResult<()> {
    if location_id_regex()?.is_match(location_id) {
        Ok(())
    } else {
        Err(ServerError::InvalidLocation(location_id.to_string()))
    }
}
