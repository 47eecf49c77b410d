//! Sensor reading entries.

use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// The three sensor measurements carried by every entry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurements {
    /// Seismic activity reading.
    pub seismic_activity: f32,
    /// Temperature in degrees Celsius.
    pub temperature_c: f32,
    /// Radiation level reading.
    pub radiation_level: f32,
}

impl Measurements {
    /// Creates a new set of measurements.
    #[must_use]
    pub const fn new(seismic_activity: f32, temperature_c: f32, radiation_level: f32) -> Self {
        Self {
            seismic_activity,
            temperature_c,
            radiation_level,
        }
    }
}

/// One reading for a location.
///
/// The `last_updated` stamp is owned by the store: it is assigned on every
/// successful write and cannot be supplied by callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Identifier of the reading. Stable across updates to the same location.
    pub id: Uuid,
    /// The location this entry is stored under.
    pub location_id: String,
    /// Seismic activity reading.
    pub seismic_activity: f32,
    /// Temperature in degrees Celsius.
    pub temperature_c: f32,
    /// Radiation level reading.
    pub radiation_level: f32,
    /// Number of successful writes since the entry was created.
    pub modification_count: u64,
    last_updated: u64,
}

impl Entry {
    /// Creates a fresh entry with a modification count of 1.
    #[must_use]
    pub fn new(id: Uuid, location_id: impl Into<String>, measurements: Measurements) -> Self {
        let mut entry = Self {
            id,
            location_id: location_id.into(),
            seismic_activity: 0.0,
            temperature_c: 0.0,
            radiation_level: 0.0,
            modification_count: 1,
            last_updated: 0,
        };
        entry.apply(measurements);
        entry
    }

    /// Overwrites the measurement fields, leaving identity and counters alone.
    pub fn apply(&mut self, measurements: Measurements) {
        self.seismic_activity = measurements.seismic_activity;
        self.temperature_c = measurements.temperature_c;
        self.radiation_level = measurements.radiation_level;
    }

    /// Returns the measurement fields.
    #[must_use]
    pub fn measurements(&self) -> Measurements {
        Measurements::new(self.seismic_activity, self.temperature_c, self.radiation_level)
    }

    /// Nanoseconds since the Unix epoch of the last successful write.
    ///
    /// Zero for entries that have never been stored.
    #[must_use]
    pub fn last_updated(&self) -> u64 {
        self.last_updated
    }

    /// Byte length of the identifier as counted by capacity accounting.
    #[must_use]
    pub fn id_len(&self) -> u64 {
        self.id.as_bytes().len() as u64
    }

    /// Stamps the entry, never moving backwards past `previous`.
    pub(crate) fn stamp(&mut self, previous: Option<u64>) {
        let now = now_nanos();
        self.last_updated = previous.map_or(now, |prev| now.max(prev));
    }
}

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
