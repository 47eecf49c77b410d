//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use datahub_server::UpdateRequest;
use datahub_store::{Entry, Measurements};
use proptest::prelude::*;
use uuid::Uuid;

/// Strategy for location ids of the form `LETTERS-alnum{1,6}`.
pub fn location_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z]{1,8}-[a-zA-Z0-9]{1,6}").expect("Invalid regex")
}

/// Strategy for arbitrary identifiers.
pub fn uuid_strategy() -> impl Strategy<Value = Uuid> {
    prop::array::uniform16(any::<u8>()).prop_map(Uuid::from_bytes)
}

/// Strategy for finite measurements.
pub fn measurements_strategy() -> impl Strategy<Value = Measurements> {
    (-1.0e6f32..1.0e6, -273.15f32..1.0e4, 0.0f32..1.0e6)
        .prop_map(|(s, t, r)| Measurements::new(s, t, r))
}

/// Strategy for fresh entries with their location id.
pub fn entry_strategy() -> impl Strategy<Value = Entry> {
    (uuid_strategy(), location_id_strategy(), measurements_strategy())
        .prop_map(|(id, location_id, measurements)| Entry::new(id, location_id, measurements))
}

/// Strategy for validated updates.
pub fn update_strategy() -> impl Strategy<Value = UpdateRequest> {
    (uuid_strategy(), measurements_strategy())
        .prop_map(|(id, measurements)| UpdateRequest { id, measurements })
}
