//! Benchmark utilities.

use datahub_server::UpdateRequest;
use datahub_store::{Entry, Measurements};
use rand::Rng;
use uuid::Uuid;

/// Generate random measurements.
pub fn random_measurements() -> Measurements {
    let mut rng = rand::thread_rng();
    Measurements::new(
        rng.gen_range(0.0..10.0),
        rng.gen_range(-40.0..60.0),
        rng.gen_range(0.0..1.0),
    )
}

/// Generate a batch of location ids.
pub fn generate_locations(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("ZONE-{i}")).collect()
}

/// Generate entries keyed by their location id.
pub fn generate_entries(count: usize) -> Vec<(String, Entry)> {
    generate_locations(count)
        .into_iter()
        .map(|location| {
            let entry = Entry::new(Uuid::new_v4(), location.clone(), random_measurements());
            (location, entry)
        })
        .collect()
}

/// Generate a random update.
pub fn random_update() -> UpdateRequest {
    UpdateRequest {
        id: Uuid::new_v4(),
        measurements: random_measurements(),
    }
}
