//! Stress tests for DataHub.
//!
//! These helpers drive the store and handler from many threads at once.

use crate::fixtures::{location, sample_entry, sample_update};
use datahub_server::RequestHandler;
use datahub_store::ShardedStore;
use rand::Rng;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }
}

impl fmt::Display for StressTestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ops ({} ok, {} failed) in {:?}, {:.0} ops/sec",
            self.total_ops,
            self.successful_ops,
            self.failed_ops,
            self.duration,
            self.ops_per_second
        )
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform across all threads.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Number of distinct locations touched.
    pub location_count: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            location_count: 1_000,
        }
    }
}

/// Outcome of concurrent updates against a single location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LostUpdateReport {
    /// Modification count expected if no update were lost.
    pub expected: u64,
    /// Modification count actually stored.
    pub observed: u64,
}

impl LostUpdateReport {
    /// Number of increments that were overwritten.
    pub fn lost(&self) -> u64 {
        self.expected.saturating_sub(self.observed)
    }
}

/// Runs `work(thread_index, op_index)` on every thread, counting outcomes.
fn run_threads<F>(config: &StressConfig, work: F) -> StressTestResult
where
    F: Fn(usize, usize) -> bool + Send + Sync + 'static,
{
    let work = Arc::new(work);
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let ops_per_thread = config.operations / config.threads.max(1);

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let work = Arc::clone(&work);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    if work(t, i) {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Concurrent puts, each thread writing its own locations.
pub fn stress_concurrent_puts(store: Arc<ShardedStore>, config: &StressConfig) -> StressTestResult {
    let ops_per_thread = config.operations / config.threads.max(1);
    run_threads(config, move |t, i| {
        let key = location(t * ops_per_thread + i);
        store.put(&key, sample_entry(&key, i as u32)).is_ok()
    })
}

/// Random mix of reads (50%), writes (35%) and deletes (15%).
///
/// Not-found results count as successful operations.
pub fn stress_mixed_operations(
    store: Arc<ShardedStore>,
    config: &StressConfig,
) -> StressTestResult {
    let location_count = config.location_count.max(1);
    run_threads(config, move |_, i| {
        let mut rng = rand::thread_rng();
        let key = location(rng.gen_range(0..location_count));
        match rng.gen_range(0..100) {
            0..=49 => match store.get(&key) {
                Ok(_) => true,
                Err(e) => e.is_not_found(),
            },
            50..=84 => store.put(&key, sample_entry(&key, i as u32)).is_ok(),
            _ => match store.delete(&key) {
                Ok(_) => true,
                Err(e) => e.is_not_found(),
            },
        }
    })
}

/// Hammers one location with concurrent updates through the handler.
pub fn stress_same_key_updates(
    handler: RequestHandler,
    location_id: &str,
    config: &StressConfig,
) -> LostUpdateReport {
    let key = location_id.to_string();
    let updates_handler = handler.clone();
    let result = run_threads(config, move |_, i| {
        updates_handler
            .handle_put(&key, sample_update(i as u32))
            .is_ok()
    });

    let observed = handler
        .handle_get(location_id)
        .map(|entry| entry.modification_count)
        .unwrap_or(0);

    LostUpdateReport {
        expected: result.successful_ops as u64,
        observed,
    }
}
