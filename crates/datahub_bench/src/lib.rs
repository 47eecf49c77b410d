//! Benchmark utilities for DataHub.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
