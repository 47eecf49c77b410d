//! # DataHub Testkit
//!
//! Test utilities for DataHub.
//!
//! This crate provides:
//! - Fixtures for stores, entries and handlers
//! - Property-based test generators using proptest
//! - Multi-threaded stress helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use datahub_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_store() {
//!     let store = roomy_store();
//!     store.put("ZONE-1", sample_entry("ZONE-1", 0)).unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
