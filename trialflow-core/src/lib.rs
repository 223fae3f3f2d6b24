// trialflow-core/src/lib.rs

#![allow(missing_docs)]
// Memory safety
#![deny(unsafe_code)]
// Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (async boundaries: Transmitter)
pub mod ports;

// 2. Domain (entities, cohorts, schedules, registry, validation).
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure (config files, YAML data store, endpoint adapters)
pub mod infrastructure;

// 4. Application (use cases: import, inspect, run, clean)
pub mod application;

pub mod error;

pub use error::TrialflowError;
