// trialflow-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod data;
pub mod error;
pub mod fs;
