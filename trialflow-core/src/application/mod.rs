// trialflow-core/src/application/mod.rs

pub mod clean;
pub mod import;
pub mod inspection;
pub mod pipeline;

// --- RE-EXPORTS (FACADE) ---
// The CLI imports use cases from here without knowing the file layout.

pub use clean::clean_project;
pub use import::{GatePolicy, ImportJob, JobStatus, create_import, create_import_with_policy};
pub use inspection::{EntityReport, inspect_entities};
pub use pipeline::{EntityOutcome, JobOutcome, RunOptions, RunResult, run_import};
