// trialflow-core/src/domain/model/mod.rs

pub mod cohort;
pub mod entity;
pub mod mapping;
pub mod schedule;
pub mod summary;

pub use cohort::{Cohort, DetailsShape, FieldState};
pub use entity::{Entity, RawRecord, SourceRef};
pub use mapping::FieldMapping;
pub use schedule::{InstantSpec, Phase, Schedule, parse_instant};
pub use summary::{CohortDigest, EntitySummary};
