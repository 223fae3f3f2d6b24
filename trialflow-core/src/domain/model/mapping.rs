// trialflow-core/src/domain/model/mapping.rs

use serde::{Deserialize, Serialize};

/// Names of the raw-record fields a kind reads its data from.
///
/// Domains name their grouping fields differently (a trial has `cohorts`
/// with a `dose`, a league has `squads` with a `division`). The loader is
/// written once against this table, so a new domain only supplies a new
/// mapping instead of a new loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Display name of the entity.
    pub name: String,
    /// Container of the subset entries (sequence or label-keyed mapping).
    pub subsets: String,
    /// Label of a subset entry when subsets are given as a sequence.
    pub label: String,
    /// Classificatory attribute of a subset.
    pub category: String,
    /// Population size of a subset.
    pub population: String,
    /// Detail records of a subset.
    pub details: String,
    /// Container of the schedule phases.
    pub schedule: String,
}

impl FieldMapping {
    pub fn clinical() -> Self {
        Self {
            name: "name".into(),
            subsets: "cohorts".into(),
            label: "label".into(),
            category: "dose".into(),
            population: "patient_count".into(),
            details: "d".into(),
            schedule: "schedule".into(),
        }
    }

    pub fn sports() -> Self {
        Self {
            name: "name".into(),
            subsets: "squads".into(),
            label: "label".into(),
            category: "division".into(),
            population: "roster_size".into(),
            details: "players".into(),
            schedule: "season".into(),
        }
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::clinical()
    }
}
