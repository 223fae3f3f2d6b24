// trialflow-core/src/domain/model/summary.rs

use serde::{Deserialize, Serialize};

use crate::domain::model::entity::SourceRef;

/// Read-only projection of an entity, as handed to transmitters and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub source: SourceRef,
    pub subset_count: usize,
    pub subset_labels: Vec<String>,
    pub total_population: u64,
    pub total_details: usize,
    pub cohorts: Vec<CohortDigest>,
    pub phase_count: usize,
    pub active_phase: Option<String>,
    pub ongoing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortDigest {
    pub label: String,
    pub category: Option<String>,
    pub population_count: Option<u64>,
    pub detail_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<f64>,
}
