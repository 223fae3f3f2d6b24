// trialflow-core/src/domain/model/entity.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::domain::error::DomainError;
use crate::domain::model::summary::{CohortDigest, EntitySummary};
use crate::domain::model::{Cohort, Schedule};
use crate::domain::project::EntityConfig;
use crate::domain::registry::KindProfile;
use crate::domain::validation::{self, ValidationError};

/// Raw data of one entity as read from its data source.
pub type RawRecord = Value;

/// Where an entity's raw data came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceRef {
    pub data_source: String,
    pub key: String,
}

/// One configured record (a trial, a league...) with its cohorts and
/// optional schedule.
///
/// The kind profile decides which raw fields are read and which extra
/// checks run. It is fixed at construction.
#[derive(Debug, Clone)]
pub struct Entity {
    id: String,
    name: String,
    profile: Arc<KindProfile>,
    subsets: Vec<Cohort>,
    schedule: Option<Schedule>,
    source_ref: SourceRef,
    load_issues: Vec<ValidationError>,
    validation: Option<Vec<ValidationError>>,
}

impl Entity {
    pub fn new(id: impl Into<String>, profile: Arc<KindProfile>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            source_ref: SourceRef {
                data_source: String::new(),
                key: id.clone(),
            },
            id,
            profile,
            subsets: Vec::new(),
            schedule: None,
            load_issues: Vec::new(),
            validation: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.profile.kind
    }

    pub fn profile(&self) -> &KindProfile {
        &self.profile
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subsets(&self) -> &[Cohort] {
        &self.subsets
    }

    pub fn cohort(&self, label: &str) -> Option<&Cohort> {
        self.subsets.iter().find(|c| c.label() == label)
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    pub fn source_ref(&self) -> &SourceRef {
        &self.source_ref
    }

    /// Issues found while reading the raw record.
    pub fn load_issues(&self) -> &[ValidationError] {
        &self.load_issues
    }

    /// Populates cohorts and schedule from `raw`.
    ///
    /// Replaces whatever a previous call loaded, so loading the same input
    /// twice gives the same entity. On error the entity is left untouched.
    pub fn load(&mut self, raw: &RawRecord, config: &EntityConfig) -> Result<(), DomainError> {
        let fields = &self.profile.fields;
        let mut issues = validation::check_raw_record(raw, fields);

        let name = raw
            .get(&fields.name)
            .and_then(Value::as_str)
            .unwrap_or(&self.id)
            .to_string();

        let entries = subset_entries(raw.get(&fields.subsets), &fields.label);
        let available: Vec<&str> = entries.iter().map(|(label, _)| label.as_str()).collect();
        issues.extend(validation::check_subset_selection(
            &config.included_subsets,
            &available,
        ));

        let subsets: Vec<Cohort> = entries
            .iter()
            .filter(|(label, _)| config.included_subsets.includes(label))
            .map(|(label, entry)| Cohort::from_raw(label.as_str(), entry, fields))
            .collect();

        let schedule = match raw.get(&fields.schedule) {
            Some(value) if config.schedule && !value.is_null() => {
                let schedule = Schedule::from_raw(value).map_err(|source| DomainError::Schedule {
                    entity: self.id.clone(),
                    source,
                })?;
                (!schedule.is_empty()).then_some(schedule)
            }
            _ => None,
        };

        self.name = name;
        self.subsets = subsets;
        self.schedule = schedule;
        self.load_issues = issues;
        self.source_ref = SourceRef {
            data_source: config.data_source_ref.clone(),
            key: self.id.clone(),
        };
        self.validation = None;
        Ok(())
    }

    /// Runs the kind-agnostic checks, then the kind's own checks.
    /// Returns every issue found (empty = valid) and remembers the outcome.
    pub fn validate(&mut self) -> Vec<ValidationError> {
        let profile = Arc::clone(&self.profile);
        let mut errors = self.load_issues.clone();
        errors.extend(validation::check_entity(self));
        for check in &profile.checks {
            errors.extend(check(self));
        }
        self.validation = Some(errors.clone());
        errors
    }

    /// Outcome of the last [`Entity::validate`] call, `None` if it never ran
    /// since the last load.
    pub fn validation_outcome(&self) -> Option<&[ValidationError]> {
        self.validation.as_deref()
    }

    pub fn is_validated(&self) -> bool {
        self.validation.is_some()
    }

    /// Read-only digest for reports and transmitters. The active phase is
    /// resolved at `as_of` when given.
    pub fn summary(&self, as_of: Option<i64>) -> EntitySummary {
        let cohorts: Vec<CohortDigest> = self
            .subsets
            .iter()
            .map(|c| CohortDigest {
                label: c.label().to_string(),
                category: c.category().map(str::to_string),
                population_count: c.population_count(),
                detail_count: c.total_detail_count(),
                exposure: c.exposure(),
            })
            .collect();

        let active_phase = match (&self.schedule, as_of) {
            (Some(schedule), Some(t)) => schedule.resolve_phase(t).map(|p| p.label.clone()),
            _ => None,
        };

        EntitySummary {
            id: self.id.clone(),
            kind: self.kind().to_string(),
            name: self.name.clone(),
            source: self.source_ref.clone(),
            subset_count: cohorts.len(),
            subset_labels: cohorts.iter().map(|c| c.label.clone()).collect(),
            total_population: cohorts.iter().filter_map(|c| c.population_count).sum(),
            total_details: cohorts.iter().map(|c| c.detail_count).sum(),
            cohorts,
            phase_count: self.schedule.as_ref().map_or(0, Schedule::len),
            active_phase,
            ongoing: self.schedule.as_ref().is_some_and(Schedule::is_open_ended),
            as_of,
        }
    }
}

/// Subset entries in data order, as `(label, entry)`. Sequence entries
/// without a usable label are skipped (the raw-stage check reports them).
fn subset_entries<'a>(container: Option<&'a Value>, label_field: &str) -> Vec<(String, &'a Value)> {
    match container {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let label = item.get(label_field).and_then(Value::as_str)?;
                Some((label.to_string(), item))
            })
            .collect(),
        Some(Value::Object(entries)) => entries.iter().map(|(k, v)| (k.clone(), v)).collect(),
        _ => Vec::new(),
    }
}
