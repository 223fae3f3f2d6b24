// trialflow-core/src/domain/validation.rs
//
// Pure checks over raw records and built entities. Nothing here fails: every
// check returns the issues it found and the caller picks the policy.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use crate::domain::model::{Cohort, DetailsShape, Entity, FieldMapping, FieldState};
use crate::domain::project::SubsetSelection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub severity: Severity,
    /// Label of the cohort the issue belongs to, `None` for entity-level issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl ValidationError {
    pub fn critical(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Critical,
            scope: None,
        }
    }

    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Warning,
            scope: None,
        }
    }

    pub fn in_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(
                f,
                "[{}] {}.{}: {}",
                self.severity, scope, self.field, self.message
            ),
            None => write!(f, "[{}] {}: {}", self.severity, self.field, self.message),
        }
    }
}

pub fn has_critical(errors: &[ValidationError]) -> bool {
    errors.iter().any(ValidationError::is_critical)
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

// --- RAW STAGE (during load) ---

/// Shape checks on the raw record of one entity, before any cohort is built.
pub fn check_raw_record(raw: &Value, fields: &FieldMapping) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let record = match raw {
        Value::Null => {
            errors.push(ValidationError::warning(
                "record",
                "no raw data found; continuing without data",
            ));
            return errors;
        }
        Value::Object(record) => record,
        other => {
            errors.push(ValidationError::critical(
                "record",
                format!("expected a mapping, found a {}", value_kind(other)),
            ));
            return errors;
        }
    };

    match record.get(&fields.name) {
        None | Some(Value::Null) => errors.push(ValidationError::warning(
            fields.name.as_str(),
            "missing; the entity id is used as its name",
        )),
        Some(Value::String(_)) => {}
        Some(other) => errors.push(ValidationError::critical(
            fields.name.as_str(),
            format!("expected a string, found a {}", value_kind(other)),
        )),
    }

    match record.get(&fields.subsets) {
        None | Some(Value::Null) | Some(Value::Object(_)) => {}
        Some(Value::Array(entries)) => {
            for (index, entry) in entries.iter().enumerate() {
                let field = format!("{}[{}]", fields.subsets, index);
                if !entry.is_object() {
                    errors.push(ValidationError::critical(
                        field,
                        format!("expected a mapping, found a {}", value_kind(entry)),
                    ));
                } else if entry.get(&fields.label).and_then(Value::as_str).is_none() {
                    errors.push(ValidationError::critical(
                        field,
                        format!("entry has no '{}'; it was skipped", fields.label),
                    ));
                }
            }
        }
        Some(other) => errors.push(ValidationError::critical(
            fields.subsets.as_str(),
            format!(
                "expected a sequence or mapping of subsets, found a {}",
                value_kind(other)
            ),
        )),
    }

    errors
}

/// Labels the configuration selected that the raw data does not contain.
pub fn check_subset_selection(
    selection: &SubsetSelection,
    available: &[&str],
) -> Vec<ValidationError> {
    let SubsetSelection::Only(labels) = selection else {
        return Vec::new();
    };
    labels
        .iter()
        .filter(|label| !available.contains(&label.as_str()))
        .map(|label| {
            ValidationError::warning("included_subsets", "selected subset not found in data")
                .in_scope(label.as_str())
        })
        .collect()
}

// --- CONSTRUCTED STAGE (during validate) ---

pub fn check_cohort(cohort: &Cohort) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match cohort.population_state() {
        FieldState::Present(_) => {}
        FieldState::Missing => errors.push(ValidationError::critical(
            "population_count",
            "required field is missing",
        )),
        FieldState::Malformed(raw) => errors.push(ValidationError::critical(
            "population_count",
            format!("expected a non-negative integer, found {}", raw),
        )),
    }

    match cohort.category_state() {
        FieldState::Present(_) => {}
        FieldState::Missing => errors.push(ValidationError::critical(
            "category",
            "required field is missing",
        )),
        FieldState::Malformed(raw) => errors.push(ValidationError::critical(
            "category",
            format!("expected a scalar, found {}", raw),
        )),
    }

    match cohort.details_shape() {
        DetailsShape::Sequence => {}
        DetailsShape::Missing => errors.push(ValidationError::warning(
            "details",
            "missing; defaulted to an empty list",
        )),
        DetailsShape::Malformed(kind) => errors.push(ValidationError::critical(
            "details",
            format!("expected a sequence, found a {}", kind),
        )),
    }

    errors
        .into_iter()
        .map(|e| e.in_scope(cohort.label()))
        .collect()
}

/// Kind-agnostic checks on a loaded entity, including every cohort.
pub fn check_entity(entity: &Entity) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if entity.name().trim().is_empty() {
        errors.push(ValidationError::critical("name", "entity name is empty"));
    }

    if entity.subsets().is_empty() {
        errors.push(ValidationError::critical(
            "subsets",
            "no subsets materialized; nothing to import",
        ));
    }

    let mut seen = HashSet::new();
    for cohort in entity.subsets() {
        if !seen.insert(cohort.label()) {
            errors.push(
                ValidationError::critical("label", "duplicate subset label")
                    .in_scope(cohort.label()),
            );
        }
        errors.extend(check_cohort(cohort));
    }

    errors
}

/// For kinds describing ongoing work: the schedule must exist and stay open.
pub fn check_ongoing_schedule(entity: &Entity) -> Vec<ValidationError> {
    match entity.schedule() {
        None => vec![ValidationError::warning(
            "schedule",
            "ongoing entity has no schedule",
        )],
        Some(schedule) if !schedule.is_open_ended() => vec![ValidationError::warning(
            "schedule",
            "ongoing entity should end with an open phase",
        )],
        Some(_) => Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_severity_ordering_and_display() {
        assert!(Severity::Warning < Severity::Critical);
        assert_eq!(Severity::Critical.to_string(), "critical");
    }

    #[test]
    fn test_display_includes_scope() {
        let err = ValidationError::warning("details", "missing").in_scope("CohortY");
        assert_eq!(err.to_string(), "[warning] CohortY.details: missing");
    }

    #[test]
    fn test_raw_record_null_is_a_warning() {
        let errors = check_raw_record(&Value::Null, &FieldMapping::clinical());
        assert_eq!(errors.len(), 1);
        assert!(!has_critical(&errors));
    }

    #[test]
    fn test_raw_record_shape_errors() {
        let raw = json!({
            "name": 7,
            "cohorts": [ { "dose": "low" }, "CohortZ" ]
        });
        let errors = check_raw_record(&raw, &FieldMapping::clinical());
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "cohorts[0]", "cohorts[1]"]);
        assert!(errors.iter().all(ValidationError::is_critical));
    }

    #[test]
    fn test_raw_record_scalar_subsets() {
        let raw = json!({ "name": "T", "cohorts": "all of them" });
        let errors = check_raw_record(&raw, &FieldMapping::clinical());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "cohorts");
    }

    #[test]
    fn test_subset_selection_reports_unknown_labels() {
        let selection = SubsetSelection::Only(vec!["CohortX".into(), "CohortQ".into()]);
        let errors = check_subset_selection(&selection, &["CohortX", "CohortY"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].scope.as_deref(), Some("CohortQ"));

        assert!(check_subset_selection(&SubsetSelection::All, &[]).is_empty());
    }
}
