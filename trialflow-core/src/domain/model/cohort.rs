// trialflow-core/src/domain/model/cohort.rs

use serde::Serialize;
use serde_json::Value;

use crate::domain::model::mapping::FieldMapping;
use crate::domain::validation::{self, ValidationError};

/// What the raw data held for a required field.
///
/// Cohorts are built even when the data is incomplete; validation reports
/// the gaps afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum FieldState<T> {
    Missing,
    /// Present but unusable; holds the raw value as written.
    Malformed(String),
    Present(T),
}

impl<T> FieldState<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailsShape {
    Sequence,
    /// No details field at all. The cohort starts with an empty list.
    Missing,
    /// Something other than a sequence was given (its type name).
    Malformed(String),
}

/// A named subset of an entity's population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cohort {
    label: String,
    population_count: FieldState<u64>,
    category: FieldState<String>,
    details: Vec<Value>,
    details_shape: DetailsShape,
}

impl Cohort {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            population_count: FieldState::Missing,
            category: FieldState::Missing,
            details: Vec::new(),
            details_shape: DetailsShape::Missing,
        }
    }

    pub fn with_population_count(mut self, count: u64) -> Self {
        self.population_count = FieldState::Present(count);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = FieldState::Present(category.into());
        self
    }

    pub fn with_details(mut self, details: Vec<Value>) -> Self {
        self.details = details;
        self.details_shape = DetailsShape::Sequence;
        self
    }

    /// Builds a cohort from one raw subset entry, reading the field names of
    /// `fields`. Never fails: bad values are kept as [`FieldState::Malformed`].
    pub fn from_raw(label: impl Into<String>, entry: &Value, fields: &FieldMapping) -> Self {
        let population_count = match entry.get(&fields.population) {
            None | Some(Value::Null) => FieldState::Missing,
            Some(v) => v
                .as_u64()
                .map(FieldState::Present)
                .unwrap_or_else(|| FieldState::Malformed(v.to_string())),
        };

        let category = match entry.get(&fields.category) {
            None | Some(Value::Null) => FieldState::Missing,
            Some(Value::String(s)) => FieldState::Present(s.clone()),
            Some(Value::Number(n)) => FieldState::Present(n.to_string()),
            Some(v) => FieldState::Malformed(v.to_string()),
        };

        let (details, details_shape) = match entry.get(&fields.details) {
            None | Some(Value::Null) => (Vec::new(), DetailsShape::Missing),
            Some(Value::Array(items)) => (items.clone(), DetailsShape::Sequence),
            Some(v) => (
                Vec::new(),
                DetailsShape::Malformed(validation::value_kind(v).to_string()),
            ),
        };

        Self {
            label: label.into(),
            population_count,
            category,
            details,
            details_shape,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn population_count(&self) -> Option<u64> {
        self.population_count.present().copied()
    }

    pub fn population_state(&self) -> &FieldState<u64> {
        &self.population_count
    }

    pub fn category(&self) -> Option<&str> {
        self.category.present().map(String::as_str)
    }

    pub fn category_state(&self) -> &FieldState<String> {
        &self.category
    }

    pub fn details(&self) -> &[Value] {
        &self.details
    }

    pub fn details_shape(&self) -> &DetailsShape {
        &self.details_shape
    }

    /// Appends a detail record. Checked later by [`Cohort::validate`].
    pub fn add_detail(&mut self, record: Value) {
        if self.details_shape == DetailsShape::Missing {
            self.details_shape = DetailsShape::Sequence;
        }
        self.details.push(record);
    }

    pub fn total_detail_count(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// `detail count × category` when the category is a numeric level
    /// (e.g. a dose), `None` otherwise. `nan` and `inf` are not levels.
    pub fn exposure(&self) -> Option<f64> {
        let level: f64 = self
            .category()?
            .trim()
            .parse()
            .ok()
            .filter(|l: &f64| l.is_finite())?;
        Some(self.total_detail_count() as f64 * level)
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        validation::check_cohort(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::validation::Severity;
    use serde_json::json;

    #[test]
    fn test_complete_cohort_is_valid() {
        let cohort = Cohort::new("CohortX")
            .with_population_count(10)
            .with_category("low-dose")
            .with_details(vec![json!({ "patient": "P-001" })]);

        assert!(cohort.validate().is_empty());
        assert_eq!(cohort.total_detail_count(), 1);
        assert!(!cohort.is_empty());
    }

    #[test]
    fn test_missing_population_is_reported() {
        let cohort = Cohort::new("CohortX")
            .with_category("low-dose")
            .with_details(vec![]);

        let errors = cohort.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "population_count");
        assert_eq!(errors[0].severity, Severity::Critical);
        assert_eq!(errors[0].scope.as_deref(), Some("CohortX"));
    }

    #[test]
    fn test_from_raw_reads_mapped_fields() {
        let entry = json!({
            "dose": 2.5,
            "patient_count": 12,
            "d": [{ "visit": 1 }, { "visit": 2 }]
        });
        let cohort = Cohort::from_raw("CohortA", &entry, &FieldMapping::clinical());

        assert_eq!(cohort.population_count(), Some(12));
        assert_eq!(cohort.category(), Some("2.5"));
        assert_eq!(cohort.total_detail_count(), 2);
        assert_eq!(cohort.exposure(), Some(5.0));
    }

    #[test]
    fn test_non_finite_category_has_no_exposure() {
        for category in ["nan", "inf", "-Infinity"] {
            let cohort = Cohort::new("CohortZ")
                .with_population_count(4)
                .with_category(category)
                .with_details(vec![json!(1), json!(2)]);
            assert_eq!(cohort.exposure(), None, "category {category}");
        }
    }

    #[test]
    fn test_from_raw_keeps_bad_values() {
        let entry = json!({ "dose": ["a"], "patient_count": -3, "d": { "visit": 1 } });
        let cohort = Cohort::from_raw("CohortA", &entry, &FieldMapping::clinical());

        assert_eq!(
            cohort.population_state(),
            &FieldState::Malformed("-3".to_string())
        );
        assert!(matches!(cohort.category_state(), FieldState::Malformed(_)));
        assert_eq!(
            cohort.details_shape(),
            &DetailsShape::Malformed("mapping".to_string())
        );

        let fields: Vec<String> = cohort.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["population_count", "category", "details"]);
    }

    #[test]
    fn test_missing_details_is_a_warning_with_empty_default() {
        let entry = json!({ "dose": "high-dose", "patient_count": 15 });
        let cohort = Cohort::from_raw("CohortY", &entry, &FieldMapping::clinical());

        assert!(cohort.is_empty());
        let errors = cohort.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "details");
        assert_eq!(errors[0].severity, Severity::Warning);
    }

    #[test]
    fn test_add_detail_preserves_order() {
        let mut cohort = Cohort::new("CohortY")
            .with_population_count(1)
            .with_category("x");
        cohort.add_detail(json!(1));
        cohort.add_detail(json!(2));

        assert_eq!(cohort.details(), &[json!(1), json!(2)]);
        assert_eq!(cohort.details_shape(), &DetailsShape::Sequence);
        assert!(cohort.validate().is_empty());
        assert_eq!(cohort.exposure(), None);
    }
}
