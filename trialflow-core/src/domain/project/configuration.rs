// src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::domain::model::InstantSpec;

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_profile")]
    pub profile: String,

    #[serde(rename = "config-paths", default)]
    pub config_paths: Vec<String>,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    #[serde(rename = "clean-targets", default = "default_clean_targets")]
    pub clean_targets: Vec<String>,

    /// Warnings block job creation too.
    #[serde(default)]
    pub strict: bool,

    /// Instant used to resolve active phases in summaries.
    #[serde(rename = "as-of", default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<InstantSpec>,

    #[serde(default)]
    pub endpoints: BTreeMap<String, EndpointConfig>,

    /// Per-entity processing configuration, keyed by entity id.
    #[serde(default)]
    pub entities: BTreeMap<String, EntityConfig>,
}

/// Where an endpoint sends entity summaries.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndpointConfig {
    /// One JSON document per entity, under `<target-path>/<path>`.
    File { path: String },
    /// Summaries go to the log.
    Log,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Validate)]
pub struct EntityConfig {
    #[validate(length(min = 1, message = "Entity kind cannot be empty"))]
    pub kind: String,

    #[serde(alias = "data_file")]
    #[validate(length(min = 1, message = "Data source reference cannot be empty"))]
    pub data_source_ref: String,

    #[serde(default, alias = "cohorts")]
    pub included_subsets: SubsetSelection,

    /// Collect the schedule from the raw data.
    #[serde(default = "default_true")]
    pub schedule: bool,

    /// Endpoint names this entity is imported to.
    #[serde(default)]
    pub endpoints: Vec<String>,
}

impl EntityConfig {
    pub fn new(kind: impl Into<String>, data_source_ref: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data_source_ref: data_source_ref.into(),
            included_subsets: SubsetSelection::All,
            schedule: true,
            endpoints: Vec::new(),
        }
    }

    pub fn with_endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }
}

/// Which subsets of the raw data get materialized.
///
/// Written as `all`, a single label, or a list of labels. An absent or empty
/// list means all.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "SelectionRepr", into = "SelectionRepr")]
pub enum SubsetSelection {
    #[default]
    All,
    Only(Vec<String>),
}

impl SubsetSelection {
    pub fn includes(&self, label: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(labels) => labels.iter().any(|l| l == label),
        }
    }
}

#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum SelectionRepr {
    Keyword(String),
    Labels(Vec<String>),
}

impl From<SelectionRepr> for SubsetSelection {
    fn from(repr: SelectionRepr) -> Self {
        match repr {
            SelectionRepr::Keyword(k) if k.eq_ignore_ascii_case("all") => Self::All,
            SelectionRepr::Keyword(label) => Self::Only(vec![label]),
            SelectionRepr::Labels(labels) if labels.is_empty() => Self::All,
            SelectionRepr::Labels(labels) => Self::Only(labels),
        }
    }
}

impl From<SubsetSelection> for SelectionRepr {
    fn from(selection: SubsetSelection) -> Self {
        match selection {
            SubsetSelection::All => Self::Keyword("all".to_string()),
            SubsetSelection::Only(labels) => Self::Labels(labels),
        }
    }
}

fn default_clean_targets() -> Vec<String> {
    vec!["target".to_string()]
}
fn default_target_path() -> String {
    "target".to_string()
}
fn default_profile() -> String {
    "dev".to_string()
}
fn default_version() -> String {
    "0.1.0".to_string()
}
fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_project_config_deserialization() {
        let yaml = r#"
name: clinical_demo
config-paths: [config]
as-of: 0
endpoints:
  endpointA: { type: file, path: exports }
  audit: { type: log }
entities:
  TrialB:
    kind: TrialB
    data_file: data/sample_trial_data.yaml
    cohorts: [CohortX, CohortY]
    endpoints: [endpointA]
"#;
        let config: ProjectConfig = serde_yaml::from_str(yaml).expect("Should deserialize");

        assert_eq!(config.version, "0.1.0");
        assert_eq!(config.target_path, "target");
        assert_eq!(config.as_of, Some(InstantSpec::Offset(0)));
        assert_eq!(
            config.endpoints.get("endpointA"),
            Some(&EndpointConfig::File {
                path: "exports".into()
            })
        );
        assert_eq!(config.endpoints.get("audit"), Some(&EndpointConfig::Log));

        let trial = config.entities.get("TrialB").expect("TrialB should exist");
        assert_eq!(trial.data_source_ref, "data/sample_trial_data.yaml");
        assert!(trial.schedule);
        assert_eq!(
            trial.included_subsets,
            SubsetSelection::Only(vec!["CohortX".into(), "CohortY".into()])
        );
    }

    #[test]
    fn test_subset_selection_forms() {
        let all: SubsetSelection = serde_yaml::from_str("all").unwrap();
        assert_eq!(all, SubsetSelection::All);

        let empty: SubsetSelection = serde_yaml::from_str("[]").unwrap();
        assert_eq!(empty, SubsetSelection::All);

        let single: SubsetSelection = serde_yaml::from_str("CohortX").unwrap();
        assert!(single.includes("CohortX"));
        assert!(!single.includes("CohortY"));
    }

    #[test]
    fn test_entity_config_validation() {
        let ok = EntityConfig::new("TrialB", "data.yaml");
        assert!(ok.validate().is_ok());

        let bad = EntityConfig::new("", "data.yaml");
        assert!(bad.validate().is_err());
    }
}
