// trialflow-core/src/infrastructure/data/yaml_store.rs

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::domain::error::DomainError;
use crate::domain::model::RawRecord;
use crate::domain::ports::DataSource;
use crate::infrastructure::error::InfrastructureError;

/// Raw data files in YAML, each a mapping `entity id -> raw record`.
///
/// Relative `source_ref`s resolve against the project directory. A file is
/// parsed once and shared by every entity that points at it.
pub struct YamlDataStore {
    root: PathBuf,
    cache: Mutex<HashMap<PathBuf, Option<Arc<Value>>>>,
}

impl YamlDataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn resolve(&self, source_ref: &str) -> PathBuf {
        let raw_path = Path::new(source_ref);
        if raw_path.is_absolute() {
            raw_path.to_path_buf()
        } else {
            self.root.join(raw_path)
        }
    }

    fn read_document(path: &Path) -> Result<Option<Value>, InfrastructureError> {
        if !path.exists() {
            warn!(path = ?path, "Data file not found. Continuing without data.");
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let document: Value = serde_yaml::from_str(&content)?;
        debug!(path = ?path, "Data file parsed");
        Ok(Some(document))
    }

    fn document(&self, source_ref: &str) -> Result<Option<Arc<Value>>, DomainError> {
        let path = self.resolve(source_ref);
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| DomainError::DataSource("Data cache mutex poisoned".into()))?;

        if let Some(cached) = cache.get(&path) {
            return Ok(cached.clone());
        }

        let document = Self::read_document(&path)
            .map_err(|e| DomainError::DataSource(format!("{:?}: {}", path, e)))?
            .map(Arc::new);
        cache.insert(path, document.clone());
        Ok(document)
    }
}

impl DataSource for YamlDataStore {
    fn fetch(&self, source_ref: &str, key: &str) -> Result<Option<RawRecord>, DomainError> {
        let Some(document) = self.document(source_ref)? else {
            return Ok(None);
        };
        let record = document.get(key).cloned();
        if record.is_none() {
            warn!(source = source_ref, key, "No data found for entity");
        }
        Ok(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_fetch_record_by_key() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("data"))?;
        fs::write(
            dir.path().join("data/trials.yaml"),
            "TrialB:\n  name: Trial B\n  cohorts:\n    CohortX:\n      patient_count: 10\n",
        )?;

        let store = YamlDataStore::new(dir.path());
        let record = store.fetch("data/trials.yaml", "TrialB")?.unwrap();
        assert_eq!(record["name"], "Trial B");
        assert_eq!(record["cohorts"]["CohortX"]["patient_count"], 10);

        assert!(store.fetch("data/trials.yaml", "TrialQ")?.is_none());
        Ok(())
    }

    #[test]
    fn test_missing_file_yields_no_record() -> Result<()> {
        let dir = tempdir()?;
        let store = YamlDataStore::new(dir.path());
        assert!(store.fetch("data/absent.yaml", "TrialB")?.is_none());
        Ok(())
    }

    #[test]
    fn test_unparseable_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("broken.yaml"), "TrialB: [unclosed\n")?;
        let store = YamlDataStore::new(dir.path());
        assert!(matches!(
            store.fetch("broken.yaml", "TrialB"),
            Err(DomainError::DataSource(_))
        ));
        Ok(())
    }

    #[test]
    fn test_subset_order_is_preserved() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("d.yaml"),
            "T:\n  cohorts:\n    Zeta: {}\n    Alpha: {}\n    Mid: {}\n",
        )?;
        let store = YamlDataStore::new(dir.path());
        let record = store.fetch("d.yaml", "T")?.unwrap();
        let labels: Vec<&String> = record["cohorts"].as_object().unwrap().keys().collect();
        assert_eq!(labels, vec!["Zeta", "Alpha", "Mid"]);
        Ok(())
    }
}
