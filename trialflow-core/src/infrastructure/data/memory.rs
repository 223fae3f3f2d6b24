use std::collections::HashMap;

use crate::domain::error::DomainError;
use crate::domain::model::RawRecord;
use crate::domain::ports::DataSource;

/// Data source held entirely in memory: `source_ref -> key -> record`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    sources: HashMap<String, HashMap<String, RawRecord>>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        source_ref: impl Into<String>,
        key: impl Into<String>,
        record: RawRecord,
    ) {
        self.sources
            .entry(source_ref.into())
            .or_default()
            .insert(key.into(), record);
    }

    pub fn with(mut self, source_ref: impl Into<String>, key: impl Into<String>, record: RawRecord) -> Self {
        self.insert(source_ref, key, record);
        self
    }
}

impl DataSource for InMemoryDataSource {
    fn fetch(&self, source_ref: &str, key: &str) -> Result<Option<RawRecord>, DomainError> {
        Ok(self
            .sources
            .get(source_ref)
            .and_then(|records| records.get(key))
            .cloned())
    }
}
