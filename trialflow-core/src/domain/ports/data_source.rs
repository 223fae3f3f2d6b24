use crate::domain::error::DomainError;
use crate::domain::model::RawRecord;

/// Read access to the raw data store.
pub trait DataSource: Send + Sync {
    /// Returns the raw record stored under `key` in `source_ref`, or `None`
    /// when the source or the record does not exist.
    fn fetch(&self, source_ref: &str, key: &str) -> Result<Option<RawRecord>, DomainError>;
}
