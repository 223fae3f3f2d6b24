// trialflow-core/src/infrastructure/adapters/file.rs

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::info;

use crate::domain::model::EntitySummary;
use crate::error::TrialflowError;
use crate::infrastructure::fs::write_json;
use crate::ports::transmitter::Transmitter;

/// Writes each summary to `<dir>/<entity id>.json`.
pub struct JsonFileTransmitter {
    dir: PathBuf,
}

impl JsonFileTransmitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Export file of one entity. Ids that are not a plain file name
    /// (`../x`, `a/b`, absolute paths) are refused.
    pub fn path_for(&self, entity_id: &str) -> Result<PathBuf, TrialflowError> {
        let mut components = Path::new(entity_id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {
                Ok(self.dir.join(format!("{}.json", entity_id)))
            }
            _ => Err(TrialflowError::UnsafePath(entity_id.to_string())),
        }
    }
}

#[async_trait]
impl Transmitter for JsonFileTransmitter {
    async fn transmit(&self, summary: &EntitySummary) -> Result<(), TrialflowError> {
        let path = self.path_for(&summary.id)?;
        write_json(&path, summary)?;
        info!(entity = %summary.id, path = ?path, "Summary exported");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::model::SourceRef;
    use anyhow::Result;
    use tempfile::tempdir;

    fn summary() -> EntitySummary {
        EntitySummary {
            id: "TrialB".into(),
            kind: "TrialB".into(),
            name: "Trial B".into(),
            source: SourceRef::default(),
            subset_count: 0,
            subset_labels: vec![],
            total_population: 0,
            total_details: 0,
            cohorts: vec![],
            phase_count: 0,
            active_phase: None,
            ongoing: false,
            as_of: None,
        }
    }

    #[tokio::test]
    async fn test_transmit_writes_json() -> Result<()> {
        let dir = tempdir()?;
        let transmitter = JsonFileTransmitter::new(dir.path().join("exports"));

        transmitter.transmit(&summary()).await?;

        let content = std::fs::read_to_string(transmitter.path_for("TrialB")?)?;
        let back: EntitySummary = serde_json::from_str(&content)?;
        assert_eq!(back, summary());
        Ok(())
    }

    #[tokio::test]
    async fn test_transmit_refuses_ids_escaping_the_export_dir() -> Result<()> {
        let dir = tempdir()?;
        let exports = dir.path().join("exports");
        let transmitter = JsonFileTransmitter::new(&exports);

        for id in ["../x", "nested/x", "/tmp/x", ".."] {
            assert!(matches!(
                transmitter.path_for(id),
                Err(TrialflowError::UnsafePath(_))
            ));
        }

        let escaping = EntitySummary {
            id: "../x".into(),
            ..summary()
        };
        let res = transmitter.transmit(&escaping).await;
        assert!(matches!(res, Err(TrialflowError::UnsafePath(p)) if p == "../x"));
        assert!(!dir.path().join("x.json").exists());
        Ok(())
    }
}
