use async_trait::async_trait;
use tracing::info;

use crate::domain::model::EntitySummary;
use crate::error::TrialflowError;
use crate::ports::transmitter::Transmitter;

/// Endpoint that only reports summaries through `tracing`.
pub struct LogTransmitter {
    endpoint: String,
}

impl LogTransmitter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Transmitter for LogTransmitter {
    async fn transmit(&self, summary: &EntitySummary) -> Result<(), TrialflowError> {
        info!(
            endpoint = %self.endpoint,
            entity = %summary.id,
            kind = %summary.kind,
            subsets = ?summary.subset_labels,
            population = summary.total_population,
            active_phase = ?summary.active_phase,
            "Entity summary"
        );
        Ok(())
    }
}
