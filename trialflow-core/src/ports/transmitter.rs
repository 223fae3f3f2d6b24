// trialflow-core/src/ports/transmitter.rs

// What an import job needs from an endpoint: somewhere to send a summary.
// How it gets there (file, log, HTTP...) is the adapter's business.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::model::EntitySummary;
use crate::error::TrialflowError;

#[async_trait]
pub trait Transmitter: Send + Sync {
    async fn transmit(&self, summary: &EntitySummary) -> Result<(), TrialflowError>;
}

/// Transmitters keyed by endpoint name.
#[derive(Clone, Default)]
pub struct TransmitterSet {
    transmitters: BTreeMap<String, Arc<dyn Transmitter>>,
}

impl TransmitterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, endpoint: impl Into<String>, transmitter: Arc<dyn Transmitter>) {
        self.transmitters.insert(endpoint.into(), transmitter);
    }

    pub fn with(mut self, endpoint: impl Into<String>, transmitter: Arc<dyn Transmitter>) -> Self {
        self.insert(endpoint, transmitter);
        self
    }

    pub fn get(&self, endpoint: &str) -> Option<&Arc<dyn Transmitter>> {
        self.transmitters.get(endpoint)
    }

    pub fn endpoints(&self) -> Vec<&str> {
        self.transmitters.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.transmitters.is_empty()
    }
}
