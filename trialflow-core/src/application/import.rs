// trialflow-core/src/application/import.rs

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::error::DomainError;
use crate::domain::model::Entity;
use crate::domain::validation::ValidationError;
use crate::ports::transmitter::TransmitterSet;

/// Which validation issues block job creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatePolicy {
    /// Only critical issues block.
    #[default]
    Standard,
    /// Warnings block too.
    Strict,
}

impl GatePolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Standard }
    }

    fn blocks(&self, error: &ValidationError) -> bool {
        match self {
            Self::Standard => error.is_critical(),
            Self::Strict => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed { reason: String },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed { .. })
    }
}

/// A validated entity bound to one endpoint.
///
/// The entity is shared read-only: several jobs may point at the same one.
#[derive(Debug, Clone)]
pub struct ImportJob {
    entity: Arc<Entity>,
    endpoint: String,
    status: JobStatus,
    as_of: Option<i64>,
}

impl ImportJob {
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    /// Instant at which the transmitted summary resolves its active phase.
    pub fn with_as_of(mut self, as_of: Option<i64>) -> Self {
        self.as_of = as_of;
        self
    }

    /// Sends the entity summary through the transmitter registered for this
    /// job's endpoint. A job runs once; later calls return the terminal
    /// status unchanged.
    pub async fn run(&mut self, transmitters: &TransmitterSet) -> JobStatus {
        if self.status != JobStatus::Pending {
            warn!(entity = %self.entity.id(), endpoint = %self.endpoint, "Job already ran");
            return self.status.clone();
        }

        self.status = JobStatus::Running;
        debug!(entity = %self.entity.id(), endpoint = %self.endpoint, "Job running");

        let summary = self.entity.summary(self.as_of);
        let outcome = match transmitters.get(&self.endpoint) {
            Some(transmitter) => transmitter
                .transmit(&summary)
                .await
                .map_err(|e| e.to_string()),
            None => Err(format!(
                "no transmitter registered for endpoint '{}'",
                self.endpoint
            )),
        };

        self.status = match outcome {
            Ok(()) => JobStatus::Succeeded,
            Err(reason) => JobStatus::Failed { reason },
        };
        self.status.clone()
    }
}

/// Wraps a validated entity into a pending job for `endpoint`.
///
/// Fails with `NotValidated` when `validate()` never ran on the entity or
/// reported a critical issue.
pub fn create_import(entity: Arc<Entity>, endpoint: &str) -> Result<ImportJob, DomainError> {
    create_import_with_policy(entity, endpoint, GatePolicy::Standard)
}

pub fn create_import_with_policy(
    entity: Arc<Entity>,
    endpoint: &str,
    policy: GatePolicy,
) -> Result<ImportJob, DomainError> {
    let not_validated = |reason: String| DomainError::NotValidated {
        entity: entity.id().to_string(),
        endpoint: endpoint.to_string(),
        reason,
    };

    let Some(outcome) = entity.validation_outcome() else {
        return Err(not_validated("validate() was never called".into()));
    };

    let blocking = outcome.iter().filter(|e| policy.blocks(e)).count();
    if blocking > 0 {
        return Err(not_validated(format!(
            "{} blocking validation issue(s)",
            blocking
        )));
    }

    Ok(ImportJob {
        entity: Arc::clone(&entity),
        endpoint: endpoint.to_string(),
        status: JobStatus::Pending,
        as_of: None,
    })
}
