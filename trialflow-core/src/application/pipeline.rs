// trialflow-core/src/application/pipeline.rs

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::application::import::{GatePolicy, ImportJob, JobStatus, create_import_with_policy};
use crate::application::inspection::inspect_entities;
use crate::domain::ports::DataSource;
use crate::domain::project::ProjectConfig;
use crate::domain::registry::EntityRegistry;
use crate::domain::validation::ValidationError;
use crate::error::TrialflowError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::write_json;
use crate::ports::transmitter::TransmitterSet;

const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Restrict the run to one entity id.
    pub select: Option<String>,
    /// Instant used to resolve the active phase of transmitted summaries.
    pub as_of: Option<i64>,
    pub policy: GatePolicy,
    /// Jobs in flight at once.
    pub concurrency: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            select: None,
            as_of: None,
            policy: GatePolicy::Standard,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl RunOptions {
    /// Options taken from the project file (`strict`, `as-of`).
    pub fn from_config(config: &ProjectConfig) -> Result<Self, TrialflowError> {
        let as_of = match &config.as_of {
            Some(spec) => Some(spec.resolve().ok_or_else(|| {
                InfrastructureError::ConfigError(format!("Unreadable as-of instant: {:?}", spec))
            })?),
            None => None,
        };
        Ok(Self {
            as_of,
            policy: GatePolicy::from_strict(config.strict),
            ..Self::default()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub endpoint: String,
    #[serde(flatten)]
    pub status: JobStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityOutcome {
    pub id: String,
    pub kind: String,
    pub loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub issues: Vec<ValidationError>,
    pub jobs: Vec<JobOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub success: bool,
    pub entities_loaded: usize,
    pub jobs_succeeded: usize,
    pub jobs_failed: usize,
    pub errors: Vec<String>,
    pub entities: Vec<EntityOutcome>,
}

/// Loads, validates and imports every configured entity, then writes
/// `run_results.json` into the target directory.
///
/// A failing entity or job is recorded and the run goes on; the result's
/// `success` flag tells whether anything failed.
#[instrument(skip_all, fields(project = %config.name))]
pub async fn run_import(
    project_dir: &Path,
    config: &ProjectConfig,
    registry: &EntityRegistry,
    data_source: &dyn DataSource,
    transmitters: &TransmitterSet,
    options: &RunOptions,
) -> Result<RunResult, TrialflowError> {
    let start_time = std::time::Instant::now();
    let target_dir = project_dir.join(&config.target_path);

    // 1. LOAD & VALIDATE
    let reports = inspect_entities(config, registry, data_source, options.select.as_deref())?;

    let mut errors = Vec::new();
    let mut outcomes: BTreeMap<String, EntityOutcome> = BTreeMap::new();
    let mut jobs: Vec<ImportJob> = Vec::new();

    // 2. JOB CREATION
    for report in reports {
        let mut outcome = EntityOutcome {
            id: report.id.clone(),
            kind: report.config.kind.clone(),
            loaded: report.outcome.is_ok(),
            error: None,
            issues: report.issues.clone(),
            jobs: Vec::new(),
        };

        match report.outcome {
            Err(e) => {
                error!(entity = %report.id, error = %e, "Entity skipped");
                errors.push(format!("{}: {}", report.id, e));
                outcome.error = Some(e.to_string());
            }
            Ok(entity) => {
                let entity = Arc::new(entity);
                if report.config.endpoints.is_empty() {
                    warn!(entity = %report.id, "No endpoint configured, nothing to import");
                }
                for endpoint in &report.config.endpoints {
                    match create_import_with_policy(Arc::clone(&entity), endpoint, options.policy) {
                        Ok(job) => jobs.push(job.with_as_of(options.as_of)),
                        Err(e) => {
                            warn!(entity = %report.id, endpoint = %endpoint, error = %e, "Import refused");
                            errors.push(format!("{}: {}", report.id, e));
                            outcome.jobs.push(JobOutcome {
                                endpoint: endpoint.clone(),
                                status: JobStatus::Failed {
                                    reason: e.to_string(),
                                },
                            });
                        }
                    }
                }
            }
        }
        outcomes.insert(outcome.id.clone(), outcome);
    }

    // 3. EXECUTION (bounded concurrency, order of completion is irrelevant)
    info!(jobs = jobs.len(), "Running import jobs");
    let concurrency = options.concurrency.max(1);
    let finished: Vec<(String, String, JobStatus)> = futures::stream::iter(jobs.into_iter().map(
        |mut job| async move {
            let status = job.run(transmitters).await;
            (job.entity().id().to_string(), job.endpoint().to_string(), status)
        },
    ))
    .buffer_unordered(concurrency)
    .collect()
    .await;

    let mut jobs_succeeded = 0;
    let mut jobs_failed = 0;
    for (entity_id, endpoint, status) in finished {
        match &status {
            JobStatus::Succeeded => jobs_succeeded += 1,
            JobStatus::Failed { reason } => {
                error!(entity = %entity_id, endpoint = %endpoint, reason = %reason, "Job failed");
                errors.push(format!("{} -> {}: {}", entity_id, endpoint, reason));
                jobs_failed += 1;
            }
            JobStatus::Pending | JobStatus::Running => {}
        }
        if let Some(outcome) = outcomes.get_mut(&entity_id) {
            outcome.jobs.push(JobOutcome { endpoint, status });
        }
    }

    let entities: Vec<EntityOutcome> = outcomes
        .into_values()
        .map(|mut outcome| {
            outcome.jobs.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
            outcome
        })
        .collect();

    // 4. FINALIZE
    let result = RunResult {
        success: errors.is_empty(),
        entities_loaded: entities.iter().filter(|e| e.loaded).count(),
        jobs_succeeded,
        jobs_failed,
        errors,
        entities,
    };

    write_json(target_dir.join("run_results.json"), &result)?;

    info!(
        elapsed_s = start_time.elapsed().as_secs_f64(),
        succeeded = result.jobs_succeeded,
        failed = result.jobs_failed,
        "Run finished"
    );
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::model::EntitySummary;
    use crate::infrastructure::data::InMemoryDataSource;
    use crate::ports::transmitter::Transmitter;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tempfile::tempdir;

    const DATA: &str = "data/sample_trial_data.yaml";

    #[derive(Clone, Default)]
    struct RecordingTransmitter {
        pub sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Transmitter for RecordingTransmitter {
        async fn transmit(&self, summary: &EntitySummary) -> Result<(), TrialflowError> {
            self.sent.lock().unwrap().push(summary.id.clone());
            Ok(())
        }
    }

    struct BrokenTransmitter;

    #[async_trait]
    impl Transmitter for BrokenTransmitter {
        async fn transmit(&self, _summary: &EntitySummary) -> Result<(), TrialflowError> {
            Err(TrialflowError::InternalError("connection refused".into()))
        }
    }

    fn project(extra: &str) -> ProjectConfig {
        serde_yaml::from_str(&format!(
            r#"
name: clinical_demo
entities:
  TrialA:
    kind: TrialA
    data_source_ref: {DATA}
    endpoints: [endpointA]
  TrialB:
    kind: TrialB
    data_source_ref: {DATA}
    cohorts: [CohortX, CohortY]
    endpoints: [endpointA, audit]
{extra}
"#
        ))
        .unwrap()
    }

    fn data() -> InMemoryDataSource {
        InMemoryDataSource::new()
            .with(
                DATA,
                "TrialA",
                json!({
                    "name": "Trial A",
                    "cohorts": { "Arm1": { "dose": 5, "patient_count": 3, "d": [1, 2] } }
                }),
            )
            .with(
                DATA,
                "TrialB",
                json!({
                    "name": "Trial B",
                    "cohorts": {
                        "CohortX": { "dose": "low-dose", "patient_count": 10, "d": [{ "patient": "P-001" }] },
                        "CohortY": { "dose": "high-dose", "patient_count": 15 }
                    },
                    "schedule": [{ "label": "enrollment", "start": 0 }]
                }),
            )
    }

    #[tokio::test]
    async fn test_run_imports_every_valid_entity() {
        let dir = tempdir().unwrap();
        let recorder = RecordingTransmitter::default();
        let audit = RecordingTransmitter::default();
        let transmitters = TransmitterSet::new()
            .with("endpointA", Arc::new(recorder.clone()))
            .with("audit", Arc::new(audit.clone()));

        let result = run_import(
            dir.path(),
            &project(""),
            &EntityRegistry::with_builtin_kinds(),
            &data(),
            &transmitters,
            &RunOptions::default(),
        )
        .await
        .unwrap();

        assert!(result.success, "errors: {:?}", result.errors);
        assert_eq!(result.entities_loaded, 2);
        assert_eq!(result.jobs_succeeded, 3);

        let mut sent = recorder.sent.lock().unwrap().clone();
        sent.sort();
        assert_eq!(sent, vec!["TrialA", "TrialB"]);
        assert_eq!(audit.sent.lock().unwrap().as_slice(), ["TrialB"]);

        let trial_b = &result.entities[1];
        assert_eq!(trial_b.issues.len(), 1);
        let endpoints: Vec<&str> = trial_b.jobs.iter().map(|j| j.endpoint.as_str()).collect();
        assert_eq!(endpoints, vec!["audit", "endpointA"]);

        assert!(dir.path().join("target/run_results.json").exists());
    }

    #[tokio::test]
    async fn test_failures_are_recorded_and_run_continues() {
        let dir = tempdir().unwrap();
        let extra = format!(
            "  TrialZ:\n    kind: unregistered_kind\n    data_source_ref: {DATA}\n    endpoints: [endpointA]\n"
        );
        let transmitters = TransmitterSet::new()
            .with("endpointA", Arc::new(RecordingTransmitter::default()))
            .with("audit", Arc::new(BrokenTransmitter));

        let result = run_import(
            dir.path(),
            &project(&extra),
            &EntityRegistry::with_builtin_kinds(),
            &data(),
            &transmitters,
            &RunOptions::default(),
        )
        .await
        .unwrap();

        assert!(!result.success);
        assert_eq!(result.entities_loaded, 2);
        assert_eq!(result.jobs_succeeded, 2);
        assert_eq!(result.jobs_failed, 1);
        assert!(result.errors.iter().any(|e| e.contains("unregistered_kind")));
        assert!(result.errors.iter().any(|e| e.contains("connection refused")));

        let trial_z = result.entities.iter().find(|e| e.id == "TrialZ").unwrap();
        assert!(!trial_z.loaded);
        assert!(trial_z.jobs.is_empty());
    }

    #[tokio::test]
    async fn test_strict_policy_refuses_entities_with_warnings() {
        let dir = tempdir().unwrap();
        let transmitters = TransmitterSet::new()
            .with("endpointA", Arc::new(RecordingTransmitter::default()))
            .with("audit", Arc::new(RecordingTransmitter::default()));
        let options = RunOptions {
            policy: GatePolicy::Strict,
            ..RunOptions::default()
        };

        let result = run_import(
            dir.path(),
            &project(""),
            &EntityRegistry::with_builtin_kinds(),
            &data(),
            &transmitters,
            &options,
        )
        .await
        .unwrap();

        assert!(!result.success);
        assert_eq!(result.jobs_succeeded, 1);
        let trial_b = result.entities.iter().find(|e| e.id == "TrialB").unwrap();
        assert!(
            trial_b
                .jobs
                .iter()
                .all(|j| matches!(j.status, JobStatus::Failed { .. }))
        );
    }

    #[tokio::test]
    async fn test_select_unknown_entity_aborts() {
        let dir = tempdir().unwrap();
        let options = RunOptions {
            select: Some("TrialQ".into()),
            ..RunOptions::default()
        };

        let res = run_import(
            dir.path(),
            &project(""),
            &EntityRegistry::with_builtin_kinds(),
            &data(),
            &TransmitterSet::new(),
            &options,
        )
        .await;

        assert!(matches!(
            res,
            Err(TrialflowError::Domain(DomainError::EntityNotFound(_)))
        ));
    }

    #[test]
    fn test_options_from_config() {
        let mut config = project("");
        config.strict = true;
        config.as_of = Some("2024-01-01".parse().unwrap());

        let options = RunOptions::from_config(&config).unwrap();
        assert_eq!(options.policy, GatePolicy::Strict);
        assert_eq!(options.as_of, Some(1_704_067_200));
        assert_eq!(options.concurrency, DEFAULT_CONCURRENCY);
    }
}
