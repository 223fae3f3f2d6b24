// trialflow-core/src/application/inspection.rs

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::model::Entity;
use crate::domain::ports::DataSource;
use crate::domain::project::{EntityConfig, ProjectConfig};
use crate::domain::registry::EntityRegistry;
use crate::domain::validation::{self, ValidationError};

/// Result of loading and validating one configured entity.
#[derive(Debug)]
pub struct EntityReport {
    pub id: String,
    pub config: EntityConfig,
    /// The validated entity, or why it could not be built.
    pub outcome: Result<Entity, DomainError>,
    /// Validation issues of the entity (empty when it was not built).
    pub issues: Vec<ValidationError>,
}

impl EntityReport {
    pub fn entity(&self) -> Option<&Entity> {
        self.outcome.as_ref().ok()
    }

    pub fn has_critical(&self) -> bool {
        self.outcome.is_err() || validation::has_critical(&self.issues)
    }
}

/// Loads and validates the configured entities in id order.
///
/// `select` restricts the run to one entity id; an id that is not
/// configured fails with `EntityNotFound`. Failures of individual entities
/// (unknown kind, bad schedule, unreadable data) are kept in their report
/// and never stop the others.
#[instrument(skip_all, fields(project = %config.name))]
pub fn inspect_entities(
    config: &ProjectConfig,
    registry: &EntityRegistry,
    data_source: &dyn DataSource,
    select: Option<&str>,
) -> Result<Vec<EntityReport>, DomainError> {
    if let Some(id) = select
        && !config.entities.contains_key(id)
    {
        return Err(DomainError::EntityNotFound(id.to_string()));
    }

    let reports: Vec<EntityReport> = config
        .entities
        .iter()
        .filter(|(id, _)| select.is_none_or(|s| s == id.as_str()))
        .map(|(id, entity_config)| load_entity(id, entity_config, registry, data_source))
        .collect();

    info!(count = reports.len(), "Entities inspected");
    Ok(reports)
}

fn load_entity(
    id: &str,
    config: &EntityConfig,
    registry: &EntityRegistry,
    data_source: &dyn DataSource,
) -> EntityReport {
    let outcome = data_source
        .fetch(&config.data_source_ref, id)
        .map(|raw| {
            raw.unwrap_or_else(|| {
                warn!(entity = %id, source = %config.data_source_ref, "No raw data, loading an empty record");
                Value::Null
            })
        })
        .and_then(|raw| registry.create(&config.kind, id, &raw, config));

    match outcome {
        Ok(mut entity) => {
            let issues = entity.validate();
            debug!(entity = %id, issues = issues.len(), "Entity validated");
            EntityReport {
                id: id.to_string(),
                config: config.clone(),
                outcome: Ok(entity),
                issues,
            }
        }
        Err(e) => {
            warn!(entity = %id, error = %e, "Entity could not be built");
            EntityReport {
                id: id.to_string(),
                config: config.clone(),
                outcome: Err(e),
                issues: Vec::new(),
            }
        }
    }
}
