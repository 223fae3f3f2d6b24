// trialflow-core/src/domain/registry.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::error::DomainError;
use crate::domain::model::{Entity, FieldMapping, RawRecord};
use crate::domain::project::EntityConfig;
use crate::domain::validation::{self, ValidationError};

/// Extra validation a kind runs after the kind-agnostic checks.
pub type KindCheck = fn(&Entity) -> Vec<ValidationError>;

/// Builds an empty entity of one kind for the given record id.
pub type EntityBuilder = Arc<dyn Fn(&str) -> Entity + Send + Sync>;

/// Everything that distinguishes one kind from another: the raw field names
/// it reads and the extra checks it runs.
#[derive(Debug, Clone)]
pub struct KindProfile {
    pub kind: String,
    pub description: String,
    pub fields: FieldMapping,
    pub checks: Vec<KindCheck>,
}

impl KindProfile {
    pub fn new(kind: impl Into<String>, fields: FieldMapping) -> Self {
        Self {
            kind: kind.into(),
            description: String::new(),
            fields,
            checks: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_check(mut self, check: KindCheck) -> Self {
        self.checks.push(check);
        self
    }
}

/// Maps the `kind` declared in configuration to the builder of that kind.
///
/// One registry is built per run and handed to the pipeline, so several
/// runs with different domains can coexist in one process.
#[derive(Clone, Default)]
pub struct EntityRegistry {
    builders: BTreeMap<String, EntityBuilder>,
    profiles: BTreeMap<String, Arc<KindProfile>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the clinical trial kinds and the `League`
    /// sports kind.
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();

        for kind in ["TrialA", "TrialB"] {
            registry.register_profile(
                KindProfile::new(kind, FieldMapping::clinical())
                    .with_description("Clinical trial with dose cohorts"),
            );
        }
        registry.register_profile(
            KindProfile::new("TrialC", FieldMapping::clinical())
                .with_description("Ongoing clinical trial (open-ended schedule)")
                .with_check(validation::check_ongoing_schedule),
        );
        registry.register_profile(
            KindProfile::new("League", FieldMapping::sports())
                .with_description("Sports league with division squads"),
        );

        registry
    }

    /// Associates `kind` with an arbitrary builder. A later registration for
    /// the same kind replaces the earlier one.
    pub fn register<F>(&mut self, kind: impl Into<String>, builder: F)
    where
        F: Fn(&str) -> Entity + Send + Sync + 'static,
    {
        let kind = kind.into();
        self.profiles.remove(&kind);
        self.builders.insert(kind, Arc::new(builder));
    }

    /// Registers a kind fully described by its profile.
    pub fn register_profile(&mut self, profile: KindProfile) {
        let kind = profile.kind.clone();
        let profile = Arc::new(profile);
        let shared = Arc::clone(&profile);
        self.builders.insert(
            kind.clone(),
            Arc::new(move |id: &str| Entity::new(id, Arc::clone(&shared))),
        );
        self.profiles.insert(kind, profile);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        self.builders.keys().map(String::as_str).collect()
    }

    /// Profile of a kind registered through [`EntityRegistry::register_profile`].
    pub fn profile(&self, kind: &str) -> Option<&KindProfile> {
        self.profiles.get(kind).map(Arc::as_ref)
    }

    /// Builds and loads the entity `id` of kind `kind`.
    ///
    /// Fails with `UnknownKind` before anything is built when the kind has no
    /// builder, with `KindMismatch` when the builder produces an entity of
    /// another kind, and with `Schedule` when the raw schedule is malformed.
    /// No partially built entity is ever returned.
    pub fn create(
        &self,
        kind: &str,
        id: &str,
        raw: &RawRecord,
        config: &EntityConfig,
    ) -> Result<Entity, DomainError> {
        let builder = self
            .builders
            .get(kind)
            .ok_or_else(|| DomainError::UnknownKind {
                kind: kind.to_string(),
                record: id.to_string(),
            })?;

        let mut entity = builder(id);
        if entity.kind() != kind {
            return Err(DomainError::KindMismatch {
                requested: kind.to_string(),
                built: entity.kind().to_string(),
                record: id.to_string(),
            });
        }
        entity.load(raw, config)?;
        Ok(entity)
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn league_raw() -> RawRecord {
        json!({
            "name": "Northern League",
            "squads": {
                "U18": { "division": "junior", "roster_size": 22, "players": ["a", "b"] },
                "Seniors": { "division": "senior", "roster_size": 25, "players": [] }
            },
            "season": [
                { "label": "preseason", "start": "2024-07-01", "end": "2024-08-15" },
                { "label": "regular", "start": "2024-08-15" }
            ]
        })
    }

    #[test]
    fn test_builtin_kinds() {
        let registry = EntityRegistry::with_builtin_kinds();
        assert_eq!(registry.kinds(), vec!["League", "TrialA", "TrialB", "TrialC"]);
        assert_eq!(
            registry.profile("TrialB").unwrap().fields,
            FieldMapping::clinical()
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let registry = EntityRegistry::with_builtin_kinds();
        let config = EntityConfig::new("unregistered_kind", "data.yaml");

        let res = registry.create("unregistered_kind", "TrialZ", &json!({}), &config);
        match res {
            Err(DomainError::UnknownKind { kind, record }) => {
                assert_eq!(kind, "unregistered_kind");
                assert_eq!(record, "TrialZ");
            }
            other => panic!("expected UnknownKind, got {:?}", other),
        }
    }

    #[test]
    fn test_sports_kind_uses_its_own_field_names() {
        let registry = EntityRegistry::with_builtin_kinds();
        let config = EntityConfig::new("League", "data/leagues.yaml");

        let mut league = registry
            .create("League", "north", &league_raw(), &config)
            .unwrap();

        assert_eq!(league.kind(), "League");
        assert_eq!(league.subsets().len(), 2);
        assert_eq!(league.cohort("U18").unwrap().category(), Some("junior"));
        assert_eq!(league.schedule().unwrap().len(), 2);
        assert!(league.validate().is_empty());
    }

    #[test]
    fn test_trial_c_requires_open_schedule() {
        let registry = EntityRegistry::with_builtin_kinds();
        let config = EntityConfig::new("TrialC", "data.yaml");
        let raw = json!({
            "name": "Trial C",
            "cohorts": { "Arm1": { "dose": 5, "patient_count": 4, "d": [] } },
            "schedule": { "dosing": { "start": 0, "end": 30 } }
        });

        let mut entity = registry.create("TrialC", "TrialC", &raw, &config).unwrap();
        let errors = entity.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "schedule");
        assert!(!errors[0].is_critical());
    }

    #[test]
    fn test_register_custom_builder() {
        let mut registry = EntityRegistry::new();
        let profile = Arc::new(KindProfile::new("Store", FieldMapping {
            subsets: "segments".into(),
            category: "tier".into(),
            population: "customers".into(),
            details: "orders".into(),
            ..FieldMapping::clinical()
        }));
        registry.register("Store", move |id| Entity::new(id, Arc::clone(&profile)));

        assert!(registry.contains("Store"));
        assert!(registry.profile("Store").is_none());

        let raw = json!({
            "name": "Downtown",
            "segments": [{ "label": "gold", "tier": "A", "customers": 40, "orders": [1, 2, 3] }]
        });
        let config = EntityConfig::new("Store", "stores.yaml");
        let store = registry.create("Store", "downtown", &raw, &config).unwrap();
        assert_eq!(store.cohort("gold").unwrap().total_detail_count(), 3);
    }

    #[test]
    fn test_builder_of_another_kind_is_rejected() {
        let mut registry = EntityRegistry::new();
        let trial_profile = Arc::new(KindProfile::new("TrialB", FieldMapping::clinical()));
        registry.register("Retail", move |id| Entity::new(id, Arc::clone(&trial_profile)));

        let config = EntityConfig::new("Retail", "shops.yaml");
        let raw = json!({ "name": "Shop", "cohorts": { "A": { "dose": 1, "patient_count": 1, "d": [] } } });

        match registry.create("Retail", "shop", &raw, &config) {
            Err(DomainError::KindMismatch {
                requested,
                built,
                record,
            }) => {
                assert_eq!(requested, "Retail");
                assert_eq!(built, "TrialB");
                assert_eq!(record, "shop");
            }
            other => panic!("expected KindMismatch, got {:?}", other.map(|e| e.kind().to_string())),
        }
    }
}
