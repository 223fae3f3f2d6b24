// trialflow-core/src/infrastructure/config/project.rs

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::project::{EndpointConfig, EntityConfig, ProjectConfig};
use crate::infrastructure::error::InfrastructureError;

const MAIN_CONFIG_CANDIDATES: [&str; 2] = ["trialflow_project_conf.yaml", "trialflow.yaml"];

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Main file
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");
    let mut config: ProjectConfig = load_fragment(&config_path)?;

    // 2. Satellites (ingestion mapping, endpoint profiles)
    if let Some(config_folder) = config.config_paths.first() {
        let config_dir = project_dir.join(config_folder);
        if config_dir.exists() {
            load_satellite_configs(&mut config, &config_dir)?;
        } else {
            warn!(dir = ?config_dir, "Config directory not found, using inline configuration only");
        }
    }

    // 3. Environment layering, e.g. TRIALFLOW_STRICT=1 trialflow run
    apply_env_overrides(&mut config);

    // 4. Structural checks
    check_config(&config)?;

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in MAIN_CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, MAIN_CONFIG_CANDIDATES
    )))
}

/// Loads a typed configuration fragment from a YAML file.
fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| {
        InfrastructureError::ConfigError(format!("Failed to parse {:?}: {}", path, e))
    })
}

fn find_satellite(config_dir: &Path, stem: &str) -> Option<PathBuf> {
    ["yml", "yaml"]
        .iter()
        .map(|ext| config_dir.join(format!("{}.{}", stem, ext)))
        .find(|p| p.exists())
}

fn load_satellite_configs(
    config: &mut ProjectConfig,
    config_dir: &Path,
) -> Result<(), InfrastructureError> {
    // A. Ingestion mapping: entity id -> processing config. Overrides inline entries.
    if let Some(path) = find_satellite(config_dir, "ingestion") {
        let entities: BTreeMap<String, EntityConfig> = load_fragment(&path)?;
        info!(count = entities.len(), "Ingestion configuration loaded");
        config.entities.extend(entities);
    }

    // B. Endpoint profiles
    if let Some(path) = find_satellite(config_dir, "endpoints") {
        let endpoints: BTreeMap<String, EndpointConfig> = load_fragment(&path)?;
        info!(count = endpoints.len(), "Endpoint profiles loaded");
        config.endpoints.extend(endpoints);
    }

    Ok(())
}

fn apply_env_overrides(config: &mut ProjectConfig) {
    if let Ok(val) = std::env::var("TRIALFLOW_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    if let Ok(val) = std::env::var("TRIALFLOW_PROFILE") {
        info!(old = ?config.profile, new = ?val, "Overriding profile via ENV");
        config.profile = val;
    }
    if let Ok(val) = std::env::var("TRIALFLOW_STRICT") {
        let strict = matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        info!(strict, "Overriding strict mode via ENV");
        config.strict = strict;
    }
}

fn check_config(config: &ProjectConfig) -> Result<(), InfrastructureError> {
    config
        .validate()
        .map_err(|source| InfrastructureError::InvalidConfig {
            subject: config.name.clone(),
            source,
        })?;

    for (id, entity) in &config.entities {
        entity
            .validate()
            .map_err(|source| InfrastructureError::InvalidConfig {
                subject: id.clone(),
                source,
            })?;

        for endpoint in &entity.endpoints {
            if !config.endpoints.contains_key(endpoint) {
                warn!(entity = %id, endpoint = %endpoint, "Entity targets an undeclared endpoint");
            }
        }
    }

    for (name, endpoint) in &config.endpoints {
        if let EndpointConfig::File { path } = endpoint
            && path.trim().is_empty()
        {
            return Err(InfrastructureError::ConfigError(format!(
                "Endpoint '{}' has an empty file path",
                name
            )));
        }
    }

    Ok(())
}
