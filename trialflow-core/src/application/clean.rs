// trialflow-core/src/application/clean.rs

use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::TrialflowError;
use crate::infrastructure::config::project::load_project_config;

/// Removes the project's `clean-targets` and returns the ones that existed.
pub fn clean_project(project_dir: &Path) -> Result<Vec<String>, TrialflowError> {
    info!("Initializing cleanup sequence");

    let config = load_project_config(project_dir)?;

    let targets = if config.clean_targets.is_empty() {
        vec![config.target_path.clone()]
    } else {
        config.clean_targets
    };

    let mut removed = Vec::new();
    for target_rel_path in targets {
        // Path traversal guard
        if Path::new(&target_rel_path)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(TrialflowError::UnsafePath(target_rel_path));
        }
        let full_path = project_dir.join(&target_rel_path);
        if !full_path.starts_with(project_dir) {
            return Err(TrialflowError::UnsafePath(target_rel_path));
        }

        if full_path.exists() {
            if full_path.is_dir() {
                fs::remove_dir_all(&full_path)?;
            } else {
                fs::remove_file(&full_path)?;
            }
            info!(path = %target_rel_path, "Artifact removed");
            removed.push(target_rel_path);
        }
    }

    Ok(removed)
}
