// trialflow/src/commands/validate.rs
//
// USE CASE: Load and validate entities, no import.

use std::path::PathBuf;

use anyhow::Context;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use trialflow_core::application::inspect_entities;
use trialflow_core::domain::registry::EntityRegistry;
use trialflow_core::infrastructure::config::project::load_project_config;
use trialflow_core::infrastructure::data::YamlDataStore;

pub fn execute(project_dir: PathBuf, select: Option<String>) -> anyhow::Result<()> {
    println!("✅ Validating entities...");

    let config = load_project_config(&project_dir)
        .with_context(|| format!("Failed to load project configuration from {:?}", project_dir))?;
    let registry = EntityRegistry::with_builtin_kinds();
    let data_source = YamlDataStore::new(&project_dir);

    let reports = inspect_entities(&config, &registry, &data_source, select.as_deref())?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Entity", "Severity", "Cohort", "Field", "Message"]);

    let mut failed = 0;
    for report in &reports {
        if let Err(e) = &report.outcome {
            table.add_row(vec![
                report.id.clone(),
                "error".to_string(),
                String::new(),
                String::new(),
                e.to_string(),
            ]);
        }
        for issue in &report.issues {
            table.add_row(vec![
                report.id.clone(),
                issue.severity.to_string(),
                issue.scope.clone().unwrap_or_default(),
                issue.field.clone(),
                issue.message.clone(),
            ]);
        }
        if report.has_critical() {
            failed += 1;
        }
    }

    if table.row_count() > 0 {
        println!("{table}");
    }
    println!(
        "\n📊 {} entities checked, {} blocked by critical issues.",
        reports.len(),
        failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
