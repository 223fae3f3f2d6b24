// trialflow/src/commands/inspect.rs
//
// USE CASE: Describe one entity (configuration, cohorts, schedule).

use std::path::PathBuf;

use anyhow::{Context, bail};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use trialflow_core::application::inspect_entities;
use trialflow_core::domain::registry::EntityRegistry;
use trialflow_core::infrastructure::config::project::load_project_config;
use trialflow_core::infrastructure::data::YamlDataStore;

use crate::cli::OutputFormat;

pub fn execute(
    project_dir: PathBuf,
    entity_id: String,
    as_of: Option<i64>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let config = load_project_config(&project_dir)
        .with_context(|| format!("Failed to load project configuration from {:?}", project_dir))?;
    let registry = EntityRegistry::with_builtin_kinds();
    let data_source = YamlDataStore::new(&project_dir);

    let as_of = as_of.or_else(|| config.as_of.as_ref().and_then(|spec| spec.resolve()));

    let reports = inspect_entities(&config, &registry, &data_source, Some(&entity_id))?;
    let Some(report) = reports.into_iter().next() else {
        bail!("Entity '{}' is not configured", entity_id);
    };
    let entity = match &report.outcome {
        Ok(entity) => entity,
        Err(e) => bail!("❌ Entity '{}' could not be built: {}", entity_id, e),
    };
    let summary = entity.summary(as_of);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\n🔍 Entity: '{}' ({})", summary.id, summary.kind);
    println!("   Name: {}", summary.name);
    println!("   Source: {}", summary.source.data_source);
    println!("   Endpoints: [{}]", report.config.endpoints.join(", "));
    println!(
        "   Population: {} across {} subset(s), {} detail record(s)",
        summary.total_population, summary.subset_count, summary.total_details
    );
    match (&summary.active_phase, summary.as_of) {
        (Some(phase), Some(t)) => println!("   Phase at {}: {}", t, phase),
        (None, Some(t)) => println!("   Phase at {}: none", t),
        _ => {}
    }
    println!(
        "   Schedule: {} phase(s){}",
        summary.phase_count,
        if summary.ongoing { ", ongoing" } else { "" }
    );

    let mut cohorts = Table::new();
    cohorts
        .load_preset(UTF8_FULL)
        .set_header(vec!["Cohort", "Category", "Population", "Details", "Exposure"]);
    for cohort in &summary.cohorts {
        cohorts.add_row(vec![
            cohort.label.clone(),
            cohort.category.clone().unwrap_or_else(|| "-".into()),
            cohort
                .population_count
                .map_or_else(|| "-".into(), |n| n.to_string()),
            cohort.detail_count.to_string(),
            cohort.exposure.map_or_else(|| "-".into(), |x| x.to_string()),
        ]);
    }
    println!("{cohorts}");

    if !report.issues.is_empty() {
        println!("\n⚠️  {} issue(s):", report.issues.len());
        for issue in &report.issues {
            println!("   {}", issue);
        }
    }

    Ok(())
}
