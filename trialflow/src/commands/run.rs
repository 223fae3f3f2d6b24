// trialflow/src/commands/run.rs
//
// USE CASE: Run the import pipeline.

use std::path::PathBuf;

use anyhow::Context;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use tracing::debug;
use trialflow_core::application::{GatePolicy, JobStatus, RunOptions, run_import};
use trialflow_core::domain::registry::EntityRegistry;
use trialflow_core::infrastructure::adapters::build_transmitters;
use trialflow_core::infrastructure::config::project::load_project_config;
use trialflow_core::infrastructure::data::YamlDataStore;

pub async fn execute(
    project_dir: PathBuf,
    select: Option<String>,
    as_of: Option<i64>,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    println!("⚙️  Loading configuration...");
    let config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    println!("   Project: {} (v{})", config.name, config.version);

    // B. Wire the adapters
    let registry = EntityRegistry::with_builtin_kinds();
    let data_source = YamlDataStore::new(&project_dir);
    let transmitters = build_transmitters(&project_dir, &config);
    println!("   Endpoints: [{}]", transmitters.endpoints().join(", "));

    let mut options = RunOptions::from_config(&config)?;
    options.select = select;
    if as_of.is_some() {
        options.as_of = as_of;
    }
    match options.policy {
        GatePolicy::Strict => println!("    🔒 Strict Mode: ON (warnings block imports)"),
        GatePolicy::Standard => println!("    🔓 Strict Mode: OFF"),
    }
    debug!(?options, "Run options resolved");

    // C. Run the Pipeline (Application Layer)
    let result = run_import(
        &project_dir,
        &config,
        &registry,
        &data_source,
        &transmitters,
        &options,
    )
    .await;

    match result {
        Ok(run_res) => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["Entity", "Kind", "Issues", "Jobs"]);
            for entity in &run_res.entities {
                let jobs: Vec<String> = entity
                    .jobs
                    .iter()
                    .map(|j| match &j.status {
                        JobStatus::Succeeded => format!("{} ✅", j.endpoint),
                        JobStatus::Failed { .. } => format!("{} ❌", j.endpoint),
                        other => format!("{} ({:?})", j.endpoint, other),
                    })
                    .collect();
                let issues = match &entity.error {
                    Some(e) => e.clone(),
                    None => entity.issues.len().to_string(),
                };
                table.add_row(vec![
                    entity.id.clone(),
                    entity.kind.clone(),
                    issues,
                    jobs.join(", "),
                ]);
            }
            println!("{table}");

            if run_res.success {
                println!(
                    "\n✨ SUCCESS! {} job(s) finished in {:.2?}",
                    run_res.jobs_succeeded,
                    start.elapsed()
                );
            } else {
                eprintln!("\n❌ FAILURE. {} error(s):", run_res.errors.len());
                for e in &run_res.errors {
                    eprintln!("   - {}", e);
                }
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("\n💥 CRITICAL PIPELINE ERROR: {:?}", miette::Report::new(e));
            std::process::exit(1);
        }
    }

    Ok(())
}
