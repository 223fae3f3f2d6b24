// trialflow/src/commands/kinds.rs
//
// USE CASE: List the registered entity kinds.

use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use trialflow_core::domain::registry::EntityRegistry;

pub fn execute() -> anyhow::Result<()> {
    let registry = EntityRegistry::with_builtin_kinds();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Kind",
        "Description",
        "Subsets",
        "Category",
        "Population",
        "Details",
        "Schedule",
    ]);

    for kind in registry.kinds() {
        let Some(profile) = registry.profile(kind) else {
            table.add_row(vec![kind.to_string(), "(custom builder)".to_string()]);
            continue;
        };
        let f = &profile.fields;
        table.add_row(vec![
            profile.kind.clone(),
            profile.description.clone(),
            f.subsets.clone(),
            f.category.clone(),
            f.population.clone(),
            f.details.clone(),
            f.schedule.clone(),
        ]);
    }

    println!("{table}");
    Ok(())
}
