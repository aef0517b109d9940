//! `autotune workflows` — print the selected workflows.

use autotune_config::AppConfig;
use autotune_workflow::WorkflowOptimizer;

use super::{CommandResult, generated_at, load_catalog, load_snapshot};
use crate::SnapshotArgs;

pub fn run(config: &AppConfig, args: &SnapshotArgs, names_only: bool) -> CommandResult {
    let snapshot = load_snapshot(args)?;
    let catalog = load_catalog(config)?;
    let set = WorkflowOptimizer::new(&catalog.workflows).optimize(&snapshot, generated_at(config));

    if names_only {
        for file in set.iter() {
            println!("{}", file.name);
        }
        return Ok(());
    }

    println!("Workflows ({}):\n", set.len());
    for file in set.iter() {
        println!("=== {}.md ({}) ===", file.name, file.origin.as_str());
        println!("{}\n", file.content);
    }
    Ok(())
}
