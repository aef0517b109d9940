//! `autotune rules` — print the rules file.

use autotune_config::AppConfig;
use autotune_rules::{decode_existing, generate_rules};
use std::path::Path;

use super::{CommandResult, generated_at, load_catalog, load_snapshot, report_warnings};
use crate::SnapshotArgs;

pub fn run(config: &AppConfig, args: &SnapshotArgs, existing: Option<&Path>) -> CommandResult {
    let snapshot = load_snapshot(args)?;
    let catalog = load_catalog(config)?;

    let bytes = existing
        .map(|path| {
            std::fs::read(path)
                .map_err(|e| format!("Failed to read rules at {}: {e}", path.display()))
        })
        .transpose()?;
    let existing_text = match bytes.as_deref().map(decode_existing) {
        Some(Ok(text)) => Some(text),
        Some(Err(warning)) => {
            report_warnings(&[warning]);
            Some("")
        }
        None => None,
    };

    let text = generate_rules(
        &catalog.rules,
        &snapshot,
        existing_text,
        generated_at(config),
    );
    println!("{text}");
    Ok(())
}
