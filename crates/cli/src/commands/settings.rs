//! `autotune settings` — print synthesized settings.

use autotune_config::AppConfig;
use autotune_settings::{SettingsDocument, SettingsSynthesizer};
use std::path::Path;

use super::{CommandResult, load_catalog, load_snapshot, report_warnings, to_json};
use crate::SnapshotArgs;

pub fn run(config: &AppConfig, args: &SnapshotArgs, existing: Option<&Path>) -> CommandResult {
    let snapshot = load_snapshot(args)?;
    let catalog = load_catalog(config)?;
    let synthesizer = SettingsSynthesizer::new(&catalog.settings, &config.thresholds);

    let prefix = &config.output.settings_prefix;
    let synthesized = match existing {
        Some(path) => {
            let bytes = std::fs::read(path)
                .map_err(|e| format!("Failed to read settings at {}: {e}", path.display()))?;
            match SettingsDocument::from_bytes(&bytes) {
                Ok(document) => synthesizer.synthesize_over(&snapshot, &document, prefix),
                Err(warning) => {
                    let mut synthesized =
                        synthesizer.synthesize_over(&snapshot, &SettingsDocument::new(), prefix);
                    synthesized.warnings.push(warning);
                    synthesized
                }
            }
        }
        None => synthesizer.synthesize(&snapshot),
    };

    report_warnings(&synthesized.warnings);
    println!("{}", to_json(&synthesized)?);
    Ok(())
}
