//! `autotune summary` — print a markdown summary of the settings.

use autotune_config::AppConfig;
use autotune_settings::{SettingsSynthesizer, export_summary};

use super::{CommandResult, generated_at, load_catalog, load_snapshot};
use crate::SnapshotArgs;

pub fn run(config: &AppConfig, args: &SnapshotArgs) -> CommandResult {
    let snapshot = load_snapshot(args)?;
    let catalog = load_catalog(config)?;
    let synthesized =
        SettingsSynthesizer::new(&catalog.settings, &config.thresholds).synthesize(&snapshot);
    println!("{}", export_summary(&synthesized, generated_at(config)));
    Ok(())
}
