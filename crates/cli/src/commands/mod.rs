//! Subcommand implementations and the loading they share.

pub mod apply;
pub mod config_cmd;
pub mod rules;
pub mod settings;
pub mod summary;
pub mod workflows;

use autotune_catalog::Catalog;
use autotune_config::AppConfig;
use autotune_core::{Error, Snapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use crate::SnapshotArgs;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Read and parse the snapshot documents named on the command line.
pub fn load_snapshot(args: &SnapshotArgs) -> autotune_core::Result<Snapshot> {
    let config = read_file(&args.config, "config snapshot")?;
    let performance = args
        .performance
        .as_deref()
        .map(|path| read_file(path, "performance snapshot"))
        .transpose()?;
    let snapshot = Snapshot::from_json(&config, performance.as_deref())?;
    tracing::debug!(
        languages = ?snapshot.project().languages,
        frameworks = ?snapshot.project().frameworks,
        issues = snapshot.issues().len(),
        "Snapshot loaded"
    );
    Ok(snapshot)
}

/// Built-in catalog plus any extension files named in the config.
pub fn load_catalog(config: &AppConfig) -> Result<Catalog, Box<dyn std::error::Error>> {
    let catalog = Catalog::builtin().with_extensions(
        config.catalog.rules.as_deref(),
        config.catalog.workflows.as_deref(),
    )?;
    Ok(catalog)
}

/// Generation time written into rendered files.
pub fn generated_at(config: &AppConfig) -> DateTime<Utc> {
    if config.output.fixed_timestamp {
        DateTime::<Utc>::UNIX_EPOCH
    } else {
        Utc::now()
    }
}

fn read_file(path: &Path, what: &'static str) -> autotune_core::Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        what,
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty JSON for printing.
pub fn to_json<T: Serialize>(value: &T) -> autotune_core::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Report non-fatal warnings on stderr.
pub fn report_warnings<W: std::fmt::Display>(warnings: &[W]) {
    for warning in warnings {
        eprintln!("⚠️  {warning}");
    }
}
