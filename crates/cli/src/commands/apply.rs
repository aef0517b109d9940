//! `autotune apply` — write the rules file, workflows and editor settings.
//!
//! Existing files are read first: custom lines in the rules file survive,
//! and only assistant and editor keys in the settings document change. A
//! settings document that cannot be parsed is left as it is and reported.

use autotune_catalog::Catalog;
use autotune_config::AppConfig;
use autotune_core::{Snapshot, Warning};
use autotune_rules::{decode_existing, generate_rules};
use autotune_settings::{SettingsDocument, SettingsSynthesizer};
use autotune_workflow::WorkflowOptimizer;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use super::{CommandResult, generated_at, load_catalog, load_snapshot, report_warnings};
use crate::SnapshotArgs;

#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub workspace: PathBuf,
    pub settings_file: Option<PathBuf>,
    pub dry_run: bool,
}

#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Files written (or that would be written on a dry run).
    pub written: Vec<PathBuf>,
    /// Settings entries whose value changed.
    pub settings_changed: usize,
    /// Set when the settings document could not be parsed and was not written.
    pub settings_skipped: Option<PathBuf>,
    pub warnings: Vec<Warning>,
}

pub fn run(config: &AppConfig, args: &SnapshotArgs, options: &ApplyOptions) -> CommandResult {
    let snapshot = load_snapshot(args)?;
    let catalog = load_catalog(config)?;
    let report = apply(config, &catalog, &snapshot, options, generated_at(config))?;

    report_warnings(&report.warnings);
    let verb = if options.dry_run {
        "Would write"
    } else {
        "Wrote"
    };
    for path in &report.written {
        println!("  ✅ {verb} {}", path.display());
    }
    match &report.settings_skipped {
        Some(path) => println!("  ⏭️  Left unreadable settings at {} unchanged", path.display()),
        None => println!("  {} settings entries changed", report.settings_changed),
    }
    Ok(())
}

/// Generate everything for `snapshot` and persist it under the workspace
/// and into the editor settings document.
pub fn apply(
    config: &AppConfig,
    catalog: &Catalog,
    snapshot: &Snapshot,
    options: &ApplyOptions,
    generated_at: DateTime<Utc>,
) -> Result<ApplyReport, Box<dyn std::error::Error>> {
    let mut report = ApplyReport::default();

    // Rules
    let rules_path = options.workspace.join(&config.paths.rules_file);
    let existing_rules = read_optional(&rules_path)?;
    let existing_text = match existing_rules.as_deref().map(decode_existing) {
        Some(Ok(text)) => Some(text),
        // Unreadable rules on disk mean no prior customizations at all.
        Some(Err(warning)) => {
            report.warnings.push(warning);
            Some("")
        }
        None => None,
    };
    let rules = generate_rules(&catalog.rules, snapshot, existing_text, generated_at);
    write_file(&rules_path, &rules, options.dry_run, &mut report)?;

    // Workflows
    let workflows_dir = options.workspace.join(&config.paths.workflows_dir);
    for file in WorkflowOptimizer::new(&catalog.workflows).optimize(snapshot, generated_at) {
        let path = workflows_dir.join(format!("{}.md", file.name));
        write_file(&path, &file.content, options.dry_run, &mut report)?;
    }

    // Settings
    let settings_path = options
        .settings_file
        .clone()
        .unwrap_or_else(|| config.settings_path());
    let document = match read_optional(&settings_path)? {
        Some(bytes) => SettingsDocument::from_bytes(&bytes),
        None => Ok(SettingsDocument::new()),
    };
    match document {
        Ok(mut document) => {
            let prefix = &config.output.settings_prefix;
            let synthesized = SettingsSynthesizer::new(&catalog.settings, &config.thresholds)
                .synthesize_over(snapshot, &document, prefix);
            report.settings_changed = document.apply(synthesized.settings_entries(prefix));
            write_file(
                &settings_path,
                &document.to_string_pretty()?,
                options.dry_run,
                &mut report,
            )?;
        }
        Err(warning) => {
            tracing::warn!(
                path = %settings_path.display(),
                %warning,
                "Settings document left unchanged"
            );
            report.warnings.push(warning);
            report.settings_skipped = Some(settings_path);
        }
    }

    tracing::info!(
        files = report.written.len(),
        settings_changed = report.settings_changed,
        dry_run = options.dry_run,
        "Apply finished"
    );
    Ok(report)
}

fn read_optional(path: &Path) -> std::io::Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn write_file(
    path: &Path,
    content: &str,
    dry_run: bool,
    report: &mut ApplyReport,
) -> std::io::Result<()> {
    if !dry_run {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "File written");
    }
    report.written.push(path.to_path_buf());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn setup() -> (tempfile::TempDir, AppConfig, ApplyOptions) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.paths.settings_file = Some(dir.path().join("settings.json"));
        let options = ApplyOptions {
            workspace: dir.path().join("project"),
            settings_file: None,
            dry_run: false,
        };
        (dir, config, options)
    }

    fn python_snapshot() -> Snapshot {
        Snapshot::from_json(
            r#"{"project_structure": {"languages": ["python"], "project_type": "python", "total_files": 12}}"#,
            None,
        )
        .unwrap()
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn writes_rules_workflows_and_settings() {
        let (dir, config, options) = setup();
        let report = apply(
            &config,
            &Catalog::builtin(),
            &python_snapshot(),
            &options,
            at(),
        )
        .unwrap();

        let rules = std::fs::read_to_string(options.workspace.join(".clinerules")).unwrap();
        assert!(rules.starts_with("# Cline rules for the project"));
        assert!(
            options
                .workspace
                .join(".cline/workflows/python_setup.md")
                .exists()
        );

        let settings: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("settings.json")).unwrap(),
        )
        .unwrap();
        assert!(settings.get("cline.requestLimit").is_some());
        assert_eq!(settings["editor.tabSize"], 4);
        assert!(report.settings_changed > 0);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn unrelated_settings_and_user_values_survive() {
        let (dir, config, options) = setup();
        let settings_path = dir.path().join("settings.json");
        std::fs::write(
            &settings_path,
            r#"{"workbench.colorTheme": "Solarized", "cline.customInstructions": "Be brief"}"#,
        )
        .unwrap();

        apply(
            &config,
            &Catalog::builtin(),
            &python_snapshot(),
            &options,
            at(),
        )
        .unwrap();

        let settings: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&settings_path).unwrap()).unwrap();
        assert_eq!(settings["workbench.colorTheme"], "Solarized");
        assert_eq!(settings["cline.customInstructions"], "Be brief");
    }

    #[test]
    fn commented_settings_keep_every_key() {
        let (dir, config, options) = setup();
        let settings_path = dir.path().join("settings.json");
        std::fs::write(
            &settings_path,
            "{ // my theme\n \"workbench.colorTheme\": \"Solarized\", \"editor.fontSize\": 15 }",
        )
        .unwrap();

        let report = apply(
            &config,
            &Catalog::builtin(),
            &python_snapshot(),
            &options,
            at(),
        )
        .unwrap();

        assert!(report.warnings.is_empty());
        let settings: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&settings_path).unwrap()).unwrap();
        assert_eq!(settings["workbench.colorTheme"], "Solarized");
        assert_eq!(settings["editor.fontSize"], 15);
        assert!(settings.get("cline.contextWindow").is_some());
    }

    #[test]
    fn unparseable_settings_are_left_untouched() {
        let (dir, config, options) = setup();
        let settings_path = dir.path().join("settings.json");
        std::fs::write(&settings_path, "{ not json").unwrap();

        let report = apply(
            &config,
            &Catalog::builtin(),
            &python_snapshot(),
            &options,
            at(),
        )
        .unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.settings_skipped.as_deref(), Some(settings_path.as_path()));
        assert_eq!(report.settings_changed, 0);
        assert_eq!(std::fs::read_to_string(&settings_path).unwrap(), "{ not json");
        assert!(!report.written.contains(&settings_path));
        // Rules and workflows are still written.
        assert!(options.workspace.join(".clinerules").exists());
    }

    #[test]
    fn non_utf8_settings_are_reported_not_rewritten() {
        let (dir, config, options) = setup();
        let settings_path = dir.path().join("settings.json");
        let bytes = b"{\"cline.customInstructions\": \"caf\xe9\"}";
        std::fs::write(&settings_path, bytes).unwrap();

        let report = apply(
            &config,
            &Catalog::builtin(),
            &python_snapshot(),
            &options,
            at(),
        )
        .unwrap();

        assert!(matches!(
            report.warnings.as_slice(),
            [Warning::MalformedSettings { .. }]
        ));
        assert_eq!(std::fs::read(&settings_path).unwrap(), bytes);
    }

    #[test]
    fn unreadable_rules_drop_snapshot_custom_lines() {
        let (_dir, config, options) = setup();
        std::fs::create_dir_all(&options.workspace).unwrap();
        std::fs::write(options.workspace.join(".clinerules"), [0x2d, 0x20, 0xff]).unwrap();
        let snapshot = Snapshot::from_json(
            r#"{"current_rules": {"exists": true, "content": "- Pair on schema changes"}}"#,
            None,
        )
        .unwrap();

        let report = apply(&config, &Catalog::builtin(), &snapshot, &options, at()).unwrap();

        assert!(matches!(
            report.warnings.as_slice(),
            [Warning::MalformedRules { .. }]
        ));
        let rules = std::fs::read_to_string(options.workspace.join(".clinerules")).unwrap();
        assert!(!rules.contains("Pair on schema changes"));
    }

    #[test]
    fn custom_rules_survive_reapply() {
        let (_dir, config, options) = setup();
        std::fs::create_dir_all(&options.workspace).unwrap();
        std::fs::write(
            options.workspace.join(".clinerules"),
            "- Keep migrations reversible\n",
        )
        .unwrap();

        let catalog = Catalog::builtin();
        apply(&config, &catalog, &python_snapshot(), &options, at()).unwrap();
        apply(&config, &catalog, &python_snapshot(), &options, at()).unwrap();

        let rules = std::fs::read_to_string(options.workspace.join(".clinerules")).unwrap();
        assert_eq!(rules.matches("Keep migrations reversible").count(), 1);
    }

    #[test]
    fn dry_run_touches_nothing() {
        let (dir, config, mut options) = setup();
        options.dry_run = true;
        let report = apply(
            &config,
            &Catalog::builtin(),
            &python_snapshot(),
            &options,
            at(),
        )
        .unwrap();

        assert!(!report.written.is_empty());
        assert!(!options.workspace.exists());
        assert!(!dir.path().join("settings.json").exists());
    }
}
