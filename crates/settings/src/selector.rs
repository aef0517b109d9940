//! Layer selector: turns a snapshot into an ordered list of partial
//! settings trees.
//!
//! Order is fixed: defaults, project type, performance tiers, issue
//! remediation, scale, usage, then the user's own values. Later layers win.

use autotune_catalog::SettingsCatalog;
use autotune_core::snapshot::GIB;
use autotune_core::{
    ConfigTree, ConfigValue, IssueKind, Layer, ProjectCondition, Severity, Snapshot,
};
use tracing::debug;

use crate::thresholds::Thresholds;

/// Prefix the editor uses for assistant keys in its settings document.
pub const SETTINGS_PREFIX: &str = "cline.";

/// Select every applicable layer for `snapshot`, lowest precedence first.
pub fn select_layers(
    catalog: &SettingsCatalog,
    thresholds: &Thresholds,
    snapshot: &Snapshot,
) -> Vec<Layer> {
    select_layers_with_existing(
        catalog,
        thresholds,
        snapshot,
        &snapshot.config.vscode_settings.cline_settings,
    )
}

/// Like [`select_layers`], reading user values from `existing` instead of
/// the snapshot's editor settings.
pub fn select_layers_with_existing(
    catalog: &SettingsCatalog,
    thresholds: &Thresholds,
    snapshot: &Snapshot,
    existing: &ConfigTree,
) -> Vec<Layer> {
    let mut layers = vec![Layer::new("defaults", catalog.defaults.clone())];

    project_layers(catalog, snapshot, &mut layers);
    performance_layers(catalog, thresholds, snapshot, &mut layers);
    remediation_layers(catalog, snapshot, &mut layers);
    scale_layers(catalog, thresholds, snapshot, &mut layers);
    usage_layers(catalog, thresholds, snapshot, &mut layers);

    let user = user_layer(&catalog.preserved_keys, existing);
    if !user.is_empty() {
        layers.push(Layer::new("user", user));
    }

    for layer in &layers {
        debug!(layer = %layer.name, keys = layer.tree.len(), "Selected layer");
    }
    layers
}

fn project_layers(catalog: &SettingsCatalog, snapshot: &Snapshot, layers: &mut Vec<Layer>) {
    let project = snapshot.project();
    let mut applied: Vec<&str> = Vec::new();

    if let Some(primary) = project.languages.first() {
        if let Some(profile) = catalog.profile(primary) {
            layers.push(Layer::new(format!("language:{primary}"), profile.clone()));
            applied.push(primary.as_str());
        }
    }

    let project_type = project.project_type.as_str();
    if !applied.contains(&project_type) {
        if let Some(profile) = catalog.profile(project_type) {
            layers.push(Layer::new(format!("project-type:{project_type}"), profile.clone()));
            applied.push(project_type);
        }
    }

    if !applied.contains(&"web") && ProjectCondition::WebProject.holds(snapshot) {
        if let Some(profile) = catalog.profile("web") {
            layers.push(Layer::new("web", profile.clone()));
        }
    }
}

fn performance_layers(
    catalog: &SettingsCatalog,
    thresholds: &Thresholds,
    snapshot: &Snapshot,
    layers: &mut Vec<Layer>,
) {
    let Some(metrics) = snapshot.metrics() else {
        debug!("No system metrics; skipping performance tiers");
        return;
    };

    if let Some(memory) = &metrics.memory {
        let total_gib = memory.total as f64 / GIB as f64;
        if memory.percent > thresholds.memory_pressure_percent
            || total_gib < thresholds.low_memory_gib
        {
            layers.push(Layer::new("memory:low", catalog.tiers.low_memory.clone()));
        } else if total_gib > thresholds.high_memory_gib {
            layers.push(Layer::new("memory:high", catalog.tiers.high_memory.clone()));
        }
    }

    if let Some(cpu) = &metrics.cpu {
        if cpu.percent > thresholds.cpu_pressure_percent || cpu.count < thresholds.low_cpu_count {
            layers.push(Layer::new("cpu:low", catalog.tiers.low_cpu.clone()));
        } else if cpu.count > thresholds.high_cpu_count {
            layers.push(Layer::new("cpu:high", catalog.tiers.high_cpu.clone()));
        }
    }
}

/// One layer per high-severity memory or CPU issue, in report order.
/// Evaluated whether or not system metrics were sampled.
fn remediation_layers(catalog: &SettingsCatalog, snapshot: &Snapshot, layers: &mut Vec<Layer>) {
    for issue in snapshot.issues() {
        if issue.severity != Severity::High {
            continue;
        }
        match issue.kind {
            IssueKind::Memory => layers.push(Layer::new(
                "remediation:memory",
                catalog.remediation.memory.clone(),
            )),
            IssueKind::Cpu => {
                layers.push(Layer::new("remediation:cpu", catalog.remediation.cpu.clone()))
            }
            IssueKind::Disk | IssueKind::Swap | IssueKind::Other => {}
        }
    }
}

fn scale_layers(
    catalog: &SettingsCatalog,
    thresholds: &Thresholds,
    snapshot: &Snapshot,
    layers: &mut Vec<Layer>,
) {
    let project = snapshot.project();
    let (name, scale) = if project.total_files > thresholds.large_project_files {
        ("scale:large", &catalog.scale.large)
    } else if project.total_files > thresholds.medium_project_files {
        ("scale:medium", &catalog.scale.medium)
    } else {
        ("scale:small", &catalog.scale.small)
    };
    layers.push(Layer::new(name, scale.clone()));

    if project.language_count() > thresholds.polyglot_languages {
        let base_window = scale
            .get("contextWindow")
            .or_else(|| catalog.defaults.get("contextWindow"))
            .and_then(ConfigValue::as_i64)
            .unwrap_or(0);
        let polyglot = ConfigTree::new()
            .with("contextWindow", base_window + catalog.polyglot_context_bonus)
            .with("maxResponseTokens", catalog.polyglot_response_tokens);
        layers.push(Layer::new("polyglot", polyglot));
    }
}

fn usage_layers(
    catalog: &SettingsCatalog,
    thresholds: &Thresholds,
    snapshot: &Snapshot,
    layers: &mut Vec<Layer>,
) {
    let usage = &snapshot.config.usage_patterns;
    if usage.sessions_count > thresholds.experienced_sessions {
        layers.push(Layer::new("usage:experienced", catalog.usage.experienced.clone()));
    } else if usage.sessions_count < thresholds.novice_sessions {
        layers.push(Layer::new("usage:novice", catalog.usage.novice.clone()));
    }

    if usage.error_patterns.len() > thresholds.error_pattern_limit {
        layers.push(Layer::new("determinism", catalog.usage.determinism.clone()));
    }
}

/// Copy the preserved keys out of the user's existing settings. Keys may be
/// bare (`autoApprove`) or prefixed (`cline.autoApprove`); the bare form
/// wins when both are present.
pub fn user_layer(preserved_keys: &[String], existing: &ConfigTree) -> ConfigTree {
    let mut user = ConfigTree::new();
    for key in preserved_keys {
        let value = existing
            .get(key)
            .or_else(|| existing.get(&format!("{SETTINGS_PREFIX}{key}")));
        if let Some(value) = value {
            user.insert(key.as_str(), value.clone());
        }
    }
    user
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotune_core::merge_layers;
    use autotune_core::snapshot::{CpuMetrics, MemoryMetrics, SystemMetrics};
    use autotune_core::PerformanceIssue;
    use serde_json::json;

    fn names(layers: &[Layer]) -> Vec<&str> {
        layers.iter().map(|l| l.name.as_str()).collect()
    }

    fn metrics(memory_percent: f64, total_gib: u64, cpu_percent: f64, cores: u32) -> SystemMetrics {
        SystemMetrics {
            cpu: Some(CpuMetrics {
                percent: cpu_percent,
                count: cores,
            }),
            memory: Some(MemoryMetrics {
                percent: memory_percent,
                total: total_gib * GIB,
            }),
        }
    }

    fn select(snapshot: &Snapshot) -> Vec<Layer> {
        select_layers(
            &SettingsCatalog::builtin(),
            &Thresholds::default(),
            snapshot,
        )
    }

    #[test]
    fn minimal_snapshot_gets_defaults_scale_and_novice() {
        let layers = select(&Snapshot::default());
        assert_eq!(names(&layers), vec!["defaults", "scale:small", "usage:novice"]);
    }

    #[test]
    fn project_profiles_in_order() {
        let mut snapshot = Snapshot::default();
        snapshot.config.project_structure.languages = vec!["typescript".into(), "python".into()];
        snapshot.config.project_structure.project_type = "python".into();
        let layers = select(&snapshot);
        assert_eq!(
            &names(&layers)[..4],
            &["defaults", "language:typescript", "project-type:python", "web"]
        );
    }

    #[test]
    fn web_profile_not_applied_twice() {
        let mut snapshot = Snapshot::default();
        snapshot.config.project_structure.frameworks = vec!["react".into()];
        snapshot.config.project_structure.project_type = "web".into();
        let layers = select(&snapshot);
        assert_eq!(names(&layers).iter().filter(|n| n.contains("web")).count(), 1);
    }

    #[test]
    fn memory_pressure_selects_low_tier() {
        let mut snapshot = Snapshot::default();
        snapshot.performance.system_metrics = Some(metrics(85.0, 32, 10.0, 6));
        let merged = merge_layers(&select(&snapshot));
        // Small-project scale layer sits above the tier and resets the window.
        assert_eq!(
            merged.get("maxResponseTokens").and_then(ConfigValue::as_i64),
            Some(4096)
        );
        let tier_layers = select(&snapshot);
        let low = tier_layers.iter().find(|l| l.name == "memory:low").unwrap();
        assert_eq!(low.tree.get("contextWindow").and_then(ConfigValue::as_i64), Some(100000));
    }

    #[test]
    fn memory_tiers_are_exclusive_and_low_wins() {
        let mut snapshot = Snapshot::default();
        snapshot.performance.system_metrics = Some(metrics(90.0, 64, 10.0, 6));
        let layers = select(&snapshot);
        assert!(names(&layers).contains(&"memory:low"));
        assert!(!names(&layers).contains(&"memory:high"));

        snapshot.performance.system_metrics = Some(metrics(30.0, 64, 10.0, 6));
        let layers = select(&snapshot);
        assert!(names(&layers).contains(&"memory:high"));
    }

    #[test]
    fn cpu_tiers() {
        let mut snapshot = Snapshot::default();
        snapshot.performance.system_metrics = Some(metrics(30.0, 8, 10.0, 2));
        assert!(names(&select(&snapshot)).contains(&"cpu:low"));

        snapshot.performance.system_metrics = Some(metrics(30.0, 8, 10.0, 16));
        assert!(names(&select(&snapshot)).contains(&"cpu:high"));

        snapshot.performance.system_metrics = Some(metrics(30.0, 8, 10.0, 6));
        let layers = select(&snapshot);
        assert!(!names(&layers).iter().any(|n| n.starts_with("cpu:")));
    }

    #[test]
    fn no_metrics_means_no_tiers_but_remediation_still_applies() {
        let mut snapshot = Snapshot::default();
        snapshot
            .performance
            .performance_issues
            .push(PerformanceIssue::new(IssueKind::Memory, Severity::High));
        let layers = select(&snapshot);
        assert!(!names(&layers).iter().any(|n| n.starts_with("memory:")));
        assert!(names(&layers).contains(&"remediation:memory"));
    }

    #[test]
    fn failed_sample_selects_no_tiers() {
        let snapshot =
            Snapshot::from_json("{}", Some(r#"{"system_metrics": {}}"#)).unwrap();
        let layers = select(&snapshot);
        assert_eq!(names(&layers), vec!["defaults", "scale:small", "usage:novice"]);
    }

    #[test]
    fn each_metric_section_drives_only_its_own_tier() {
        let snapshot = Snapshot::from_json(
            "{}",
            Some(r#"{"system_metrics": {"cpu": {"percent": 10.0, "count": 2}}}"#),
        )
        .unwrap();
        let layers = select(&snapshot);
        assert!(names(&layers).contains(&"cpu:low"));
        assert!(!names(&layers).iter().any(|n| n.starts_with("memory:")));
    }

    #[test]
    fn remediation_follows_tiers_and_overrides_them() {
        let mut snapshot = Snapshot::default();
        snapshot.performance.system_metrics = Some(metrics(30.0, 64, 10.0, 16));
        snapshot.performance.performance_issues = vec![
            PerformanceIssue::new(IssueKind::Cpu, Severity::High),
            PerformanceIssue::new(IssueKind::Memory, Severity::High),
        ];
        let layers = select(&snapshot);
        let order = names(&layers);
        let pos = |name: &str| order.iter().position(|n| *n == name).unwrap();
        assert!(pos("memory:high") < pos("cpu:high"));
        assert!(pos("cpu:high") < pos("remediation:cpu"));
        assert!(pos("remediation:cpu") < pos("remediation:memory"));

        let merged = merge_layers(&layers);
        // The high-memory tier enables parallelism and caching; remediation wins.
        assert_eq!(
            merged
                .get_path("performance.parallelProcessing")
                .and_then(ConfigValue::as_bool),
            Some(false)
        );
        assert_eq!(
            merged
                .get_path("performance.enableCaching")
                .and_then(ConfigValue::as_bool),
            Some(false)
        );
        assert_eq!(
            merged
                .get_path("performance.memoryOptimization")
                .and_then(ConfigValue::as_bool),
            Some(true)
        );
    }

    #[test]
    fn low_severity_issues_do_not_remediate() {
        let mut snapshot = Snapshot::default();
        snapshot.performance.performance_issues = vec![
            PerformanceIssue::new(IssueKind::Memory, Severity::Medium),
            PerformanceIssue::new(IssueKind::Disk, Severity::High),
        ];
        assert!(!names(&select(&snapshot)).iter().any(|n| n.starts_with("remediation")));
    }

    #[test]
    fn large_project_scale() {
        let mut snapshot = Snapshot::default();
        snapshot.config.project_structure.total_files = 120;
        let merged = merge_layers(&select(&snapshot));
        assert_eq!(merged.get("requestLimit").and_then(ConfigValue::as_i64), Some(50));
        assert_eq!(merged.get("contextWindow").and_then(ConfigValue::as_i64), Some(250000));
        assert_eq!(
            merged
                .get_path("performance.maxCacheSize")
                .and_then(ConfigValue::as_i64),
            Some(150)
        );
    }

    #[test]
    fn polyglot_medium_project() {
        let mut snapshot = Snapshot::default();
        snapshot.config.project_structure.total_files = 60;
        snapshot.config.project_structure.languages =
            vec!["go".into(), "rust".into(), "cpp".into()];
        let layers = select(&snapshot);
        assert!(names(&layers).contains(&"scale:medium"));
        let merged = merge_layers(&layers);
        assert_eq!(merged.get("contextWindow").and_then(ConfigValue::as_i64), Some(250000));
        assert_eq!(
            merged.get("maxResponseTokens").and_then(ConfigValue::as_i64),
            Some(10240)
        );
    }

    #[test]
    fn experienced_user_layer() {
        let mut snapshot = Snapshot::default();
        snapshot.config.usage_patterns.sessions_count = 150;
        let merged = merge_layers(&select(&snapshot));
        assert_eq!(merged.get("autoApprove").and_then(ConfigValue::as_bool), Some(true));
        assert_eq!(
            merged.get("experimentalFeatures").and_then(ConfigValue::as_bool),
            Some(true)
        );
    }

    #[test]
    fn mid_range_sessions_select_no_experience_layer() {
        let mut snapshot = Snapshot::default();
        snapshot.config.usage_patterns.sessions_count = 50;
        assert!(!names(&select(&snapshot)).iter().any(|n| n.starts_with("usage:")));
    }

    #[test]
    fn many_error_patterns_add_determinism() {
        let mut snapshot = Snapshot::default();
        snapshot.config.usage_patterns.sessions_count = 50;
        snapshot.config.usage_patterns.error_patterns = vec![json!({}); 11];
        let merged = merge_layers(&select(&snapshot));
        assert_eq!(merged.get("temperature").and_then(ConfigValue::as_f64), Some(0.05));
        assert_eq!(
            merged
                .get_path("security.logSecurityEvents")
                .and_then(ConfigValue::as_bool),
            Some(true)
        );
    }

    #[test]
    fn user_value_beats_computed_value() {
        let mut snapshot = Snapshot::default();
        // Novice layer sets autoApprove false.
        snapshot.config.vscode_settings.cline_settings =
            ConfigTree::from_json(json!({"cline.autoApprove": true, "cline.theme": "dark"}));
        let layers = select(&snapshot);
        assert_eq!(layers.last().unwrap().name, "user");
        let merged = merge_layers(&layers);
        assert_eq!(merged.get("autoApprove").and_then(ConfigValue::as_bool), Some(true));
        assert!(!merged.contains_key("theme"));
        assert!(!merged.contains_key("cline.theme"));
    }

    #[test]
    fn bare_user_key_wins_over_prefixed() {
        let keys = vec!["preferredLanguage".to_string()];
        let existing = ConfigTree::from_json(json!({
            "preferredLanguage": "de",
            "cline.preferredLanguage": "fr"
        }));
        let user = user_layer(&keys, &existing);
        assert_eq!(
            user.get("preferredLanguage").and_then(ConfigValue::as_str),
            Some("de")
        );
    }
}
