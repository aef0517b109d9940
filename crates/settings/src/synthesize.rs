//! Settings synthesis: select layers, fold them, derive editor keys.

use autotune_catalog::SettingsCatalog;
use autotune_core::{ConfigTree, Snapshot, Warning, merge, merge_layers};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::info;

use crate::editor::derive_editor_settings;
use crate::existing::SettingsDocument;
use crate::selector::select_layers_with_existing;
use crate::thresholds::Thresholds;

/// The outcome of one settings synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedConfig {
    /// The merged assistant settings.
    pub cline_settings: ConfigTree,
    /// Flat editor keys derived from the merged settings.
    pub editor: ConfigTree,
    /// Names of the applied layers, lowest precedence first.
    pub layers: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl SynthesizedConfig {
    /// `{"cline_settings": {...}, <editor keys>...}`
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("cline_settings".into(), self.cline_settings.to_json());
        for (key, value) in self.editor.iter() {
            out.insert(key.clone(), value.to_json());
        }
        Value::Object(out)
    }

    /// Flatten for an editor settings document: each top-level assistant key
    /// gets `prefix`, editor keys are passed through as they are.
    pub fn settings_entries(&self, prefix: &str) -> Vec<(String, Value)> {
        self.cline_settings
            .iter()
            .map(|(key, value)| (format!("{prefix}{key}"), value.to_json()))
            .chain(
                self.editor
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json())),
            )
            .collect()
    }
}

impl Serialize for SynthesizedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Runs settings synthesis against one catalog and threshold set.
#[derive(Debug, Clone, Copy)]
pub struct SettingsSynthesizer<'a> {
    catalog: &'a SettingsCatalog,
    thresholds: &'a Thresholds,
}

impl<'a> SettingsSynthesizer<'a> {
    pub fn new(catalog: &'a SettingsCatalog, thresholds: &'a Thresholds) -> Self {
        Self {
            catalog,
            thresholds,
        }
    }

    /// Synthesize from the snapshot alone.
    pub fn synthesize(&self, snapshot: &Snapshot) -> SynthesizedConfig {
        self.run(snapshot, &snapshot.config.vscode_settings.cline_settings)
    }

    /// Synthesize with the editor's settings document as an additional source
    /// of user values. Prefixed entries in the document override the same
    /// keys in the snapshot. A malformed document is ignored with a warning.
    pub fn synthesize_with_document(
        &self,
        snapshot: &Snapshot,
        document: &str,
        prefix: &str,
    ) -> SynthesizedConfig {
        let (doc, warning) = SettingsDocument::parse_lossy(document);
        let mut config = self.synthesize_over(snapshot, &doc, prefix);
        config.warnings.extend(warning);
        config
    }

    /// Same as [`Self::synthesize_with_document`] for a document the caller
    /// already parsed. Document keys are read with `prefix` stripped.
    pub fn synthesize_over(
        &self,
        snapshot: &Snapshot,
        document: &SettingsDocument,
        prefix: &str,
    ) -> SynthesizedConfig {
        let from_document: ConfigTree = document
            .assistant_settings(prefix)
            .iter()
            .map(|(key, value)| {
                let bare = key.strip_prefix(prefix).unwrap_or(key);
                (bare.to_string(), value.clone())
            })
            .collect();
        let existing = merge(&snapshot.config.vscode_settings.cline_settings, &from_document);
        self.run(snapshot, &existing)
    }

    fn run(&self, snapshot: &Snapshot, existing: &ConfigTree) -> SynthesizedConfig {
        let layers = select_layers_with_existing(self.catalog, self.thresholds, snapshot, existing);
        let cline_settings = merge_layers(&layers);
        let editor = derive_editor_settings(&cline_settings, snapshot.project());

        info!(
            layers = layers.len(),
            settings = cline_settings.len(),
            editor = editor.len(),
            "Settings synthesized"
        );

        SynthesizedConfig {
            cline_settings,
            editor,
            layers: layers.into_iter().map(|l| l.name).collect(),
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotune_core::ConfigValue;
    use serde_json::json;

    fn python_snapshot() -> Snapshot {
        Snapshot::from_json(
            r#"{
                "project_structure": {
                    "languages": ["python"],
                    "project_type": "python",
                    "total_files": 30
                },
                "usage_patterns": {"sessions_count": 40}
            }"#,
            None,
        )
        .unwrap()
    }

    fn with_synth<T>(f: impl FnOnce(SettingsSynthesizer<'_>) -> T) -> T {
        let catalog = SettingsCatalog::builtin();
        let thresholds = Thresholds::default();
        f(SettingsSynthesizer::new(&catalog, &thresholds))
    }

    #[test]
    fn python_project_settings() {
        let config = with_synth(|s| s.synthesize(&python_snapshot()));
        assert_eq!(config.layers, vec!["defaults", "language:python", "scale:small"]);
        assert_eq!(
            config
                .cline_settings
                .get_path("codeStyle.lineLength")
                .and_then(ConfigValue::as_i64),
            Some(88)
        );
        // Profile keys merge into the defaults' section.
        assert_eq!(
            config
                .cline_settings
                .get_path("codeStyle.semicolons")
                .and_then(ConfigValue::as_bool),
            Some(true)
        );
        assert_eq!(
            config.editor.get("editor.tabSize").and_then(ConfigValue::as_i64),
            Some(4)
        );
        assert!(config.editor.contains_key("python.defaultInterpreterPath"));
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn synthesis_is_repeatable() {
        let snapshot = python_snapshot();
        let (a, b) = with_synth(|s| (s.synthesize(&snapshot), s.synthesize(&snapshot)));
        assert_eq!(a, b);
    }

    #[test]
    fn json_shape_puts_editor_keys_beside_settings() {
        let config = with_synth(|s| s.synthesize(&python_snapshot()));
        let value = config.to_json();
        assert_eq!(value["cline_settings"]["requestLimit"], json!(20));
        assert_eq!(value["python.formatting.provider"], json!("black"));
        assert_eq!(serde_json::to_value(&config).unwrap(), value);
    }

    #[test]
    fn settings_entries_prefix_only_assistant_keys() {
        let config = with_synth(|s| s.synthesize(&python_snapshot()));
        let entries = config.settings_entries("cline.");
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"cline.requestLimit"));
        assert!(keys.contains(&"cline.performance"));
        assert!(keys.contains(&"editor.tabSize"));
        assert!(!keys.contains(&"cline.editor.tabSize"));
    }

    #[test]
    fn document_values_are_preserved() {
        let snapshot = python_snapshot();
        let doc = r#"{"cline.customInstructions": "Answer in haiku", "cline.requestLimit": 99}"#;
        let config = with_synth(|s| s.synthesize_with_document(&snapshot, doc, "cline."));
        assert_eq!(config.layers.last().map(String::as_str), Some("user"));
        assert_eq!(
            config
                .cline_settings
                .get("customInstructions")
                .and_then(ConfigValue::as_str),
            Some("Answer in haiku")
        );
        // Not a preserved key.
        assert_eq!(
            config.cline_settings.get("requestLimit").and_then(ConfigValue::as_i64),
            Some(20)
        );
    }

    #[test]
    fn malformed_document_warns_and_continues() {
        let snapshot = python_snapshot();
        let config = with_synth(|s| s.synthesize_with_document(&snapshot, "{oops", "cline."));
        assert_eq!(config.warnings.len(), 1);
        assert!(matches!(config.warnings[0], Warning::MalformedSettings { .. }));
        assert_eq!(
            config.cline_settings,
            with_synth(|s| s.synthesize(&snapshot)).cline_settings
        );
    }
}
