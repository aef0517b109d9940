//! Editor settings derived from the merged assistant settings.
//!
//! These keys are not a precedence layer: they are computed after merging
//! and sit beside `cline_settings` as flat, dotted editor keys.

use autotune_core::{ConfigTree, ConfigValue, ProjectStructure};
use serde_json::json;

/// Compute editor keys for `settings` (the merged tree) and `project`.
pub fn derive_editor_settings(settings: &ConfigTree, project: &ProjectStructure) -> ConfigTree {
    let mut editor = ConfigTree::new();

    if project.has_language("python") {
        extend(
            &mut editor,
            json!({
                "python.defaultInterpreterPath": "./venv/bin/python",
                "python.linting.enabled": true,
                "python.linting.pylintEnabled": true,
                "python.formatting.provider": "black",
                "python.testing.pytestEnabled": true
            }),
        );
    }

    if project.has_language("javascript") || project.has_language("typescript") {
        extend(
            &mut editor,
            json!({
                "eslint.enable": true,
                "prettier.enable": true,
                "javascript.preferences.includePackageJsonAutoImports": "auto",
                "typescript.preferences.includePackageJsonAutoImports": "auto"
            }),
        );
    }

    if let Some(code_style) = settings.get_tree("codeStyle").filter(|t| !t.is_empty()) {
        let tab_size = code_style
            .get("indentation")
            .cloned()
            .unwrap_or(ConfigValue::from(4i64));
        editor.insert("editor.tabSize", tab_size);
        editor.insert("editor.insertSpaces", true);
        editor.insert("editor.detectIndentation", false);
    }

    let memory_optimized = settings
        .get_path("performance.memoryOptimization")
        .and_then(ConfigValue::as_bool)
        .unwrap_or(false);
    if memory_optimized {
        extend(
            &mut editor,
            json!({
                "typescript.disableAutomaticTypeAcquisition": true,
                "search.followSymlinks": false,
                "files.watcherExclude": {
                    "**/.git/objects/**": true,
                    "**/.git/subtree-cache/**": true,
                    "**/node_modules/**": true,
                    "**/.hg/store/**": true
                }
            }),
        );
    }

    editor
}

fn extend(editor: &mut ConfigTree, entries: serde_json::Value) {
    for (key, value) in ConfigTree::from_json(entries) {
        editor.insert(key, value);
    }
}
