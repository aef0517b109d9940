//! Markdown rendering of a rule selection.

use autotune_core::{ProjectStructure, SelectionResult};
use chrono::{DateTime, Utc};

pub const RULES_TITLE: &str = "# Cline rules for the project";

/// Render `result` as a rules file: a commented header describing the
/// project, then one `##` section per category.
pub fn render_rules(
    result: &SelectionResult,
    project: &ProjectStructure,
    generated_at: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        RULES_TITLE.to_string(),
        format!("# Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
    ];

    if project.project_type != "unknown" {
        lines.push(format!("# Project type: {}", project.project_type));
    }
    if !project.languages.is_empty() {
        lines.push(format!("# Languages: {}", project.languages.join(", ")));
    }
    if !project.frameworks.is_empty() {
        lines.push(format!("# Frameworks: {}", project.frameworks.join(", ")));
    }
    lines.push(String::new());

    for group in result.groups() {
        lines.push(format!("## {}", group.category.label()));
        lines.push(String::new());
        lines.extend(group.items.iter().map(|item| format!("- {}", item.text)));
        lines.push(String::new());
    }

    lines.join("\n")
}
