//! Human-readable markdown summary of synthesized settings.

use autotune_core::{ConfigTree, ConfigValue};
use chrono::{DateTime, Utc};

use crate::synthesize::SynthesizedConfig;

pub fn export_summary(config: &SynthesizedConfig, generated_at: DateTime<Utc>) -> String {
    let settings = &config.cline_settings;
    let mut lines = vec![
        "# Adaptive assistant settings".to_string(),
        format!("# Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
        "## Main settings".to_string(),
        String::new(),
        format!("- Request limit: {}", display(settings.get("requestLimit"), "25")),
        format!("- Context window: {}", display(settings.get("contextWindow"), "200000")),
        format!(
            "- Max response tokens: {}",
            display(settings.get("maxResponseTokens"), "8192")
        ),
        format!("- Temperature: {}", display(settings.get("temperature"), "0.1")),
        format!("- Auto-approve: {}", yes_no(flag(settings, "autoApprove"))),
        String::new(),
    ];

    if let Some(perf) = non_empty(settings, "performance") {
        lines.push("## Performance".into());
        lines.push(String::new());
        lines.push(format!(
            "- Caching: {}",
            if flag(perf, "enableCaching") { "enabled" } else { "disabled" }
        ));
        lines.push(format!("- Cache size: {}", display(perf.get("maxCacheSize"), "100")));
        lines.push(format!(
            "- Parallel processing: {}",
            yes_no(flag(perf, "parallelProcessing"))
        ));
        lines.push(format!(
            "- Memory optimization: {}",
            yes_no(flag(perf, "memoryOptimization"))
        ));
        lines.push(String::new());
    }

    if let Some(style) = non_empty(settings, "codeStyle") {
        lines.push("## Code style".into());
        lines.push(String::new());
        lines.push(format!(
            "- Indentation: {} spaces",
            display(style.get("indentation"), "4")
        ));
        lines.push(format!("- Quotes: {}", display(style.get("quotes"), "double")));
        lines.push(format!("- Semicolons: {}", yes_no(flag(style, "semicolons"))));
        lines.push(String::new());
    }

    if let Some(security) = non_empty(settings, "security") {
        lines.push("## Security".into());
        lines.push(String::new());
        lines.push(format!(
            "- Restrict file access: {}",
            yes_no(flag(security, "restrictFileAccess"))
        ));
        lines.push(format!(
            "- Sanitize inputs: {}",
            yes_no(flag(security, "sanitizeInputs"))
        ));
        lines.push(format!(
            "- Log security events: {}",
            yes_no(flag(security, "logSecurityEvents"))
        ));
        lines.push(String::new());
    }

    if !config.layers.is_empty() {
        lines.push(format!("Applied layers: {}", config.layers.join(" → ")));
        lines.push(String::new());
    }

    lines.push("---".into());
    lines.push("*Settings adapted automatically from project and system analysis*".into());
    lines.join("\n")
}

fn non_empty<'a>(settings: &'a ConfigTree, key: &str) -> Option<&'a ConfigTree> {
    settings.get_tree(key).filter(|t| !t.is_empty())
}

fn flag(tree: &ConfigTree, key: &str) -> bool {
    tree.get(key).and_then(ConfigValue::as_bool).unwrap_or(false)
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn display(value: Option<&ConfigValue>, fallback: &str) -> String {
    match value.map(ConfigValue::to_json) {
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => fallback.to_string(),
    }
}
