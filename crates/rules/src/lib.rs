//! # Autotune Rules
//!
//! Builds the advisory rules file. Candidates come from the rule catalog
//! (base groups, then languages and frameworks in snapshot order, then
//! per-issue remediation) plus the user's own lines from the existing file.
//! They are deduplicated case-insensitively, ranked by category priority and
//! rendered as one markdown section per category.

pub mod render;
pub mod select;

pub use render::{RULES_TITLE, render_rules};
pub use select::{custom_lines, decode_existing, dedup, select_rules};

use autotune_catalog::RuleCatalog;
use autotune_core::Snapshot;
use chrono::{DateTime, Utc};

/// Select and render in one step.
pub fn generate_rules(
    catalog: &RuleCatalog,
    snapshot: &Snapshot,
    existing: Option<&str>,
    generated_at: DateTime<Utc>,
) -> String {
    let result = select_rules(catalog, snapshot, existing);
    render_rules(&result, snapshot.project(), generated_at)
}
