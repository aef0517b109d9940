//! Rule selection: gather candidates, deduplicate, rank.

use autotune_catalog::{RuleCatalog, RuleGroup, RuleScope};
use autotune_core::{CandidateItem, Category, SelectionResult, Snapshot, SourceTag, Warning};
use std::collections::HashSet;
use tracing::{debug, info};

/// Decode a rules file read from disk.
pub fn decode_existing(bytes: &[u8]) -> Result<&str, Warning> {
    std::str::from_utf8(bytes).map_err(|e| Warning::MalformedRules {
        reason: e.to_string(),
    })
}

/// Select rules for `snapshot`.
///
/// `existing` is the user's current rules text; when `None`, the snapshot's
/// `current_rules` content is used if it exists. `Some("")` means no prior
/// customizations.
pub fn select_rules(
    catalog: &RuleCatalog,
    snapshot: &Snapshot,
    existing: Option<&str>,
) -> SelectionResult {
    let mut candidates: Vec<CandidateItem> = Vec::new();
    let project = snapshot.project();

    for group in catalog.project_groups() {
        if let RuleScope::Project(predicate) = &group.scope {
            if predicate.matches(snapshot) {
                push_group(&mut candidates, group, SourceTag::Catalog);
            }
        }
    }

    for language in &project.languages {
        for group in catalog.language(language) {
            push_group(&mut candidates, group, SourceTag::Catalog);
        }
    }

    for framework in &project.frameworks {
        for group in catalog.framework(framework) {
            push_group(&mut candidates, group, SourceTag::Catalog);
        }
    }

    for issue in snapshot.issues() {
        for group in catalog.issue(issue.kind) {
            push_group(&mut candidates, group, SourceTag::Remediation);
        }
    }

    for group in catalog.usage_groups() {
        if let RuleScope::Usage(predicate) = &group.scope {
            if predicate.matches(snapshot) {
                push_group(&mut candidates, group, SourceTag::Remediation);
            }
        }
    }

    let current = &snapshot.config.current_rules;
    let existing = existing.or_else(|| {
        (current.exists && !current.content.is_empty()).then_some(current.content.as_str())
    });
    if let Some(text) = existing {
        for line in custom_lines(catalog, text) {
            let category = Category::infer(&line);
            candidates.push(CandidateItem::new(line, category, SourceTag::User));
        }
    }

    let gathered = candidates.len();
    let mut items = dedup(candidates);
    items.sort_by_key(|item| item.category.priority());

    info!(gathered, selected = items.len(), "Rules selected");
    SelectionResult::new(items)
}

fn push_group(candidates: &mut Vec<CandidateItem>, group: &RuleGroup, source: SourceTag) {
    let selected = group.selected();
    debug!(group = %group.id, count = selected.len(), "Rule group applies");
    candidates.extend(
        selected
            .iter()
            .map(|rule| CandidateItem::new(rule.text.clone(), rule.category, source)),
    );
}

/// Lines from `text` the user wrote themselves: not blank, not headings,
/// and not equal to any catalog entry. A leading `-` or `*` list marker is
/// stripped so re-reading rendered output finds the same lines.
pub fn custom_lines(catalog: &RuleCatalog, text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(strip_marker)
        .filter(|line| !line.is_empty() && !catalog.contains_text(line))
        .map(str::to_string)
        .collect()
}

fn strip_marker(line: &str) -> &str {
    for marker in ['-', '*'] {
        if let Some(rest) = line.strip_prefix(marker) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest.trim();
            }
        }
    }
    line
}

/// Drop later candidates whose dedup key was already seen.
pub fn dedup(candidates: Vec<CandidateItem>) -> Vec<CandidateItem> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|item| seen.insert(item.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotune_core::{IssueKind, PerformanceIssue, Severity};

    fn snapshot(config: &str) -> Snapshot {
        Snapshot::from_json(config, None).unwrap()
    }

    fn categories(result: &SelectionResult) -> Vec<Category> {
        result.items.iter().map(|i| i.category).collect()
    }

    #[test]
    fn dedup_keeps_first_text() {
        let items = dedup(vec![
            CandidateItem::new("Use HTTPS", Category::Security, SourceTag::Catalog),
            CandidateItem::new(" use https ", Category::Security, SourceTag::User),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "Use HTTPS");
        assert_eq!(items[0].source, SourceTag::Catalog);
    }

    #[test]
    fn priority_sort_is_stable() {
        let mut items = vec![
            CandidateItem::new("g", Category::General, SourceTag::Catalog),
            CandidateItem::new("s", Category::Security, SourceTag::Catalog),
            CandidateItem::new("p", Category::Performance, SourceTag::Catalog),
        ];
        items.sort_by_key(|i| i.category.priority());
        let order: Vec<Category> = items.iter().map(|i| i.category).collect();
        assert_eq!(
            order,
            vec![Category::Security, Category::Performance, Category::General]
        );
    }

    #[test]
    fn plain_project_gets_base_rules_and_test_fallback() {
        let result = select_rules(&RuleCatalog::builtin(), &Snapshot::default(), None);
        let texts = result.texts();
        assert!(texts.contains(&"Create tests for critical functionality"));
        assert!(texts.contains(&"Follow SOLID principles"));
        assert!(!texts.contains(&"Never store passwords or secret keys in code"));
        // general 3 + fallback 1 + documentation 2
        assert_eq!(result.len(), 6);
    }

    #[test]
    fn results_are_sorted_by_priority() {
        let snap = snapshot(r#"{"project_structure": {"languages": ["typescript"], "file_counts": {"tests/": 4}}}"#);
        let result = select_rules(&RuleCatalog::builtin(), &snap, None);
        let priorities: Vec<u8> = categories(&result).iter().map(|c| c.priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
        assert_eq!(result.items[0].category, Category::Security);
    }

    #[test]
    fn languages_and_frameworks_follow_snapshot_order() {
        let snap = snapshot(
            r#"{"project_structure": {"languages": ["rust", "python"], "frameworks": ["flask"]}}"#,
        );
        let result = select_rules(&RuleCatalog::builtin(), &snap, None);
        let texts = result.texts();
        let pos = |t: &str| texts.iter().position(|x| *x == t).unwrap();
        assert!(
            pos("Use Result<T, E> for error handling")
                < pos("Catch specific exceptions, never use a bare except")
        );
        assert!(texts.contains(&"Use decorators for authorization"));
        // python takes only its first five entries
        assert!(!texts.contains(&"Use dataclasses for plain data structures"));
    }

    #[test]
    fn remediation_rules_per_issue() {
        let mut snap = Snapshot::default();
        snap.performance.performance_issues = vec![
            PerformanceIssue::new(IssueKind::Memory, Severity::Low),
            PerformanceIssue::new(IssueKind::Swap, Severity::High),
        ];
        let result = select_rules(&RuleCatalog::builtin(), &snap, None);
        let remediation: Vec<&CandidateItem> = result
            .items
            .iter()
            .filter(|i| i.source == SourceTag::Remediation)
            .collect();
        assert_eq!(remediation.len(), 3);
        // performance base group applies too
        assert!(result.texts().contains(&"Optimize loops and avoid deep nesting"));
    }

    #[test]
    fn error_patterns_add_exception_rule() {
        let snap = snapshot(r#"{"usage_patterns": {"error_patterns": [{"kind": "timeout"}]}}"#);
        let result = select_rules(&RuleCatalog::builtin(), &snap, None);
        assert!(result
            .texts()
            .contains(&"Handle exceptions at the application level, never silently ignore them"));
    }

    #[test]
    fn custom_lines_skip_catalog_text_and_markers() {
        let catalog = RuleCatalog::builtin();
        let text = "# My rules\n\n- Prefer small pull requests\n* follow solid principles\n  Never log tokens  \n-   \n";
        assert_eq!(
            custom_lines(&catalog, text),
            vec!["Prefer small pull requests", "Never log tokens"]
        );
    }

    #[test]
    fn custom_lines_come_from_snapshot_when_no_text_given() {
        let snap = snapshot(
            r#"{"current_rules": {"exists": true, "content": "Keep secrets in the vault"}}"#,
        );
        let result = select_rules(&RuleCatalog::builtin(), &snap, None);
        let user: Vec<&CandidateItem> = result
            .items
            .iter()
            .filter(|i| i.source == SourceTag::User)
            .collect();
        assert_eq!(user.len(), 1);
        assert_eq!(user[0].category, Category::Security);
        assert_eq!(result.items[0].text, "Keep secrets in the vault");
    }

    #[test]
    fn empty_existing_text_ignores_snapshot_rules() {
        let snap = snapshot(
            r#"{"current_rules": {"exists": true, "content": "Keep secrets in the vault"}}"#,
        );
        let result = select_rules(&RuleCatalog::builtin(), &snap, Some(""));
        assert!(result.items.iter().all(|i| i.source != SourceTag::User));
    }

    #[test]
    fn missing_rules_file_contributes_nothing() {
        let snap = snapshot(r#"{"current_rules": {"exists": false, "content": "stale"}}"#);
        let result = select_rules(&RuleCatalog::builtin(), &snap, None);
        assert!(result.items.iter().all(|i| i.source != SourceTag::User));
    }

    #[test]
    fn invalid_utf8_is_a_warning() {
        let warning = decode_existing(&[0x66, 0xff, 0x6f]).unwrap_err();
        assert!(matches!(warning, Warning::MalformedRules { .. }));
        assert_eq!(decode_existing(b"ok").unwrap(), "ok");
    }
}
