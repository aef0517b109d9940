//! Applicability predicates evaluated against a [`Snapshot`].

use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

/// Languages and frameworks that mark a project as web-facing.
pub const WEB_INDICATORS: &[&str] = &[
    "javascript",
    "typescript",
    "html",
    "css",
    "nodejs",
    "react",
    "vue",
    "angular",
];

/// Languages and frameworks that usually ship as a deployed service.
pub const DEPLOYABLE_INDICATORS: &[&str] = &["javascript", "typescript", "python", "nodejs"];

/// Substrings of a `file_counts` key that mark test files.
pub const TEST_FILE_INDICATORS: &[&str] = &[".test.", ".spec.", "_test.", "test_", "tests/"];

/// Share of test-like files at or above which coverage counts as adequate.
pub const ADEQUATE_TEST_RATIO: f64 = 0.2;

/// Boolean facts derived from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectCondition {
    /// Any file pattern looks like a test file.
    HasTests,
    /// Test-like files make up at least [`ADEQUATE_TEST_RATIO`] of counted files.
    AdequateTests,
    WebProject,
    /// More than 50 files or more than two languages.
    NeedsRefactoring,
    Deployable,
    /// `.jsx` or `.tsx` files present.
    ReactIndicators,
    PerformanceIssues,
    ErrorPatterns,
}

impl ProjectCondition {
    pub fn holds(self, snapshot: &Snapshot) -> bool {
        let project = snapshot.project();
        match self {
            ProjectCondition::HasTests => project
                .file_counts
                .keys()
                .any(|pattern| is_test_pattern(pattern)),
            ProjectCondition::AdequateTests => {
                let total: u64 = project.file_counts.values().sum();
                if total == 0 {
                    return false;
                }
                let tests: u64 = project
                    .file_counts
                    .iter()
                    .filter(|(pattern, _)| pattern.contains("test") || pattern.contains("spec"))
                    .map(|(_, count)| count)
                    .sum();
                tests as f64 / total as f64 >= ADEQUATE_TEST_RATIO
            }
            ProjectCondition::WebProject => project.stack().any(|s| WEB_INDICATORS.contains(&s)),
            ProjectCondition::NeedsRefactoring => {
                project.total_files > 50 || project.language_count() > 2
            }
            ProjectCondition::Deployable => {
                project.stack().any(|s| DEPLOYABLE_INDICATORS.contains(&s))
            }
            ProjectCondition::ReactIndicators => {
                project.file_counts.contains_key(".jsx") || project.file_counts.contains_key(".tsx")
            }
            ProjectCondition::PerformanceIssues => !snapshot.issues().is_empty(),
            ProjectCondition::ErrorPatterns => {
                !snapshot.config.usage_patterns.error_patterns.is_empty()
            }
        }
    }
}

fn is_test_pattern(pattern: &str) -> bool {
    TEST_FILE_INDICATORS.iter().any(|i| pattern.contains(i))
}

/// When a catalog entry applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Always,
    Language(String),
    Framework(String),
    Condition(ProjectCondition),
    Not(Box<Predicate>),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn language(name: impl Into<String>) -> Self {
        Predicate::Language(name.into())
    }

    pub fn framework(name: impl Into<String>) -> Self {
        Predicate::Framework(name.into())
    }

    pub fn when(condition: ProjectCondition) -> Self {
        Predicate::Condition(condition)
    }

    pub fn unless(condition: ProjectCondition) -> Self {
        Predicate::Not(Box::new(Predicate::Condition(condition)))
    }

    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Language(name) => snapshot.project().has_language(name),
            Predicate::Framework(name) => snapshot.project().has_framework(name),
            Predicate::Condition(condition) => condition.holds(snapshot),
            Predicate::Not(inner) => !inner.matches(snapshot),
            Predicate::All(all) => all.iter().all(|p| p.matches(snapshot)),
            Predicate::Any(any) => any.iter().any(|p| p.matches(snapshot)),
        }
    }
}
