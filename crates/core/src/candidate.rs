//! Candidates: units of advisory text and their categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule category. Ordering of [`Category::priority`] drives presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Security,
    Testing,
    Performance,
    Documentation,
    Style,
    General,
}

impl Category {
    /// Lower sorts first. Documentation and style share a rank.
    pub fn priority(self) -> u8 {
        match self {
            Category::Security => 1,
            Category::Testing => 2,
            Category::Performance => 3,
            Category::Documentation | Category::Style => 4,
            Category::General => 5,
        }
    }

    /// Heading used when rendering a group.
    pub fn label(self) -> &'static str {
        match self {
            Category::Security => "Security",
            Category::Testing => "Testing",
            Category::Performance => "Performance",
            Category::Documentation => "Documentation",
            Category::Style => "Code Style",
            Category::General => "General",
        }
    }

    /// Best-effort keyword classification. Only used for user-authored lines;
    /// catalog entries carry their category from definition. Keywords are
    /// word stems: each must match the start of a word.
    pub fn infer(text: &str) -> Self {
        const SECURITY: &[&str] = &[
            "secur",
            "password",
            "secret",
            "credential",
            "authenticat",
            "authoriz",
            "oauth",
            "https",
        ];
        const TESTING: &[&str] = &["test", "coverage", "mock"];
        const PERFORMANCE: &[&str] = &["performance", "optimiz", "cach", "memory", "profil"];
        const DOCUMENTATION: &[&str] = &["doc", "comment", "readme", "changelog"];
        const STYLE: &[&str] = &["style", "format", "lint", "naming", "indent"];
        // Words that share a stem above but belong elsewhere.
        const NOT_DOCUMENTATION: &[&str] = &["docker"];

        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let hit = |keywords: &[&str]| {
            words.iter().any(|w| {
                keywords.iter().any(|k| w.starts_with(k))
                    && !NOT_DOCUMENTATION.iter().any(|x| w.starts_with(x))
            })
        };

        if hit(SECURITY) {
            Category::Security
        } else if hit(TESTING) {
            Category::Testing
        } else if hit(PERFORMANCE) {
            Category::Performance
        } else if hit(DOCUMENTATION) {
            Category::Documentation
        } else if hit(STYLE) {
            Category::Style
        } else {
            Category::General
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// Selected from the static catalog by predicate.
    Catalog,
    /// Added because of a reported performance issue.
    Remediation,
    /// Preserved from the user's existing text.
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub text: String,
    pub category: Category,
    pub source: SourceTag,
}

impl CandidateItem {
    pub fn new(text: impl Into<String>, category: Category, source: SourceTag) -> Self {
        Self {
            text: text.into(),
            category,
            source,
        }
    }

    /// Comparison key for deduplication: trimmed, lowercased.
    pub fn dedup_key(&self) -> String {
        normalize(&self.text)
    }
}

/// Trim and lowercase for case-insensitive text comparison.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Ordered, deduplicated candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub items: Vec<CandidateItem>,
}

/// One rendered category section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub category: Category,
    pub items: Vec<&'a CandidateItem>,
}

impl SelectionResult {
    pub fn new(items: Vec<CandidateItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.text.as_str()).collect()
    }

    /// Partition by category, groups ordered by first appearance and items
    /// in their existing order. Empty categories never appear.
    pub fn groups(&self) -> Vec<CategoryGroup<'_>> {
        let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
        for item in &self.items {
            match groups.iter_mut().find(|g| g.category == item.category) {
                Some(group) => group.items.push(item),
                None => groups.push(CategoryGroup {
                    category: item.category,
                    items: vec![item],
                }),
            }
        }
        groups
    }
}
