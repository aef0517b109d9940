//! Rule catalog: advisory lines grouped by where they apply.
//!
//! Every entry carries its [`Category`] from definition; keyword inference
//! is reserved for lines a user wrote by hand.

use autotune_core::candidate::normalize;
use autotune_core::{Category, IssueKind, Predicate, ProjectCondition};
use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// A set of rule groups, in selection order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleCatalog {
    #[serde(default)]
    pub groups: Vec<RuleGroup>,
}

/// Where a group of rules applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    /// Project-wide base rules, gated by a predicate.
    Project(Predicate),
    /// Selected once for each matching entry of `languages`.
    Language(String),
    /// Selected once for each matching entry of `frameworks`.
    Framework(String),
    /// Appended once per reported issue of this kind.
    Issue(IssueKind),
    /// Driven by usage history rather than project shape.
    Usage(Predicate),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleGroup {
    pub id: String,
    pub scope: RuleScope,
    /// How many leading entries are taken. `None` takes all.
    #[serde(default)]
    pub limit: Option<usize>,
    pub rules: Vec<RuleEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub text: String,
    pub category: Category,
}

impl RuleEntry {
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

impl RuleGroup {
    fn new(id: &str, scope: RuleScope, limit: Option<usize>, rules: &[(&str, Category)]) -> Self {
        Self {
            id: id.into(),
            scope,
            limit,
            rules: rules
                .iter()
                .map(|(text, category)| RuleEntry::new(*text, *category))
                .collect(),
        }
    }

    /// The entries this group contributes when selected.
    pub fn selected(&self) -> &[RuleEntry] {
        match self.limit {
            Some(limit) => &self.rules[..limit.min(self.rules.len())],
            None => &self.rules,
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.id.trim().is_empty() {
            return Err(CatalogError::InvalidEntry {
                id: "(empty)".into(),
                reason: "rule group id cannot be empty".into(),
            });
        }
        if let Some(entry) = self.rules.iter().find(|r| r.text.trim().is_empty()) {
            return Err(CatalogError::InvalidEntry {
                id: self.id.clone(),
                reason: format!("blank rule text in {:?}", entry.category),
            });
        }
        Ok(())
    }
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load additional groups from a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, CatalogError> {
        let catalog: RuleCatalog = toml::from_str(toml_str)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Append another catalog's groups after this one's.
    pub fn extend(&mut self, other: RuleCatalog) {
        self.groups.extend(other.groups);
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        for (i, group) in self.groups.iter().enumerate() {
            group.validate()?;
            if self.groups[..i].iter().any(|g| g.id == group.id) {
                return Err(CatalogError::DuplicateId(group.id.clone()));
            }
        }
        Ok(())
    }

    pub fn project_groups(&self) -> impl Iterator<Item = &RuleGroup> {
        self.groups
            .iter()
            .filter(|g| matches!(g.scope, RuleScope::Project(_)))
    }

    pub fn usage_groups(&self) -> impl Iterator<Item = &RuleGroup> {
        self.groups
            .iter()
            .filter(|g| matches!(g.scope, RuleScope::Usage(_)))
    }

    pub fn language(&self, name: &str) -> impl Iterator<Item = &RuleGroup> {
        self.groups
            .iter()
            .filter(move |g| matches!(&g.scope, RuleScope::Language(l) if l == name))
    }

    pub fn framework(&self, name: &str) -> impl Iterator<Item = &RuleGroup> {
        self.groups
            .iter()
            .filter(move |g| matches!(&g.scope, RuleScope::Framework(f) if f == name))
    }

    pub fn issue(&self, kind: IssueKind) -> impl Iterator<Item = &RuleGroup> {
        self.groups
            .iter()
            .filter(move |g| g.scope == RuleScope::Issue(kind))
    }

    /// True when `text` equals any catalog entry, selected or not, ignoring
    /// case and surrounding whitespace.
    pub fn contains_text(&self, text: &str) -> bool {
        let key = normalize(text);
        self.groups
            .iter()
            .flat_map(|g| g.rules.iter())
            .any(|r| normalize(&r.text) == key)
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.rules.is_empty())
    }

    /// The built-in rule catalog.
    pub fn builtin() -> Self {
        use Category::*;

        let project = |p: Predicate| RuleScope::Project(p);
        let language = |l: &str| RuleScope::Language(l.into());
        let framework = |f: &str| RuleScope::Framework(f.into());

        let groups = vec![
            RuleGroup::new(
                "general",
                project(Predicate::Always),
                Some(3),
                &[
                    ("Always use clear, descriptive names for variables, functions and classes", Style),
                    ("Add comments to complex algorithms and business logic", Documentation),
                    ("Follow SOLID principles", General),
                    ("Avoid code duplication (DRY)", General),
                    ("Use named constants instead of magic numbers", Style),
                ],
            ),
            RuleGroup::new(
                "security",
                project(Predicate::when(ProjectCondition::WebProject)),
                Some(3),
                &[
                    ("Never store passwords or secret keys in code", Security),
                    ("Always validate user input", Security),
                    ("Use HTTPS for all external requests", Security),
                    ("Log security events", Security),
                    ("Apply the principle of least privilege", Security),
                ],
            ),
            RuleGroup::new(
                "performance",
                project(Predicate::when(ProjectCondition::PerformanceIssues)),
                Some(2),
                &[
                    ("Optimize loops and avoid deep nesting", Performance),
                    ("Cache the results of expensive operations", Performance),
                    ("Use lazy loading where possible", Performance),
                    ("Minimize the number of database queries", Performance),
                    ("Profile code when you suspect a bottleneck", Performance),
                ],
            ),
            RuleGroup::new(
                "testing",
                project(Predicate::when(ProjectCondition::HasTests)),
                Some(3),
                &[
                    ("Write unit tests for every public method", Testing),
                    ("Aim for at least 80% test coverage", Testing),
                    ("Use mocks for external dependencies", Testing),
                    ("Group tests logically by module", Testing),
                    ("Test edge cases and error paths", Testing),
                ],
            ),
            RuleGroup::new(
                "testing-bootstrap",
                project(Predicate::unless(ProjectCondition::HasTests)),
                None,
                &[("Create tests for critical functionality", Testing)],
            ),
            RuleGroup::new(
                "documentation",
                project(Predicate::Always),
                Some(2),
                &[
                    ("Write docstrings for all public functions and classes", Documentation),
                    ("Update README.md after significant changes", Documentation),
                    ("Document API endpoints with examples", Documentation),
                    ("Keep a changelog for releases", Documentation),
                    ("Add inline comments to non-obvious code", Documentation),
                ],
            ),
            RuleGroup::new(
                "python",
                language("python"),
                Some(5),
                &[
                    ("Follow PEP 8 for code style", Style),
                    ("Use type hints on every function", Style),
                    ("Use list and dict comprehensions where appropriate", Style),
                    ("Catch specific exceptions, never use a bare except", General),
                    ("Use f-strings for string formatting", Style),
                    ("Use dataclasses for plain data structures", General),
                    ("Use pathlib instead of os.path for file paths", General),
                ],
            ),
            RuleGroup::new(
                "javascript",
                language("javascript"),
                Some(5),
                &[
                    ("Use const and let instead of var", Style),
                    ("Enable strict mode with 'use strict'", General),
                    ("Prefer async/await over raw promise chains", General),
                    ("Use object and array destructuring", Style),
                    ("Use ES6 modules", General),
                    ("Check types with TypeScript or JSDoc", General),
                ],
            ),
            RuleGroup::new(
                "typescript",
                language("typescript"),
                Some(5),
                &[
                    ("Always annotate parameter and return types", Style),
                    ("Use interfaces to describe data structures", General),
                    ("Use generics for reusable code", General),
                    ("Avoid the any type, use unknown instead", General),
                    ("Use enums for fixed sets of values", General),
                    ("Enable strict mode in tsconfig.json", General),
                ],
            ),
            RuleGroup::new(
                "java",
                language("java"),
                Some(5),
                &[
                    ("Follow Java naming conventions", Style),
                    ("Use annotations for metadata", General),
                    ("Use the Stream API to process collections", General),
                    ("Use Optional for values that may be absent", General),
                    ("Follow object-oriented design principles", General),
                    ("Use the builder pattern for complex objects", General),
                ],
            ),
            RuleGroup::new(
                "rust",
                language("rust"),
                Some(5),
                &[
                    ("Use Result<T, E> for error handling", General),
                    ("Use match for pattern matching", General),
                    ("Avoid panics in library code", General),
                    ("Use references and borrowing correctly", General),
                    ("Use traits for polymorphism", General),
                    ("Prefer zero-cost abstractions", Performance),
                ],
            ),
            RuleGroup::new(
                "react",
                framework("react"),
                Some(3),
                &[
                    ("Use function components with hooks", General),
                    ("Use useCallback and useMemo to optimize rendering", Performance),
                    ("Give each component a single responsibility", General),
                    ("Type props with prop-types or TypeScript", General),
                    ("Use conditional rendering deliberately", General),
                ],
            ),
            RuleGroup::new(
                "django",
                framework("django"),
                Some(3),
                &[
                    ("Use the Django ORM instead of raw SQL", Security),
                    ("Use migrations for every schema change", General),
                    ("Use Django Forms for validation", Security),
                    ("Use middleware for cross-cutting concerns", General),
                    ("Follow the Django MTV pattern", General),
                ],
            ),
            RuleGroup::new(
                "flask",
                framework("flask"),
                Some(3),
                &[
                    ("Use Blueprints to organize the application", General),
                    ("Use decorators for authorization", Security),
                    ("Use Flask-SQLAlchemy for database access", General),
                    ("Validate input with Marshmallow or WTForms", Security),
                    ("Use the application factory pattern", General),
                ],
            ),
            RuleGroup::new(
                "memory-pressure",
                RuleScope::Issue(IssueKind::Memory),
                None,
                &[
                    ("Release unused resources and close connections", Performance),
                    ("Use generators instead of lists for large data", Performance),
                    ("Monitor memory usage in critical code paths", Performance),
                ],
            ),
            RuleGroup::new(
                "cpu-pressure",
                RuleScope::Issue(IssueKind::Cpu),
                None,
                &[
                    ("Optimize algorithms with high computational complexity", Performance),
                    ("Use multithreading for CPU-intensive tasks", Performance),
                    ("Cache the results of expensive computations", Performance),
                ],
            ),
            RuleGroup::new(
                "error-handling",
                RuleScope::Usage(Predicate::when(ProjectCondition::ErrorPatterns)),
                None,
                &[(
                    "Handle exceptions at the application level, never silently ignore them",
                    General,
                )],
            ),
        ];

        Self { groups }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_validates() {
        let catalog = RuleCatalog::builtin();
        catalog.validate().unwrap();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.project_groups().count(), 6);
    }

    #[test]
    fn limits_cap_selected_entries() {
        let catalog = RuleCatalog::builtin();
        let python = catalog.language("python").next().unwrap();
        assert_eq!(python.rules.len(), 7);
        assert_eq!(python.selected().len(), 5);

        let memory = catalog.issue(IssueKind::Memory).next().unwrap();
        assert_eq!(memory.selected().len(), 3);
    }

    #[test]
    fn limit_larger_than_group_is_clamped() {
        let group = RuleGroup::new(
            "tiny",
            RuleScope::Language("go".into()),
            Some(10),
            &[("Run gofmt", Category::Style)],
        );
        assert_eq!(group.selected().len(), 1);
    }

    #[test]
    fn contains_text_covers_unselected_entries() {
        let catalog = RuleCatalog::builtin();
        // Beyond the python group's limit.
        assert!(catalog.contains_text("use pathlib instead of os.path for file paths"));
        assert!(catalog.contains_text("  Use HTTPS for all external requests "));
        assert!(!catalog.contains_text("Keep functions under forty lines"));
    }

    #[test]
    fn unknown_scopes_select_nothing() {
        let catalog = RuleCatalog::builtin();
        assert_eq!(catalog.language("cobol").count(), 0);
        assert_eq!(catalog.framework("rails").count(), 0);
        assert_eq!(catalog.issue(IssueKind::Disk).count(), 0);
    }

    #[test]
    fn from_toml_loads_extra_groups() {
        let toml_str = r#"
[[groups]]
id = "go"
scope = { language = "go" }
limit = 2

[[groups.rules]]
text = "Run gofmt before committing"
category = "style"

[[groups.rules]]
text = "Return errors instead of panicking"
category = "general"
"#;
        let extra = RuleCatalog::from_toml(toml_str).unwrap();
        let mut catalog = RuleCatalog::builtin();
        catalog.extend(extra);
        let go = catalog.language("go").next().unwrap();
        assert_eq!(go.selected()[0].category, Category::Style);
        catalog.validate().unwrap();
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut catalog = RuleCatalog::builtin();
        catalog.extend(RuleCatalog::builtin());
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::DuplicateId(id)) if id == "general"
        ));
    }

    #[test]
    fn blank_rule_text_is_rejected() {
        let toml_str = r#"
[[groups]]
id = "blank"
scope = { framework = "vue" }

[[groups.rules]]
text = "   "
category = "general"
"#;
        assert!(RuleCatalog::from_toml(toml_str).is_err());
    }
}
