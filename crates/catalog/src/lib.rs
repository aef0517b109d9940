//! # Autotune Catalog
//!
//! Immutable catalogs the engine selects from: settings profiles, advisory
//! rules and workflow templates. Catalogs are plain values built once
//! (usually via [`Catalog::builtin`]) and passed by reference into every
//! synthesis call, so tests can substitute their own.
//!
//! Extra rules and workflow templates can be loaded from TOML:
//!
//! ```toml
//! [[groups]]
//! id = "go"
//! scope = { language = "go" }
//! limit = 2
//!
//! [[groups.rules]]
//! text = "Run gofmt before committing"
//! category = "style"
//! ```

pub mod rules;
pub mod settings;
pub mod workflows;

pub use rules::{RuleCatalog, RuleEntry, RuleGroup, RuleScope};
pub use settings::SettingsCatalog;
pub use workflows::{
    PERFORMANCE_WORKFLOW_ID, PerformanceWorkflow, WorkflowCatalog, WorkflowScope, WorkflowTemplate,
};

/// Errors from loading or validating catalog data.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid catalog entry '{id}': {reason}")]
    InvalidEntry { id: String, reason: String },

    #[error("duplicate catalog id '{0}'")]
    DuplicateId(String),

    #[error("catalog file error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// All three catalogs together.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub settings: SettingsCatalog,
    pub rules: RuleCatalog,
    pub workflows: WorkflowCatalog,
}

impl Catalog {
    pub fn builtin() -> Self {
        let catalog = Self {
            settings: SettingsCatalog::builtin(),
            rules: RuleCatalog::builtin(),
            workflows: WorkflowCatalog::builtin(),
        };
        tracing::debug!(
            rules = catalog.rules.len(),
            workflows = catalog.workflows.templates.len(),
            profiles = catalog.settings.profiles.len(),
            "Built-in catalog loaded"
        );
        catalog
    }

    /// Merge extra rule groups and workflow templates from files on disk.
    /// Either path may be absent.
    pub fn with_extensions(
        mut self,
        rules_path: Option<&std::path::Path>,
        workflows_path: Option<&std::path::Path>,
    ) -> Result<Self, CatalogError> {
        if let Some(path) = rules_path {
            let content = std::fs::read_to_string(path)?;
            let extra = RuleCatalog::from_toml(&content)?;
            tracing::info!(path = %path.display(), groups = extra.groups.len(), "Loaded extra rules");
            self.rules.extend(extra);
            self.rules.validate()?;
        }
        if let Some(path) = workflows_path {
            let content = std::fs::read_to_string(path)?;
            let added = self.workflows.extend_from_toml(&content)?;
            tracing::info!(path = %path.display(), templates = added, "Loaded extra workflows");
        }
        Ok(self)
    }
}
