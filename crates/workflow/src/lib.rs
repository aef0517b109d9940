//! Workflow optimizer: picks procedural workflows for a project.
//!
//! Base workflows are offered by predicate, then language and framework
//! workflows in snapshot order. User-authored workflows that do not collide
//! with a catalog template are kept verbatim. When the host reported
//! performance issues, a performance workflow is synthesized last with one
//! extra step per issue.

use autotune_catalog::{PerformanceWorkflow, WorkflowCatalog, WorkflowTemplate};
use autotune_core::Snapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

/// Where a workflow in the output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowOrigin {
    Catalog,
    Custom,
    Performance,
}

impl WorkflowOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowOrigin::Catalog => "catalog",
            WorkflowOrigin::Custom => "custom",
            WorkflowOrigin::Performance => "performance",
        }
    }
}

/// One workflow file, named without extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowFile {
    pub name: String,
    pub content: String,
    pub origin: WorkflowOrigin,
}

/// Ordered name → content mapping. Inserting an existing name replaces the
/// content in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WorkflowSet {
    files: Vec<WorkflowFile>,
}

impl WorkflowSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, file: WorkflowFile) {
        match self.files.iter_mut().find(|f| f.name == file.name) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
    }

    pub fn get(&self, name: &str) -> Option<&WorkflowFile> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkflowFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl IntoIterator for WorkflowSet {
    type Item = WorkflowFile;
    type IntoIter = std::vec::IntoIter<WorkflowFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

/// Selects and renders workflows from a catalog.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowOptimizer<'a> {
    catalog: &'a WorkflowCatalog,
}

impl<'a> WorkflowOptimizer<'a> {
    pub fn new(catalog: &'a WorkflowCatalog) -> Self {
        Self { catalog }
    }

    /// Templates that apply to `snapshot`, in output order. A template
    /// reachable through two scopes appears once.
    pub fn applicable(&self, snapshot: &Snapshot) -> Vec<&'a WorkflowTemplate> {
        let project = snapshot.project();
        let scoped = self
            .catalog
            .base()
            .chain(project.languages.iter().flat_map(|l| self.catalog.language(l)))
            .chain(project.frameworks.iter().flat_map(|f| self.catalog.framework(f)));

        let mut selected: Vec<&'a WorkflowTemplate> = Vec::new();
        for template in scoped {
            if !template.when.matches(snapshot) {
                debug!(workflow = %template.id, "Workflow predicate does not hold");
                continue;
            }
            if !selected.iter().any(|t| t.id == template.id) {
                selected.push(template);
            }
        }
        selected
    }

    /// Build the full workflow set for `snapshot`.
    pub fn optimize(&self, snapshot: &Snapshot, generated_at: DateTime<Utc>) -> WorkflowSet {
        let mut set = WorkflowSet::new();

        for template in self.applicable(snapshot) {
            set.upsert(WorkflowFile {
                name: template.id.clone(),
                content: render_workflow(template, &[], &self.catalog.notes, generated_at),
                origin: WorkflowOrigin::Catalog,
            });
        }

        let current = &snapshot.config.current_workflows;
        if current.exists {
            for (name, file) in &current.workflows {
                if self.catalog.is_template_id(name) {
                    debug!(workflow = %name, "Existing workflow superseded by catalog");
                    continue;
                }
                set.upsert(WorkflowFile {
                    name: name.clone(),
                    content: file.content.clone(),
                    origin: WorkflowOrigin::Custom,
                });
            }
        }

        if !snapshot.issues().is_empty() {
            let performance = &self.catalog.performance;
            let extra = issue_steps(performance, snapshot);
            set.upsert(WorkflowFile {
                name: performance.template.id.clone(),
                content: render_workflow(
                    &performance.template,
                    &extra,
                    &self.catalog.notes,
                    generated_at,
                ),
                origin: WorkflowOrigin::Performance,
            });
        }

        info!(count = set.len(), workflows = ?set.names(), "Workflows optimized");
        set
    }
}

/// One extra step per reported issue, in report order, without dedup.
fn issue_steps<'c>(performance: &'c PerformanceWorkflow, snapshot: &Snapshot) -> Vec<&'c str> {
    snapshot
        .issues()
        .iter()
        .filter_map(|issue| performance.step_for(issue.kind))
        .collect()
}

/// Render a workflow as markdown: numbered steps, then any extra steps as
/// bullets, then the notes footer and generation time.
pub fn render_workflow(
    template: &WorkflowTemplate,
    extra_steps: &[&str],
    notes: &[String],
    generated_at: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        format!("# {}", template.name),
        String::new(),
        format!("**Description:** {}", template.description),
        String::new(),
        "## Steps".to_string(),
        String::new(),
    ];
    lines.extend(
        template
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {step}", i + 1)),
    );
    lines.extend(extra_steps.iter().map(|step| format!("- {step}")));

    if !notes.is_empty() {
        lines.push(String::new());
        lines.push("## Notes".to_string());
        lines.push(String::new());
        lines.extend(notes.iter().map(|note| format!("- {note}")));
    }

    lines.push(String::new());
    lines.push(format!(
        "*Generated automatically: {}*",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.join("\n")
}
