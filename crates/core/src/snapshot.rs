//! Signal snapshots: the read-only facts the engine works from.
//!
//! Snapshots are produced by external collaborators (project scanners,
//! metric samplers) and handed to the engine as JSON. Every section is
//! optional: anything absent deserializes to an empty default, so a partial
//! snapshot never fails synthesis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SnapshotError;
use crate::value::ConfigTree;

/// 1 GiB in bytes.
pub const GIB: u64 = 1024 * 1024 * 1024;

/// Project and editor facts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSnapshot {
    pub project_structure: ProjectStructure,
    pub vscode_settings: EditorSettings,
    pub usage_patterns: UsagePatterns,
    pub current_rules: CurrentRules,
    pub current_workflows: CurrentWorkflows,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectStructure {
    /// Detected languages, most significant first.
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub total_files: u64,
    pub project_type: String,
    /// File counts keyed by extension or name pattern.
    pub file_counts: BTreeMap<String, u64>,
}

impl Default for ProjectStructure {
    fn default() -> Self {
        Self {
            languages: vec![],
            frameworks: vec![],
            total_files: 0,
            project_type: "unknown".into(),
            file_counts: BTreeMap::new(),
        }
    }
}

impl ProjectStructure {
    pub fn has_language(&self, language: &str) -> bool {
        self.languages.iter().any(|l| l == language)
    }

    pub fn has_framework(&self, framework: &str) -> bool {
        self.frameworks.iter().any(|f| f == framework)
    }

    /// Languages and frameworks as one list, languages first.
    pub fn stack(&self) -> impl Iterator<Item = &str> {
        self.languages
            .iter()
            .chain(self.frameworks.iter())
            .map(String::as_str)
    }

    /// Distinct language count.
    pub fn language_count(&self) -> usize {
        let mut seen: Vec<&str> = Vec::with_capacity(self.languages.len());
        for language in &self.languages {
            if !seen.contains(&language.as_str()) {
                seen.push(language);
            }
        }
        seen.len()
    }
}

/// The editor's existing assistant settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub cline_settings: ConfigTree,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UsagePatterns {
    pub sessions_count: u64,
    /// Opaque error records; only their number matters to the engine.
    pub error_patterns: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentRules {
    pub exists: bool,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentWorkflows {
    pub exists: bool,
    pub workflows: BTreeMap<String, WorkflowFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowFile {
    pub content: String,
}

/// Host performance facts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSnapshot {
    /// `None` when the sampler produced no system metrics at all.
    pub system_metrics: Option<SystemMetrics>,
    pub performance_issues: Vec<PerformanceIssue>,
}

/// A sampler that fails reports `{}`; each section is `None` when it was
/// not sampled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<CpuMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryMetrics>,
}

impl SystemMetrics {
    pub fn is_empty(&self) -> bool {
        self.cpu.is_none() && self.memory.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuMetrics {
    pub percent: f64,
    pub count: u32,
}

impl Default for CpuMetrics {
    fn default() -> Self {
        Self {
            percent: 0.0,
            count: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryMetrics {
    pub percent: f64,
    /// Total physical memory in bytes.
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl PerformanceIssue {
    pub fn new(kind: IssueKind, severity: Severity) -> Self {
        Self {
            kind,
            severity,
            value: None,
            description: None,
            recommendation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Memory,
    Cpu,
    Disk,
    Swap,
    /// Anything a sampler reports that the engine has no remediation for.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    #[default]
    #[serde(other)]
    Low,
}

/// Everything the engine reads for one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub config: ConfigSnapshot,
    pub performance: PerformanceSnapshot,
}

impl Snapshot {
    pub fn new(config: ConfigSnapshot, performance: PerformanceSnapshot) -> Self {
        Self {
            config,
            performance,
        }
    }

    /// Parse both sections from their JSON documents.
    pub fn from_json(config: &str, performance: Option<&str>) -> Result<Self, SnapshotError> {
        let config: ConfigSnapshot =
            serde_json::from_str(config).map_err(|e| SnapshotError::Parse {
                section: "config",
                reason: e.to_string(),
            })?;
        let performance = match performance {
            Some(text) => serde_json::from_str(text).map_err(|e| SnapshotError::Parse {
                section: "performance",
                reason: e.to_string(),
            })?,
            None => PerformanceSnapshot::default(),
        };
        Ok(Self::new(config, performance))
    }

    pub fn project(&self) -> &ProjectStructure {
        &self.config.project_structure
    }

    /// Sampled system metrics, `None` when absent or empty.
    pub fn metrics(&self) -> Option<&SystemMetrics> {
        self.performance
            .system_metrics
            .as_ref()
            .filter(|m| !m.is_empty())
    }

    pub fn issues(&self) -> &[PerformanceIssue] {
        &self.performance.performance_issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_documents_fall_back_to_defaults() {
        let snapshot = Snapshot::from_json("{}", Some("{}")).unwrap();
        assert!(snapshot.project().languages.is_empty());
        assert_eq!(snapshot.project().project_type, "unknown");
        assert_eq!(snapshot.config.usage_patterns.sessions_count, 0);
        assert!(snapshot.performance.system_metrics.is_none());
        assert!(snapshot.issues().is_empty());
    }

    #[test]
    fn partial_metrics_fill_missing_fields() {
        let snapshot =
            Snapshot::from_json("{}", Some(r#"{"system_metrics": {"memory": {"percent": 85}}}"#))
                .unwrap();
        let metrics = snapshot.metrics().unwrap();
        let memory = metrics.memory.as_ref().unwrap();
        assert_eq!(memory.percent, 85.0);
        assert_eq!(memory.total, 0);
        assert!(metrics.cpu.is_none());
    }

    #[test]
    fn empty_metrics_object_counts_as_unsampled() {
        let snapshot = Snapshot::from_json("{}", Some(r#"{"system_metrics": {}}"#)).unwrap();
        assert!(snapshot.performance.system_metrics.is_some());
        assert!(snapshot.metrics().is_none());
    }

    #[test]
    fn unknown_issue_kinds_are_tolerated() {
        let perf = r#"{"performance_issues": [
            {"type": "memory", "severity": "high", "value": 93.5},
            {"type": "monitoring", "severity": "low"},
            {"type": "cpu"}
        ]}"#;
        let snapshot = Snapshot::from_json("{}", Some(perf)).unwrap();
        let kinds: Vec<IssueKind> = snapshot.issues().iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![IssueKind::Memory, IssueKind::Other, IssueKind::Cpu]);
        assert_eq!(snapshot.issues()[0].severity, Severity::High);
        assert_eq!(snapshot.issues()[2].severity, Severity::Low);
    }

    #[test]
    fn malformed_config_reports_section() {
        let err = Snapshot::from_json("{not json", None).unwrap_err();
        assert!(err.to_string().contains("config"));
    }

    #[test]
    fn language_count_ignores_duplicates() {
        let project = ProjectStructure {
            languages: vec!["python".into(), "rust".into(), "python".into()],
            ..Default::default()
        };
        assert_eq!(project.language_count(), 2);
    }
}
