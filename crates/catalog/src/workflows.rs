//! Workflow templates: named, ordered procedures offered when their
//! scope and predicate match the project.

use autotune_core::{IssueKind, Predicate, ProjectCondition};
use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// Name of the synthesized performance workflow.
pub const PERFORMANCE_WORKFLOW_ID: &str = "performance_optimization";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowCatalog {
    #[serde(default)]
    pub templates: Vec<WorkflowTemplate>,
    pub performance: PerformanceWorkflow,
    /// Footer lines appended to every rendered workflow.
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowScope {
    /// Offered to every project.
    Base,
    /// Offered when this language appears in `languages`.
    Language(String),
    /// Offered when this framework appears in `frameworks`.
    Framework(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub steps: Vec<String>,
    pub scope: WorkflowScope,
    /// Extra gate checked after the scope matches.
    #[serde(default = "always")]
    pub when: Predicate,
}

fn always() -> Predicate {
    Predicate::Always
}

/// Generic optimization procedure plus one extra step per issue kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceWorkflow {
    pub template: WorkflowTemplate,
    #[serde(default)]
    pub issue_steps: Vec<IssueStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueStep {
    pub kind: IssueKind,
    pub step: String,
}

impl PerformanceWorkflow {
    pub fn step_for(&self, kind: IssueKind) -> Option<&str> {
        self.issue_steps
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.step.as_str())
    }
}

impl WorkflowTemplate {
    fn new(
        id: &str,
        name: &str,
        description: &str,
        scope: WorkflowScope,
        when: Predicate,
        steps: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
            scope,
            when,
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.id.trim().is_empty() {
            return Err(CatalogError::InvalidEntry {
                id: "(empty)".into(),
                reason: "workflow id cannot be empty".into(),
            });
        }
        if self.steps.is_empty() {
            return Err(CatalogError::InvalidEntry {
                id: self.id.clone(),
                reason: "workflow has no steps".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    templates: Vec<WorkflowTemplate>,
}

impl WorkflowCatalog {
    /// Templates offered to every project, in catalog order.
    pub fn base(&self) -> impl Iterator<Item = &WorkflowTemplate> {
        self.templates
            .iter()
            .filter(|t| t.scope == WorkflowScope::Base)
    }

    pub fn language(&self, name: &str) -> impl Iterator<Item = &WorkflowTemplate> {
        self.templates
            .iter()
            .filter(move |t| matches!(&t.scope, WorkflowScope::Language(l) if l == name))
    }

    pub fn framework(&self, name: &str) -> impl Iterator<Item = &WorkflowTemplate> {
        self.templates
            .iter()
            .filter(move |t| matches!(&t.scope, WorkflowScope::Framework(f) if f == name))
    }

    /// True when a template with this id exists. The performance workflow
    /// is not a template.
    pub fn is_template_id(&self, id: &str) -> bool {
        self.templates.iter().any(|t| t.id == id)
    }

    /// Parse extra templates from TOML and append them.
    pub fn extend_from_toml(&mut self, toml_str: &str) -> Result<usize, CatalogError> {
        let file: TemplateFile = toml::from_str(toml_str)?;
        let before = self.templates.len();
        self.templates.extend(file.templates);
        if let Err(e) = self.validate() {
            self.templates.truncate(before);
            return Err(e);
        }
        Ok(self.templates.len() - before)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        self.performance.template.validate()?;
        for (i, template) in self.templates.iter().enumerate() {
            template.validate()?;
            if template.id == self.performance.template.id
                || self.templates[..i].iter().any(|t| t.id == template.id)
            {
                return Err(CatalogError::DuplicateId(template.id.clone()));
            }
        }
        Ok(())
    }

    /// The built-in workflow catalog.
    pub fn builtin() -> Self {
        use WorkflowScope::{Base, Framework, Language};

        let templates = vec![
            WorkflowTemplate::new(
                "development",
                "Feature development",
                "Standard process for building a new feature",
                Base,
                Predicate::Always,
                &[
                    "Analyze requirements and plan the architecture",
                    "Create or update the technical specification",
                    "Implement the core logic",
                    "Write unit tests for the new functionality",
                    "Add integration tests where needed",
                    "Update documentation (README, docs, comments)",
                    "Run a code review and refactor where needed",
                    "Test in a staging environment",
                    "Add a changelog entry",
                    "Prepare the release",
                ],
            ),
            WorkflowTemplate::new(
                "bugfix",
                "Bug fixing",
                "Process for fixing a reported defect",
                Base,
                Predicate::Always,
                &[
                    "Reproduce and confirm the bug",
                    "Analyze the code and find the root cause",
                    "Write a test case that reproduces the bug",
                    "Fix the problem",
                    "Check that the new test passes",
                    "Run the full test suite",
                    "Update documentation if needed",
                    "Review the change",
                    "Verify the fix in a staging environment",
                    "Record the fix in the changelog",
                ],
            ),
            WorkflowTemplate::new(
                "refactoring",
                "Refactoring",
                "Improving the structure and quality of existing code",
                Base,
                Predicate::when(ProjectCondition::NeedsRefactoring),
                &[
                    "Identify the area to refactor",
                    "Write a refactoring plan",
                    "Add tests that pin down current behavior",
                    "Refactor in small steps",
                    "Run the tests after every significant change",
                    "Update documentation and comments",
                    "Check performance after refactoring",
                    "Review the changes",
                    "Run integration tests",
                    "Document what changed",
                ],
            ),
            WorkflowTemplate::new(
                "testing",
                "Testing",
                "Building and maintaining test coverage",
                Base,
                Predicate::unless(ProjectCondition::AdequateTests),
                &[
                    "Analyze current test coverage",
                    "Identify critical areas that need tests",
                    "Write unit tests for new components",
                    "Add integration tests",
                    "Add end-to-end tests where needed",
                    "Run tests automatically on every change",
                    "Mock external dependencies",
                    "Test edge cases and error paths",
                    "Review and improve coverage",
                    "Document the test scenarios",
                ],
            ),
            WorkflowTemplate::new(
                "deployment",
                "Deployment",
                "Releasing the application to production",
                Base,
                Predicate::when(ProjectCondition::Deployable),
                &[
                    "Prepare the production environment",
                    "Check that every test passes before deploying",
                    "Back up the current version",
                    "Update environment variables if needed",
                    "Deploy to production",
                    "Check service health after the deploy",
                    "Monitor logs and metrics",
                    "Smoke test the main functionality",
                    "Notify the team about the release",
                    "Update the deployment documentation",
                ],
            ),
            WorkflowTemplate::new(
                "python_setup",
                "Python project setup",
                "Initializing and configuring a Python project",
                Language("python".into()),
                Predicate::Always,
                &[
                    "Create a virtual environment (python -m venv venv)",
                    "Activate the virtual environment",
                    "Create requirements.txt or pyproject.toml",
                    "Install development tools (pytest, black, flake8)",
                    "Configure pre-commit hooks",
                    "Create a Python .gitignore",
                    "Configure the editor (VS Code settings)",
                    "Create the base project layout",
                    "Initialize the test framework",
                    "Write a README with run instructions",
                ],
            ),
            WorkflowTemplate::new(
                "python_package",
                "Python package",
                "Building a reusable Python package",
                Language("python".into()),
                Predicate::Always,
                &[
                    "Create setup.py or pyproject.toml",
                    "Define the package layout (__init__.py files)",
                    "Implement the module functionality",
                    "Write comprehensive tests",
                    "Write documentation (docstrings, README)",
                    "Set up CI to run the tests",
                    "Version the package (semantic versioning)",
                    "Create CHANGELOG.md",
                    "Prepare the PyPI release",
                    "Publish documentation on Read the Docs",
                ],
            ),
            WorkflowTemplate::new(
                "node_setup",
                "Node.js project setup",
                "Initializing a Node.js/npm project",
                Language("javascript".into()),
                Predicate::Any(vec![
                    Predicate::language("javascript"),
                    Predicate::language("typescript"),
                ]),
                &[
                    "Initialize the project (npm init)",
                    "Install development tools (eslint, prettier, jest)",
                    "Create .eslintrc and .prettierrc",
                    "Define npm scripts in package.json",
                    "Create a Node.js .gitignore",
                    "Configure Jest",
                    "Create the base project layout (src, tests)",
                    "Configure Babel if needed",
                    "Initialize the Git repository",
                    "Write a README with instructions",
                ],
            ),
            WorkflowTemplate::new(
                "react_component",
                "React component",
                "Developing a React component",
                Language("javascript".into()),
                Predicate::when(ProjectCondition::ReactIndicators),
                &[
                    "Plan the component interface and props",
                    "Create the component skeleton",
                    "Add PropTypes or TypeScript types",
                    "Write unit tests with Jest and React Testing Library",
                    "Add a Storybook story",
                    "Add styling (CSS or styled-components)",
                    "Test accessibility (a11y)",
                    "Optimize rendering (React.memo, useMemo)",
                    "Integrate into the application",
                    "Document the component and its API",
                ],
            ),
            WorkflowTemplate::new(
                "django_app",
                "Django app",
                "Developing a new Django app",
                Framework("django".into()),
                Predicate::Always,
                &[
                    "Create the app (python manage.py startapp)",
                    "Register the app in settings.py",
                    "Define models in models.py",
                    "Create and apply migrations",
                    "Write views for request handling",
                    "Configure URLs in urls.py",
                    "Create templates under templates/",
                    "Write tests for models and views",
                    "Add Django forms where needed",
                    "Configure the admin interface",
                ],
            ),
            WorkflowTemplate::new(
                "flask_api",
                "Flask API",
                "Developing a RESTful API with Flask",
                Framework("flask".into()),
                Predicate::Always,
                &[
                    "Set up the Flask application and blueprints",
                    "Define models with SQLAlchemy",
                    "Configure serialization with Marshmallow",
                    "Add CRUD endpoints",
                    "Add input validation",
                    "Configure authentication and authorization",
                    "Write unit and integration tests",
                    "Generate API documentation (Swagger/OpenAPI)",
                    "Add logging and error handling",
                    "Configure CORS and security headers",
                ],
            ),
        ];

        let performance = PerformanceWorkflow {
            template: WorkflowTemplate::new(
                PERFORMANCE_WORKFLOW_ID,
                "Performance optimization",
                "Finding and removing performance bottlenecks",
                Base,
                Predicate::when(ProjectCondition::PerformanceIssues),
                &[
                    "Profile the application to find bottlenecks",
                    "Analyze memory and CPU usage",
                    "Optimize algorithms and data structures",
                    "Introduce caching where appropriate",
                    "Optimize database queries",
                    "Minify and compress static assets",
                    "Configure a CDN and load balancing",
                    "Monitor performance metrics",
                    "A/B test the optimizations",
                    "Document the performance changes",
                ],
            ),
            issue_steps: vec![
                IssueStep {
                    kind: IssueKind::Memory,
                    step: "Analyze memory leaks and tune garbage collection".into(),
                },
                IssueStep {
                    kind: IssueKind::Cpu,
                    step: "Parallelize CPU-intensive operations".into(),
                },
            ],
        };

        let notes = [
            "Always back up before critical changes",
            "Review every significant change",
            "Record every change in the changelog",
            "Test changes in an isolated environment",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            templates,
            performance,
            notes,
        }
    }
}
