//! Configuration loading and validation for autotune.
//!
//! Loads configuration from `~/.autotune/config.toml` with environment
//! variable overrides. Every section is optional; a missing file means
//! defaults.

use autotune_settings::Thresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.autotune/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where generated files are written
    #[serde(default)]
    pub paths: PathsConfig,

    /// Cut-offs for the settings layer selector
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Output formatting
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level and format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Extra catalog entries loaded on top of the built-in ones
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Rules file name, relative to the workspace
    #[serde(default = "default_rules_file")]
    pub rules_file: String,

    /// Workflow directory, relative to the workspace
    #[serde(default = "default_workflows_dir")]
    pub workflows_dir: String,

    /// Editor settings document. Platform default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_file: Option<PathBuf>,
}

fn default_rules_file() -> String {
    ".clinerules".into()
}
fn default_workflows_dir() -> String {
    ".cline/workflows".into()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            rules_file: default_rules_file(),
            workflows_dir: default_workflows_dir(),
            settings_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Prefix for assistant keys in the editor settings document
    #[serde(default = "default_prefix")]
    pub settings_prefix: String,

    /// Stamp generated files with the Unix epoch instead of the current
    /// time, so unchanged inputs regenerate byte-identical files
    #[serde(default)]
    pub fixed_timestamp: bool,
}

fn default_prefix() -> String {
    "cline.".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            settings_prefix: default_prefix(),
            fixed_timestamp: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// TOML file with extra rule groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<PathBuf>,

    /// TOML file with extra workflow templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflows: Option<PathBuf>,
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    /// Load configuration from the default path (~/.autotune/config.toml).
    ///
    /// Environment overrides:
    /// - `AUTOTUNE_SETTINGS_PATH` replaces `paths.settings_file`
    /// - `AUTOTUNE_LOG_LEVEL` replaces `logging.level`
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("AUTOTUNE_SETTINGS_PATH").filter(|p| !p.is_empty()) {
            self.paths.settings_file = Some(PathBuf::from(path));
        }
        if let Some(level) = lookup("AUTOTUNE_LOG_LEVEL").filter(|l| !l.is_empty()) {
            self.logging.level = level;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".autotune")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// The editor settings document to update.
    pub fn settings_path(&self) -> PathBuf {
        self.paths
            .settings_file
            .clone()
            .unwrap_or_else(default_settings_path)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds
            .check()
            .map_err(|reason| ConfigError::ValidationError(format!("thresholds: {reason}")))?;

        if self.output.settings_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "output.settings_prefix cannot be empty".into(),
            ));
        }

        if self.paths.rules_file.trim().is_empty() || self.paths.workflows_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "paths.rules_file and paths.workflows_dir cannot be empty".into(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// The editor's user settings document for this platform.
fn default_settings_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs_home().join("AppData").join("Roaming"))
            .join("Code")
            .join("User")
            .join("settings.json")
    }
    #[cfg(target_os = "macos")]
    {
        dirs_home()
            .join("Library")
            .join("Application Support")
            .join("Code")
            .join("User")
            .join("settings.json")
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        dirs_home()
            .join(".config")
            .join("Code")
            .join("User")
            .join("settings.json")
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
