//! Error and warning types for the autotune domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Synthesis itself never
//! fails: problems with caller-supplied prior state surface as [`Warning`]s
//! and the run continues with less information.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for autotune operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Snapshot errors ---
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    // --- Input files ---
    #[error("Failed to read {what} at {}: {source}", path.display())]
    Read {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum SnapshotError {
    #[error("invalid {section} snapshot: {reason}")]
    Parse {
        section: &'static str,
        reason: String,
    },
}

/// A non-fatal problem reported alongside a synthesis result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("existing settings could not be parsed, user settings not preserved: {reason}")]
    MalformedSettings { reason: String },

    #[error("existing rules could not be read, custom rules not preserved: {reason}")]
    MalformedRules { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_error_displays_section() {
        let err = Error::Snapshot(SnapshotError::Parse {
            section: "performance",
            reason: "expected value at line 1".into(),
        });
        assert!(err.to_string().contains("performance"));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn read_error_names_file() {
        let err = Error::Read {
            what: "config snapshot",
            path: PathBuf::from("/tmp/missing.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let text = err.to_string();
        assert!(text.contains("config snapshot"));
        assert!(text.contains("/tmp/missing.json"));
    }

    #[test]
    fn warning_mentions_consequence() {
        let warning = Warning::MalformedSettings {
            reason: "trailing comma".into(),
        };
        assert!(warning.to_string().contains("not preserved"));
        assert!(warning.to_string().contains("trailing comma"));
    }
}
