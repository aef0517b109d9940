//! Cut-offs the layer selector compares signals against.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Memory utilization (percent) above which the low-memory tier applies.
    pub memory_pressure_percent: f64,

    /// Total memory (GiB) below which the low-memory tier applies.
    pub low_memory_gib: f64,

    /// Total memory (GiB) above which the high-memory tier applies.
    pub high_memory_gib: f64,

    /// CPU utilization (percent) above which the low-CPU tier applies.
    pub cpu_pressure_percent: f64,

    /// Core count below which the low-CPU tier applies.
    pub low_cpu_count: u32,

    /// Core count above which the high-CPU tier applies.
    pub high_cpu_count: u32,

    pub large_project_files: u64,
    pub medium_project_files: u64,

    /// Distinct language count above which a project is polyglot.
    pub polyglot_languages: usize,

    pub experienced_sessions: u64,
    pub novice_sessions: u64,

    /// Error pattern count above which the determinism layer applies.
    pub error_pattern_limit: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            memory_pressure_percent: 80.0,
            low_memory_gib: 4.0,
            high_memory_gib: 16.0,
            cpu_pressure_percent: 80.0,
            low_cpu_count: 4,
            high_cpu_count: 8,
            large_project_files: 100,
            medium_project_files: 50,
            polyglot_languages: 2,
            experienced_sessions: 100,
            novice_sessions: 10,
            error_pattern_limit: 10,
        }
    }
}

impl Thresholds {
    /// Check internal consistency. Returns a description of the first
    /// problem found.
    pub fn check(&self) -> Result<(), String> {
        for (name, value) in [
            ("memory_pressure_percent", self.memory_pressure_percent),
            ("cpu_pressure_percent", self.cpu_pressure_percent),
        ] {
            if !(value > 0.0 && value <= 100.0) {
                return Err(format!("{name} must be in (0, 100], got {value}"));
            }
        }
        if self.low_memory_gib <= 0.0 {
            return Err("low_memory_gib must be positive".into());
        }
        if self.low_memory_gib >= self.high_memory_gib {
            return Err(format!(
                "low_memory_gib ({}) must be below high_memory_gib ({})",
                self.low_memory_gib, self.high_memory_gib
            ));
        }
        if self.low_cpu_count > self.high_cpu_count {
            return Err(format!(
                "low_cpu_count ({}) must not exceed high_cpu_count ({})",
                self.low_cpu_count, self.high_cpu_count
            ));
        }
        if self.medium_project_files >= self.large_project_files {
            return Err("medium_project_files must be below large_project_files".into());
        }
        if self.novice_sessions >= self.experienced_sessions {
            return Err("novice_sessions must be below experienced_sessions".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        Thresholds::default().check().unwrap();
    }

    #[test]
    fn inverted_memory_bounds_rejected() {
        let t = Thresholds {
            low_memory_gib: 32.0,
            ..Default::default()
        };
        assert!(t.check().unwrap_err().contains("high_memory_gib"));
    }

    #[test]
    fn percentage_out_of_range_rejected() {
        let t = Thresholds {
            cpu_pressure_percent: 0.0,
            ..Default::default()
        };
        assert!(t.check().is_err());
    }
}
