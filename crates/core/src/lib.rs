//! # Autotune Core
//!
//! Domain types for adaptive assistant configuration: the configuration
//! value model and its deep merge, the signal snapshot the engine reads,
//! applicability predicates, and candidate/selection types.
//!
//! ## Design Philosophy
//!
//! Everything here is pure data plus pure functions. Catalogs, the layer
//! selector and the selection engines live in their own crates and depend
//! inward on core; nothing in core performs I/O.

pub mod candidate;
pub mod error;
pub mod merge;
pub mod predicate;
pub mod snapshot;
pub mod value;

// Re-export key types at crate root for ergonomics
pub use candidate::{CandidateItem, Category, CategoryGroup, SelectionResult, SourceTag};
pub use error::{Error, Result, SnapshotError, Warning};
pub use merge::{Layer, merge, merge_layers};
pub use predicate::{Predicate, ProjectCondition};
pub use snapshot::{
    ConfigSnapshot, IssueKind, PerformanceIssue, PerformanceSnapshot, ProjectStructure, Severity,
    Snapshot,
};
pub use value::{ConfigTree, ConfigValue, Scalar};
