//! # Autotune Settings
//!
//! Adaptive settings synthesis. A fixed baseline is overlaid with partial
//! trees chosen from the project and host signals in a [`Snapshot`]:
//!
//! ```text
//! defaults → project type → memory/cpu tiers → remediation → scale → usage → user
//! ```
//!
//! Later layers win. The merged tree is then used to derive flat editor
//! keys, and the whole result can be written back into the editor's
//! settings document under a key prefix.
//!
//! [`Snapshot`]: autotune_core::Snapshot

pub mod editor;
pub mod existing;
pub mod selector;
pub mod summary;
pub mod synthesize;
pub mod thresholds;

pub use editor::derive_editor_settings;
pub use existing::SettingsDocument;
pub use selector::{SETTINGS_PREFIX, select_layers, select_layers_with_existing, user_layer};
pub use summary::export_summary;
pub use synthesize::{SettingsSynthesizer, SynthesizedConfig};
pub use thresholds::Thresholds;
