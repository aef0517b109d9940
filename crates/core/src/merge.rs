//! Deep merge of configuration trees.
//!
//! Merge semantics:
//! - Mappings: deep-merge by key (recursive)
//! - Sequences: REPLACE (overlay wins entirely)
//! - Scalars: override (overlay wins)
//!
//! Both inputs are borrowed; the result is always a freshly built tree, so a
//! sub-tree reused by several layer definitions can never be aliased into the
//! output and mutated through it.

use serde::{Deserialize, Serialize};

use crate::value::{ConfigTree, ConfigValue};

/// A named partial configuration tree. Its precedence is its position in
/// the list handed to [`merge_layers`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub tree: ConfigTree,
}

impl Layer {
    pub fn new(name: impl Into<String>, tree: ConfigTree) -> Self {
        Self {
            name: name.into(),
            tree,
        }
    }
}

/// Merge `overlay` on top of `base`, returning a new tree.
pub fn merge(base: &ConfigTree, overlay: &ConfigTree) -> ConfigTree {
    let mut merged: ConfigTree = base
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (key, overlay_value) in overlay.iter() {
        let value = match (base.get(key), overlay_value) {
            (Some(ConfigValue::Mapping(base_tree)), ConfigValue::Mapping(overlay_tree)) => {
                ConfigValue::Mapping(merge(base_tree, overlay_tree))
            }
            // Sequences and scalars: overlay wins wholesale
            _ => overlay_value.clone(),
        };
        merged.insert(key.clone(), value);
    }

    merged
}

/// Fold layers in order (first is lowest precedence, last wins).
pub fn merge_layers(layers: &[Layer]) -> ConfigTree {
    layers.iter().fold(ConfigTree::new(), |acc, layer| {
        tracing::trace!(layer = %layer.name, keys = layer.tree.len(), "Merging layer");
        merge(&acc, &layer.tree)
    })
}
