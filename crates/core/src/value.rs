//! The configuration value model.
//!
//! A [`ConfigTree`] is a string-keyed mapping whose values are either scalars,
//! ordered sequences, or nested trees. Keys are kept sorted so that rendering
//! a tree is deterministic regardless of the order layers were written in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// A node in a configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Scalar(Scalar),
    Sequence(Vec<ConfigValue>),
    Mapping(ConfigTree),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Scalar(Scalar::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Scalar(Scalar::Integer(i)) => Some(*i as f64),
            ConfigValue::Scalar(Scalar::Float(f)) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&ConfigTree> {
        match self {
            ConfigValue::Mapping(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, ConfigValue::Mapping(_))
    }

    /// Convert into a `serde_json::Value`. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            ConfigValue::Scalar(Scalar::Null) => Value::Null,
            ConfigValue::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            ConfigValue::Scalar(Scalar::Integer(i)) => Value::Number((*i).into()),
            ConfigValue::Scalar(Scalar::Float(f)) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ConfigValue::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            ConfigValue::Sequence(items) => {
                Value::Array(items.iter().map(ConfigValue::to_json).collect())
            }
            ConfigValue::Mapping(tree) => tree.to_json(),
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ConfigValue::Scalar(Scalar::Null),
            Value::Bool(b) => ConfigValue::Scalar(Scalar::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Scalar(Scalar::Integer(i)),
                None => ConfigValue::Scalar(n.as_f64().map_or(Scalar::Null, Scalar::Float)),
            },
            Value::String(s) => ConfigValue::Scalar(Scalar::String(s)),
            Value::Array(items) => {
                ConfigValue::Sequence(items.into_iter().map(ConfigValue::from).collect())
            }
            Value::Object(map) => ConfigValue::Mapping(ConfigTree::from(map)),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Scalar(Scalar::Integer(i))
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Scalar(Scalar::Float(f))
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Scalar(Scalar::String(s))
    }
}

impl From<ConfigTree> for ConfigValue {
    fn from(tree: ConfigTree) -> Self {
        ConfigValue::Mapping(tree)
    }
}

/// A string-keyed configuration mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree(BTreeMap<String, ConfigValue>);

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a JSON literal. Anything other than an object
    /// yields an empty tree.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self::from(map),
            _ => Self::default(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    /// Look up a dot-separated path, e.g. `performance.enableCaching`.
    pub fn get_path(&self, path: &str) -> Option<&ConfigValue> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.as_tree()?.get(part)?;
        }
        Some(current)
    }

    pub fn get_tree(&self, key: &str) -> Option<&ConfigTree> {
        self.get(key).and_then(ConfigValue::as_tree)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for ConfigTree {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(
            map.into_iter()
                .map(|(k, v)| (k, ConfigValue::from(v)))
                .collect(),
        )
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigTree {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ConfigTree {
    type Item = (String, ConfigValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
