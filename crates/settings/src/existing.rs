//! The editor's settings document: reading prior assistant values out of
//! it and writing synthesized entries back in.

use autotune_core::{ConfigTree, ConfigValue, Warning};
use serde_json::{Map, Value};
use tracing::warn;

/// A parsed editor settings document: one flat JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsDocument {
    entries: Map<String, Value>,
}

impl SettingsDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse document text. The editor writes JSON with comments, so `//`
    /// and `/* */` comments and trailing commas are accepted. Blank text is
    /// an empty document; anything that is not a JSON object is reported as
    /// a warning.
    pub fn parse(text: &str) -> Result<Self, Warning> {
        let json = strip_jsonc(text);
        if json.trim().is_empty() {
            return Ok(Self::new());
        }
        match serde_json::from_str::<Value>(&json) {
            Ok(Value::Object(entries)) => Ok(Self { entries }),
            Ok(other) => Err(Warning::MalformedSettings {
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
            Err(e) => Err(Warning::MalformedSettings {
                reason: e.to_string(),
            }),
        }
    }

    /// Parse a document read from disk. Bytes that are not UTF-8 are
    /// reported like any other malformed document.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Warning> {
        let text = std::str::from_utf8(bytes).map_err(|e| Warning::MalformedSettings {
            reason: e.to_string(),
        })?;
        Self::parse(text)
    }

    /// Parse, falling back to an empty document and logging the warning.
    pub fn parse_lossy(text: &str) -> (Self, Option<Warning>) {
        match Self::parse(text) {
            Ok(doc) => (doc, None),
            Err(warning) => {
                warn!(%warning, "Ignoring existing settings document");
                (Self::new(), Some(warning))
            }
        }
    }

    /// Entries whose key starts with `prefix`, keys kept as written.
    pub fn assistant_settings(&self, prefix: &str) -> ConfigTree {
        self.entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), ConfigValue::from(value.clone())))
            .collect()
    }

    /// Insert or overwrite entries. Keys not mentioned are left untouched.
    pub fn apply<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut changed = 0;
        for (key, value) in entries {
            if self.entries.get(&key) != Some(&value) {
                changed += 1;
            }
            self.entries.insert(key, value);
        }
        changed
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_string_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}

/// Remove comments and trailing commas, leaving string literals intact.
fn strip_jsonc(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    if skipped == '\n' {
                        out.push('\n');
                    }
                    prev = skipped;
                }
                out.push(' ');
            }
            ('}' | ']', _) => {
                let trimmed = out.trim_end().len();
                if out[..trimmed].ends_with(',') {
                    out.remove(trimmed - 1);
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
