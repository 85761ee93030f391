//! Build properties - flat, ordered `key=value` maps with `{placeholder}` expansion.
//!
//! The same format is used for `boards.txt`, IDE `preferences.txt`, the
//! property dump produced by the build engine, and `--build-property`
//! arguments.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};

/// Expansion stops after this many passes so self-referencing
/// properties cannot loop forever.
const MAX_EXPANSION_DEPTH: usize = 10;

/// An insertion-ordered string map.
///
/// Re-setting an existing key keeps its original position and replaces
/// the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    keys: Vec<String>,
    values: HashMap<String, String>,
}

impl PropertyMap {
    /// Create an empty map.
    pub fn new() -> Self {
        PropertyMap::default()
    }

    /// Parse `key=value` lines.
    ///
    /// Blank lines and lines starting with `#` are skipped. Lines without
    /// `=` are ignored. Keys and values are trimmed.
    pub fn parse(text: &str) -> Self {
        let mut map = PropertyMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                map.set(key.trim(), value.trim());
            }
        }
        map
    }

    /// Load and parse a properties file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read properties file: {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    /// Parse a single `key=value` assignment.
    pub fn parse_assignment(assignment: &str) -> Option<(&str, &str)> {
        let (key, value) = assignment.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key, value.trim()))
    }

    /// Set a value, keeping the key's original position if it exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if !self.values.contains_key(&key) {
            self.keys.push(key.clone());
        }
        self.values.insert(key, value.into());
    }

    /// Get a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys
            .iter()
            .filter_map(|k| self.values.get(k).map(|v| (k.as_str(), v.as_str())))
    }

    /// Entries under `prefix.`, with the prefix stripped.
    ///
    /// `sub_tree("last.ide")` on `last.ide.1.8.hardwarepath=/x` yields
    /// `1.8.hardwarepath=/x`.
    pub fn sub_tree(&self, prefix: &str) -> PropertyMap {
        let dotted = format!("{}.", prefix);
        let mut sub = PropertyMap::new();
        for (key, value) in self.iter() {
            if let Some(rest) = key.strip_prefix(&dotted) {
                if !rest.is_empty() {
                    sub.set(rest, value);
                }
            }
        }
        sub
    }

    /// Replace `{key}` placeholders with their values.
    ///
    /// Substituted values are expanded again, up to a fixed depth.
    /// Placeholders with no matching key are left untouched.
    pub fn expand(&self, template: &str) -> String {
        let mut current = template.to_string();
        for _ in 0..MAX_EXPANSION_DEPTH {
            let next = self.expand_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn expand_once(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after_open = &rest[open + 1..];
            match after_open.find('}') {
                Some(close) => {
                    let key = &after_open[..close];
                    match self.get(key) {
                        Some(value) if !key.contains('{') => out.push_str(value),
                        _ => {
                            // Keep the brace and continue scanning after it, so
                            // a nested `{{a}}` still gets its inner key expanded.
                            out.push('{');
                            rest = after_open;
                            continue;
                        }
                    }
                    rest = &after_open[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for PropertyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            writeln!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (key, value) in iter {
            map.set(key, value);
        }
        map
    }
}

/// Combine engine defaults with request-supplied `key=value` properties.
///
/// Defaults come first so that, with the engine's later-wins merge, an
/// explicit property for the same key overrides the default.
pub fn merge_custom_properties(defaults: &[String], overrides: &[String]) -> Vec<String> {
    defaults.iter().chain(overrides.iter()).cloned().collect()
}

/// Fold a list of `key=value` assignments into a map, later entries winning.
pub fn resolve_custom_properties(assignments: &[String]) -> PropertyMap {
    let mut map = PropertyMap::new();
    for assignment in assignments {
        match PropertyMap::parse_assignment(assignment) {
            Some((key, value)) => map.set(key, value),
            None => tracing::warn!("ignoring malformed build property `{}`", assignment),
        }
    }
    map
}
