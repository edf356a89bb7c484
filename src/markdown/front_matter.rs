//! The metadata block at the top of a document.
//!
//! Only a small subset of YAML is understood: `key: value` scalars and
//! `key:` followed by indented `- item` lines. Anything else inside the block
//! is skipped.

use std::fmt;

use serde::{Serialize, ser::SerializeMap};

/// The line that opens and closes a front-matter block.
pub const DELIMITER: &str = "---";

/// The value stored under a front-matter key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A single-line value, kept exactly as written (inline lists included).
    Scalar(String),
    /// A block list of items.
    List(Vec<String>),
}

impl Value {
    /// Returns the scalar text, if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// An ordered mapping of front-matter keys to values.
///
/// Keys are unique and keep the order in which they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    entries: Vec<(String, Value)>,
}

impl FrontMatter {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Splits a document into its front matter and body.
    ///
    /// If the text does not start with a delimiter line, or the block is never
    /// closed, the front matter is empty and the whole text is the body.
    #[must_use]
    pub fn split(text: &str) -> (Self, &str) {
        match split_block(text) {
            Some((block, body)) => (Self::parse(block), body),
            None => (Self::new(), text),
        }
    }

    /// Parses the lines between the delimiters.
    #[must_use]
    pub fn parse(block: &str) -> Self {
        let mut front_matter = Self::new();
        block
            .lines()
            .fold(State::ExpectKey, |state, line| {
                state.next(line, &mut front_matter)
            });
        front_matter
    }

    /// Whether the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Sets `key` to `value`.
    ///
    /// An existing key keeps its position and its previous value is returned;
    /// a new key is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn push_item(&mut self, key: &str, item: String) {
        if let Some((_, Value::List(items))) =
            self.entries.iter_mut().find(|(k, _)| k.as_str() == key)
        {
            items.push(item);
        }
    }
}

/// Returns the text between the delimiter lines and the text after the
/// closing delimiter.
fn split_block(text: &str) -> Option<(&str, &str)> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != DELIMITER {
        return None;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            return Some((&text[start..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parser state while scanning the metadata block line by line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    /// Waiting for a `key: value` line.
    ExpectKey,
    /// Collecting `- item` lines for the list under this key.
    InList(String),
}

impl State {
    fn next(self, line: &str, front_matter: &mut FrontMatter) -> Self {
        let line = line.trim_end();
        if line.is_empty() {
            return self;
        }

        if let Self::InList(key) = &self {
            if let Some(item) = list_item(line) {
                front_matter.push_item(key, item.to_string());
                return self;
            }
        }

        match key_value(line) {
            Some((key, value)) if value.is_empty() => {
                front_matter.insert(key, Value::List(Vec::new()));
                Self::InList(key.to_string())
            }
            Some((key, value)) => {
                front_matter.insert(key, value);
                Self::ExpectKey
            }
            None => {
                tracing::debug!("Skipping unrecognised front matter line: {line}");
                self
            }
        }
    }
}

fn list_item(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix("- ")
        .map(str::trim)
        .or_else(|| (trimmed == "-").then_some(""))
}

fn key_value(line: &str) -> Option<(&str, &str)> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    (!key.is_empty()).then(|| (key, value.trim()))
}

impl fmt::Display for FrontMatter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{DELIMITER}")?;
        for (key, value) in &self.entries {
            match value {
                Value::Scalar(s) => writeln!(f, "{key}: {s}")?,
                Value::List(items) => {
                    writeln!(f, "{key}:")?;
                    for item in items {
                        writeln!(f, "  - {item}")?;
                    }
                }
            }
        }
        writeln!(f, "{DELIMITER}")
    }
}

impl Serialize for FrontMatter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
