//! Core types for settings documents.

use serde::{Deserialize, Serialize};

/// Semantic view of one `[section]` of a document.
///
/// Comments, blank lines and duplicate declarations are not represented
/// here: a key declared twice shows up once, with its last value, at the
/// position of its first declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section name, without brackets
    pub name: String,
    /// Properties in file order
    pub properties: Vec<(String, String)>,
}

impl Section {
    /// Create an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Builder-style property setter, used mostly by tests.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    /// Look up a property value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or overwrite, keeping the position of an existing key.
    pub(crate) fn insert(&mut self, key: String, value: String) {
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.properties.push((key, value)),
        }
    }
}

/// Line terminator of a physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineEnding {
    /// Last line of a file without trailing newline
    None,
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// The terminator as written to disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Options controlling how a document is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Characters that start a full-line comment
    pub comment_prefixes: Vec<char>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            comment_prefixes: vec!['#', ';'],
        }
    }
}

impl ParseOptions {
    /// Only treat `#` as a comment prefix.
    pub fn hash_only() -> Self {
        Self {
            comment_prefixes: vec!['#'],
        }
    }

    pub(crate) fn is_comment(&self, trimmed: &str) -> bool {
        trimmed
            .chars()
            .next()
            .is_some_and(|c| self.comment_prefixes.contains(&c))
    }
}
