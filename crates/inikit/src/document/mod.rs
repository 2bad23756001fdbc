//! Format-preserving settings documents.
//!
//! A [`Document`] keeps every physical line of the file it was parsed from,
//! so writing an unmodified document reproduces the input byte for byte.
//! Edits touch only the lines they concern.

pub mod parser;
pub mod writer;

pub use parser::{parse_bytes, parse_string};
pub use writer::{write_bytes, write_string};

use crate::error::{Error, Result};
use crate::types::{LineEnding, ParseOptions, Section};
use std::fmt;

/// What a physical line means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineKind {
    Blank,
    Comment,
    Header,
    Property {
        key: String,
        value: String,
        /// Byte offset of the value within the line text
        value_start: usize,
    },
}

/// One physical line, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    pub(crate) text: String,
    pub(crate) eol: LineEnding,
    pub(crate) kind: LineKind,
}

impl Line {
    fn blank(eol: LineEnding) -> Self {
        Self {
            text: String::new(),
            eol,
            kind: LineKind::Blank,
        }
    }

    fn header(name: &str, eol: LineEnding) -> Self {
        Self {
            text: format!("[{name}]"),
            eol,
            kind: LineKind::Header,
        }
    }

    fn property(key: &str, value: &str, eol: LineEnding) -> Self {
        Self {
            text: format!("{key} = {value}"),
            eol,
            kind: LineKind::Property {
                key: key.to_string(),
                value: value.to_string(),
                value_start: key.len() + 3,
            },
        }
    }

    pub(crate) fn is_blank(&self) -> bool {
        matches!(self.kind, LineKind::Blank)
    }

    pub(crate) fn is_comment(&self) -> bool {
        matches!(self.kind, LineKind::Comment)
    }

    pub(crate) fn key(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Property { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Replace the value, keeping the `key =` prefix and its spacing.
    fn set_value(&mut self, new_value: &str) {
        if let LineKind::Property {
            value, value_start, ..
        } = &mut self.kind
        {
            self.text.truncate(*value_start);
            // `key =` with an empty value: keep the spacing symmetric
            if self.text.ends_with('=')
                && self.text[..self.text.len() - 1].ends_with(char::is_whitespace)
                && !new_value.is_empty()
            {
                self.text.push(' ');
                *value_start += 1;
            }
            self.text.push_str(new_value);
            *value = new_value.to_string();
        }
    }
}

/// A `[section]` header with the lines that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block {
    pub(crate) name: String,
    /// Comment run set off above the header by a blank line, and separators
    /// added on insert
    pub(crate) leading: Vec<Line>,
    pub(crate) header: Line,
    pub(crate) body: Vec<Line>,
}

impl Block {
    fn to_section(&self) -> Section {
        let mut section = Section::new(self.name.clone());
        for line in &self.body {
            if let LineKind::Property { key, value, .. } = &line.kind {
                section.insert(key.clone(), value.clone());
            }
        }
        section
    }

    pub(crate) fn lines(&self) -> impl Iterator<Item = &Line> {
        self.leading
            .iter()
            .chain(std::iter::once(&self.header))
            .chain(self.body.iter())
    }
}

/// A parsed settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub(crate) bom: bool,
    /// Terminator used for lines created by edits
    pub(crate) newline: LineEnding,
    pub(crate) options: ParseOptions,
    /// Blank and comment lines before the first section
    pub(crate) preamble: Vec<Line>,
    pub(crate) blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    /// Create an empty document using the given comment conventions.
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            bom: false,
            newline: LineEnding::Lf,
            options,
            preamble: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Parse a document with default options.
    pub fn parse(content: &str) -> Result<Self> {
        parser::parse_string(content, &ParseOptions::default())
    }

    /// Check if the document has no lines at all.
    pub fn is_empty(&self) -> bool {
        self.preamble.is_empty() && self.blocks.is_empty()
    }

    /// Semantic view of all sections, in file order.
    pub fn sections(&self) -> Vec<Section> {
        self.blocks.iter().map(Block::to_section).collect()
    }

    /// Semantic view of one section.
    pub fn section(&self, name: &str) -> Option<Section> {
        self.block(name).map(Block::to_section)
    }

    /// Check if a section exists.
    pub fn has_section(&self, name: &str) -> bool {
        self.block(name).is_some()
    }

    /// Append an empty section at the end of the document.
    ///
    /// Returns `false` if the section already exists.
    pub fn add_section(&mut self, name: &str) -> Result<bool> {
        validate_section_name(name)?;
        if self.has_section(name) {
            return Ok(false);
        }

        let mut leading = Vec::new();
        if self.last_line().is_some_and(|l| !l.is_blank()) {
            leading.push(Line::blank(self.newline));
        }

        self.blocks.push(Block {
            name: name.to_string(),
            leading,
            header: Line::header(name, self.newline),
            body: Vec::new(),
        });
        Ok(true)
    }

    /// Set a property, appending it to the section if it is new.
    ///
    /// An existing key is rewritten in place and any later duplicate
    /// declarations of it are dropped. Returns whether the document changed.
    pub fn set_property(&mut self, section: &str, key: &str, value: &str) -> Result<bool> {
        self.validate_key(key)?;
        validate_value(key, value)?;
        let newline = self.newline;
        let block = self.block_mut(section)?;

        let positions: Vec<usize> = block
            .body
            .iter()
            .enumerate()
            .filter(|(_, l)| l.key() == Some(key))
            .map(|(i, _)| i)
            .collect();

        let Some((&first, duplicates)) = positions.split_first() else {
            let at = block
                .body
                .iter()
                .rposition(|l| !l.is_blank())
                .map_or(0, |i| i + 1);
            block.body.insert(at, Line::property(key, value, newline));
            return Ok(true);
        };

        let mut changed = !duplicates.is_empty();
        for &i in duplicates.iter().rev() {
            block.body.remove(i);
        }

        let line = &mut block.body[first];
        let current = match &line.kind {
            LineKind::Property { value, .. } => value.as_str(),
            _ => "",
        };
        if current != value {
            line.set_value(value);
            changed = true;
        }
        Ok(changed)
    }

    /// Remove every declaration of a property. Returns whether it existed.
    pub fn remove_property(&mut self, section: &str, key: &str) -> Result<bool> {
        let block = self.block_mut(section)?;
        let before = block.body.len();
        block.body.retain(|l| l.key() != Some(key));
        Ok(block.body.len() != before)
    }

    /// Remove a section together with its comments.
    ///
    /// Returns `false` if there was no such section.
    pub fn remove_section(&mut self, name: &str) -> bool {
        let Some(index) = self.blocks.iter().position(|b| b.name == name) else {
            return false;
        };
        self.blocks.remove(index);

        // Don't leave the separator of a removed last section dangling
        if index == self.blocks.len() {
            let tail = match self.blocks.last_mut() {
                Some(block) => &mut block.body,
                None => &mut self.preamble,
            };
            while tail.last().is_some_and(Line::is_blank) {
                tail.pop();
            }
        } else {
            // Nor a separator at the top of the file or after another one
            let previous = match index.checked_sub(1) {
                Some(i) => {
                    let block = &self.blocks[i];
                    Some(block.body.last().unwrap_or(&block.header))
                }
                None => self.preamble.last(),
            };
            if previous.is_none_or(Line::is_blank) {
                let leading = &mut self.blocks[index].leading;
                let blanks = leading.iter().take_while(|l| l.is_blank()).count();
                leading.drain(..blanks);
            }
        }
        true
    }

    fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.name == name)
    }

    fn block_mut(&mut self, name: &str) -> Result<&mut Block> {
        self.blocks
            .iter_mut()
            .find(|b| b.name == name)
            .ok_or_else(|| Error::UnknownSection(name.to_string()))
    }

    pub(crate) fn lines(&self) -> impl Iterator<Item = &Line> {
        self.preamble
            .iter()
            .chain(self.blocks.iter().flat_map(Block::lines))
    }

    fn last_line(&self) -> Option<&Line> {
        match self.blocks.last() {
            Some(block) => Some(block.body.last().unwrap_or(&block.header)),
            None => self.preamble.last(),
        }
    }

    fn validate_key(&self, key: &str) -> Result<()> {
        if key.is_empty() || key.trim() != key {
            return Err(Error::InvalidEntry(format!(
                "key '{key}' is empty or has surrounding whitespace"
            )));
        }
        if key.contains(['=', '\n', '\r']) || key.starts_with('[') {
            return Err(Error::InvalidEntry(format!(
                "key '{key}' contains a reserved character"
            )));
        }
        if self.options.is_comment(key) {
            return Err(Error::InvalidEntry(format!(
                "key '{key}' would be read back as a comment"
            )));
        }
        Ok(())
    }
}

fn validate_section_name(name: &str) -> Result<()> {
    if name.is_empty() || name.trim() != name {
        return Err(Error::InvalidEntry(format!(
            "section name '{name}' is empty or has surrounding whitespace"
        )));
    }
    if name.contains(['\n', '\r']) {
        return Err(Error::InvalidEntry(format!(
            "section name '{}' spans multiple lines",
            name.escape_debug()
        )));
    }
    Ok(())
}

fn validate_value(key: &str, value: &str) -> Result<()> {
    if value.contains(['\n', '\r']) {
        return Err(Error::InvalidEntry(format!(
            "value of '{key}' spans multiple lines"
        )));
    }
    if value.trim() != value {
        return Err(Error::InvalidEntry(format!(
            "value of '{key}' has surrounding whitespace"
        )));
    }
    Ok(())
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&writer::write_string(self))
    }
}
