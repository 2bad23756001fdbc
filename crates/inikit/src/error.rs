//! Error types for `.conf` parsing and editing.

use thiserror::Error;

/// Errors that can occur while reading or editing a settings document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input could not be parsed
    #[error("malformed input at line {line}: {message}")]
    Malformed {
        /// Line number where parsing failed (1-indexed)
        line: usize,
        /// Description of the syntax error
        message: String,
    },

    /// An edit referenced a section that is not in the document
    #[error("no such section: [{0}]")]
    UnknownSection(String),

    /// A section name, key or value cannot be represented in the format
    #[error("invalid entry: {0}")]
    InvalidEntry(String),
}

impl Error {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }

    /// Line number of a parse failure, if this is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Malformed { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, Error>;
