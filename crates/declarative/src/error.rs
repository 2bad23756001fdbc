//! Error types for reconciliation.
//!
//! Every error is scoped to one target file. A failure in one file never
//! aborts reconciliation of the others.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reconciling a settings file.
#[derive(Debug, Error)]
pub enum Error {
    /// The file on disk could not be parsed; it is left untouched
    #[error("{}: malformed input at line {line}: {message}", path.display())]
    MalformedInput {
        /// File that failed to parse
        path: PathBuf,
        /// Line number where parsing failed (1-indexed)
        line: usize,
        /// Description of the syntax error
        message: String,
    },

    /// Resources targeting the same file disagree on purging
    #[error("{}: conflicting purge declarations", path.display())]
    ConflictingPurgeDeclaration {
        /// File with the conflicting declarations
        path: PathBuf,
    },

    /// Two resources claim the same section of the same file
    #[error("{}: section [{section}] is declared more than once", path.display())]
    DuplicateResource {
        /// Target file
        path: PathBuf,
        /// Section claimed twice
        section: String,
    },

    /// A desired section name, key or value cannot be written
    #[error("{}: invalid resource: {message}", path.display())]
    InvalidResource {
        /// Target file
        path: PathBuf,
        /// What was wrong
        message: String,
    },

    /// Read or write failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The file changed between planning and writing
    #[error("{} was modified while being reconciled", path.display())]
    ConcurrentModification {
        /// File that changed
        path: PathBuf,
    },

    /// Nothing was declared for the requested file
    #[error("no resources declared for {}", .0.display())]
    UnknownTarget(PathBuf),
}

impl Error {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Map a codec error for `path` into a reconciliation error.
    pub(crate) fn from_codec(path: &Path, err: inikit::Error) -> Self {
        match err {
            inikit::Error::Malformed { line, message } => Self::MalformedInput {
                path: path.to_path_buf(),
                line,
                message,
            },
            other => Self::InvalidResource {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        }
    }

    /// The file this error is about.
    pub fn path(&self) -> &Path {
        match self {
            Self::MalformedInput { path, .. }
            | Self::ConflictingPurgeDeclaration { path }
            | Self::DuplicateResource { path, .. }
            | Self::InvalidResource { path, .. }
            | Self::Io { path, .. }
            | Self::ConcurrentModification { path } => path,
            Self::UnknownTarget(path) => path,
        }
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;
