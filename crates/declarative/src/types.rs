//! Core types for declarative settings management

use crate::diff::Edit;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Desired state of one property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesiredValue {
    /// Property must exist with exactly this value (may be empty)
    Present(String),
    /// Property must not exist
    Absent,
}

impl DesiredValue {
    /// Check if this is the tombstone
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The desired value, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Present(v) => Some(v),
            Self::Absent => None,
        }
    }
}

impl From<String> for DesiredValue {
    fn from(value: String) -> Self {
        Self::Present(value)
    }
}

impl From<&str> for DesiredValue {
    fn from(value: &str) -> Self {
        Self::Present(value.to_string())
    }
}

/// Result of reconciling one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResult {
    /// File that was reconciled
    pub path: PathBuf,
    /// Whether the file content changed (or would change, on a dry run)
    pub changed: bool,
    /// Edits applied, in order
    pub edits: Vec<Edit>,
}

impl ApplyResult {
    /// Result for a file that already matched
    pub fn unchanged(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            changed: false,
            edits: Vec::new(),
        }
    }
}

/// What happened to one file during execution
#[derive(Debug)]
pub enum Outcome {
    /// Reconciled (or planned, on a dry run)
    Done(ApplyResult),
    /// Had changes, but the user declined to apply them
    Skipped,
    /// Planning or applying failed; the file is untouched
    Failed(Error),
}

impl Outcome {
    /// Check if the file changed (or would change)
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Done(r) if r.changed)
    }

    /// Check if the file failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Edits applied (or planned)
    pub fn edits(&self) -> &[Edit] {
        match self {
            Self::Done(r) => &r.edits,
            _ => &[],
        }
    }

    /// The error, if the file failed
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::error::Result<ApplyResult>> for Outcome {
    fn from(result: crate::error::Result<ApplyResult>) -> Self {
        match result {
            Ok(r) => Self::Done(r),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Total edits across changed files
    pub edits: usize,
}

impl ExecuteSummary {
    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of files processed
    pub fn total(&self) -> usize {
        self.changed + self.unchanged + self.failed + self.skipped
    }

    /// Add an outcome to the summary
    pub fn add_outcome(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Done(r) if r.changed => {
                self.changed += 1;
                self.edits += r.edits.len();
            }
            Outcome::Done(_) => self.unchanged += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't write, just report what would change
    pub dry_run: bool,
    /// Number of files reconciled in parallel
    pub jobs: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desired_value() {
        let v: DesiredValue = "9997".into();
        assert_eq!(v.value(), Some("9997"));
        assert!(!v.is_absent());
        assert!(DesiredValue::Absent.is_absent());
        assert_ne!(DesiredValue::from(""), DesiredValue::Absent);
    }

    #[test]
    fn test_summary_add_outcome() {
        let mut summary = ExecuteSummary::default();
        summary.add_outcome(&Outcome::Done(ApplyResult::unchanged("/a")));
        summary.add_outcome(&Outcome::Done(ApplyResult {
            path: "/b".into(),
            changed: true,
            edits: vec![Edit::RemoveSection {
                section: "x".into(),
            }],
        }));
        summary.add_outcome(&Outcome::Failed(Error::UnknownTarget("/c".into())));
        summary.add_outcome(&Outcome::Skipped);

        assert_eq!(summary.changed, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.edits, 1);
        assert_eq!(summary.total(), 4);
        assert!(!summary.is_success());
    }
}
