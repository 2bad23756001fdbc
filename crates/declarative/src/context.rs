//! Progress and confirmation callbacks
//!
//! These traits let the executor report to a terminal, a log or nothing
//! at all without depending on a UI crate.

use crate::types::Outcome;
use anyhow::Result;
use std::path::Path;

/// Progress callback for execution operations
///
/// Calls may come from worker threads, one at a time.
pub trait ProgressCallback: Send {
    /// Called when starting to process a batch of files
    fn on_batch_start(&mut self, count: usize, dry_run: bool);

    /// Called when starting to process a single file
    fn on_file_start(&mut self, path: &Path);

    /// Called when a file is done
    fn on_file_complete(&mut self, path: &Path, outcome: &Outcome);

    /// Called when a batch completes
    fn on_batch_complete(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback: Send {
    /// Ask the user to confirm an action
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize, _dry_run: bool) {}
    fn on_file_start(&mut self, _path: &Path) {}
    fn on_file_complete(&mut self, _path: &Path, _outcome: &Outcome) {}
    fn on_batch_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}
