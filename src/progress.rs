//! Terminal progress for `stanza apply`

use declarative::{Outcome, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Progress bar over the files of one apply
pub struct BarProgress {
    visible: bool,
    bar: Option<ProgressBar>,
}

impl BarProgress {
    /// A bar that draws only when `visible`
    pub const fn new(visible: bool) -> Self {
        Self { visible, bar: None }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

impl ProgressCallback for BarProgress {
    fn on_batch_start(&mut self, count: usize, _dry_run: bool) {
        if !self.visible {
            self.bar = Some(ProgressBar::hidden());
            return;
        }
        let bar = ProgressBar::new(count as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        self.bar = Some(bar);
    }

    fn on_file_start(&mut self, path: &Path) {
        if let Some(bar) = &self.bar {
            bar.set_message(file_label(path));
        }
    }

    fn on_file_complete(&mut self, path: &Path, outcome: &Outcome) {
        if let Some(bar) = &self.bar {
            if let Outcome::Failed(e) = outcome {
                bar.println(format!("  failed {}: {e}", path.display()));
            }
            bar.inc(1);
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::ApplyResult;

    #[test]
    fn test_file_label() {
        assert_eq!(file_label(Path::new("/opt/splunk/etc/system/local/outputs.conf")), "outputs.conf");
        assert_eq!(file_label(Path::new("/")), "/");
    }

    #[test]
    fn test_bar_lifecycle() {
        let mut progress = BarProgress::new(false);
        let path = Path::new("/tmp/outputs.conf");
        progress.on_batch_start(1, false);
        progress.on_file_start(path);
        progress.on_file_complete(path, &Outcome::Done(ApplyResult::unchanged(path)));
        assert_eq!(progress.bar.as_ref().map(ProgressBar::position), Some(1));
        progress.on_batch_complete();
        assert!(progress.bar.is_none());
    }
}
