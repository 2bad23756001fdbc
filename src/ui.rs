use colored::Colorize;
use std::path::Path;

/// State of a managed file in listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    InSync,
    Pending,
    Failed,
}

impl FileState {
    fn symbol(self) -> colored::ColoredString {
        match self {
            Self::InSync => "✓".green(),
            Self::Pending => "~".yellow(),
            Self::Failed => "✗".red(),
        }
    }
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a step indicator
pub fn step(num: usize, total: usize, msg: &str) {
    println!("{} {}", format!("[{num}/{total}]").blue().bold(), msg);
}

/// Print one managed file: state symbol, path and a dimmed detail
pub fn file_line(state: FileState, path: &Path, detail: &str) {
    if detail.is_empty() {
        println!("  {} {}", state.symbol(), path.display());
    } else {
        println!("  {} {} {}", state.symbol(), path.display(), detail.dimmed());
    }
}

/// Pluralize a count: `plural(1, "file")` is "1 file", `plural(2, "file")` "2 files"
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
