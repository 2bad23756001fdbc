//! Diff display for planned files

use colored::Colorize;
use declarative::{DiffSummary, Edit, FilePlan};
use similar::{ChangeTag, TextDiff};

const CONTEXT: usize = 3;

/// Old and new header names for a plan
fn headers(plan: &FilePlan) -> (String, String) {
    let path = plan.path.display().to_string();
    let old = if plan.exists {
        path.clone()
    } else {
        "/dev/null".to_string()
    };
    (old, path)
}

/// Plain unified diff of a plan's before and after content
pub fn unified(plan: &FilePlan) -> String {
    let (old, new) = headers(plan);
    TextDiff::from_lines(&plan.before, &plan.after)
        .unified_diff()
        .context_radius(CONTEXT)
        .header(&old, &new)
        .to_string()
}

/// Print a colored unified diff of a plan
pub fn print_unified(plan: &FilePlan) {
    let (old, new) = headers(plan);
    let diff = TextDiff::from_lines(&plan.before, &plan.after);

    println!("{}", format!("--- {old}").bold());
    println!("{}", format!("+++ {new}").bold());

    for group in diff.grouped_ops(CONTEXT) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_range = first.old_range().start..last.old_range().end;
        let new_range = first.new_range().start..last.new_range().end;
        println!(
            "{}",
            format!(
                "@@ -{},{} +{},{} @@",
                old_range.start + 1,
                old_range.len(),
                new_range.start + 1,
                new_range.len()
            )
            .cyan()
        );

        for op in &group {
            for change in diff.iter_changes(op) {
                let line = change.to_string_lossy();
                let line = line.trim_end_matches(['\n', '\r']);
                match change.tag() {
                    ChangeTag::Delete => println!("{}", format!("-{line}").red()),
                    ChangeTag::Insert => println!("{}", format!("+{line}").green()),
                    ChangeTag::Equal => println!(" {}", line.dimmed()),
                }
            }
        }
    }
}

/// Print one edit line
pub fn print_edit(edit: &Edit) {
    let line = format!("  {edit}");
    if edit.is_addition() {
        println!("{}", line.green());
    } else if edit.is_removal() {
        println!("{}", line.red());
    } else {
        println!("{}", line.yellow());
    }
}

/// Print the change summary line
pub fn print_summary(summary: &DiffSummary, files: usize) {
    println!(
        "Summary: {} in {} ({} to add, {} to change, {} to remove)",
        crate::ui::plural(summary.total(), "edit").bold(),
        crate::ui::plural(files, "file"),
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.removals.to_string().red()
    );
}
