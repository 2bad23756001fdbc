//! `stanza show` - print a settings file section by section

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use declarative::{FileType, Snapshot, read_snapshot};
use inikit::ParseOptions;
use std::path::{Path, PathBuf};

use super::declarative::Session;
use crate::Context;
use crate::paths;
use crate::ui;

/// Resolve a file argument: a known file type name or a path
fn resolve_file(file: &str, conf_dir: &Path) -> PathBuf {
    match file.parse::<FileType>().ok().and_then(|t| t.file_name()) {
        Some(name) => conf_dir.join(name),
        None => paths::resolve(file, conf_dir),
    }
}

pub fn run(ctx: &Context, file: &str) -> Result<()> {
    let session = Session::load(ctx, false)?;
    let path = resolve_file(file, &session.conf_dir);
    let reconciler = session.reconciler()?;

    let snapshot: Snapshot = read_snapshot(&path)?;
    ui::header(&path.display().to_string());
    if !snapshot.exists {
        ui::warn("File does not exist");
        return Ok(());
    }

    let document = snapshot
        .document(&path, &ParseOptions::default())
        .with_context(|| format!("Could not parse {}", path.display()))?;
    let sections = document.sections();
    let managed: Vec<&str> = reconciler
        .resources(&path)
        .iter()
        .map(|r| r.section.as_str())
        .collect();

    if sections.is_empty() {
        ui::dim("(no sections)");
    }
    for section in &sections {
        let title = format!("[{}]", section.name);
        if managed.contains(&section.name.as_str()) {
            println!();
            println!("{} {}", title.cyan().bold(), "managed".green());
        } else {
            ui::section(&title);
        }
        for (key, value) in &section.properties {
            ui::kv(key, value);
        }
    }

    if ctx.verbose > 0 {
        println!();
        ui::dim(&format!("blake3 {}", snapshot.hash.to_hex()));
    }
    Ok(())
}
