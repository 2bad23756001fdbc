//! Planner - reads one file and computes its plan without writing

use crate::diff::{Plan, diff};
use crate::error::{Error, Result};
use crate::purge::purge;
use crate::resource::SectionResource;
use inikit::{Document, ParseOptions};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Raw file state a plan was computed from
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Whether the file existed
    pub exists: bool,
    /// File content (empty when missing)
    pub bytes: Vec<u8>,
    /// Hash of `bytes`
    pub hash: blake3::Hash,
}

impl Snapshot {
    /// Parse the snapshot, treating a missing file as an empty document
    pub fn document(&self, path: &Path, options: &ParseOptions) -> Result<Document> {
        if !self.exists {
            return Ok(Document::with_options(options.clone()));
        }
        inikit::parse_bytes(&self.bytes, options).map_err(|e| Error::from_codec(path, e))
    }
}

/// Read a file for planning. A missing file is an empty snapshot.
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let (exists, bytes) = match fs::read(path) {
        Ok(bytes) => (true, bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => (false, Vec::new()),
        Err(e) => return Err(Error::io(path, e)),
    };
    let hash = blake3::hash(&bytes);
    Ok(Snapshot {
        exists,
        bytes,
        hash,
    })
}

/// Computed changes for one file, with before/after renderings
#[derive(Debug, Clone)]
pub struct FilePlan {
    /// Target file
    pub path: PathBuf,
    /// Edits to apply, in order
    pub plan: Plan,
    /// Current content
    pub before: String,
    /// Content after applying `plan`
    pub after: String,
    /// Hash of the bytes the plan was computed from
    pub hash: blake3::Hash,
    /// Whether the file exists yet
    pub exists: bool,
}

impl FilePlan {
    /// Check if applying the plan would change the file
    pub fn has_changes(&self) -> bool {
        !self.plan.is_empty()
    }
}

/// Plan one file: parse, diff, purge, and render the result in memory
///
/// `resources` must all target `path`. Nothing is written.
pub fn plan_file(
    path: &Path,
    resources: &[SectionResource],
    purge_enabled: bool,
    reserved: &[&str],
    options: &ParseOptions,
) -> Result<FilePlan> {
    let snapshot = read_snapshot(path)?;
    let document = snapshot.document(path, options)?;
    let current = document.sections();

    let mut plan = diff(&current, resources);
    let claimed: Vec<&str> = resources.iter().map(|r| r.section.as_str()).collect();
    plan.extend(purge(&current, &claimed, purge_enabled, reserved));

    // Applying to a copy validates every name and value before any write
    let mut rendered = document.clone();
    plan.apply_to(&mut rendered)
        .map_err(|e| Error::from_codec(path, e))?;

    for edit in &plan {
        log::debug!("{}: {edit}", path.display());
    }

    Ok(FilePlan {
        path: path.to_path_buf(),
        plan,
        before: document.to_string(),
        after: rendered.to_string(),
        hash: snapshot.hash,
        exists: snapshot.exists,
    })
}
