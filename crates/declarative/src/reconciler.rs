//! Reconciler - the caller-facing entry point
//!
//! Callers declare resources and purge settings per target file, then ask
//! for a plan or a reconciliation of one file or all of them. Nothing is
//! kept between passes: every call re-reads the file.

use crate::applier::apply;
use crate::context::{AutoConfirm, ProgressCallback};
use crate::error::{Error, Result};
use crate::executor::{ExecuteReport, execute};
use crate::filetype::FileType;
use crate::planner::{FilePlan, plan_file};
use crate::resource::SectionResource;
use crate::types::{ApplyResult, ExecuteOptions};
use inikit::ParseOptions;
use std::path::{Path, PathBuf};

/// Declarations for one target file
#[derive(Debug, Clone)]
struct ManagedFile {
    path: PathBuf,
    file_type: FileType,
    resources: Vec<SectionResource>,
    /// Every purge declaration made for this file, in order
    purge: Vec<bool>,
}

impl ManagedFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            file_type: FileType::Custom,
            resources: Vec::new(),
            purge: Vec::new(),
        }
    }

    fn purge_enabled(&self) -> Result<bool> {
        match self.purge.split_first() {
            None => Ok(self.file_type.default_purge()),
            Some((first, rest)) if rest.iter().all(|p| p == first) => Ok(*first),
            Some(_) => Err(Error::ConflictingPurgeDeclaration {
                path: self.path.clone(),
            }),
        }
    }

    fn check_duplicates(&self) -> Result<()> {
        for (i, resource) in self.resources.iter().enumerate() {
            if self.resources[..i]
                .iter()
                .any(|r| r.section == resource.section)
            {
                return Err(Error::DuplicateResource {
                    path: self.path.clone(),
                    section: resource.section.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Converges settings files to their declared sections
///
/// # Example
///
/// ```no_run
/// use declarative::{FileType, Reconciler, declare_resource};
///
/// let path = "/opt/splunkforwarder/etc/system/local/outputs.conf";
/// let mut reconciler = Reconciler::new();
/// reconciler.register_file(path, FileType::Outputs);
/// reconciler.declare(declare_resource(
///     path,
///     "tcpout:indexers",
///     [("server", "idx1:9997,idx2:9997")],
///     ["compressed"],
/// ));
/// reconciler.set_purge(path, true);
///
/// let result = reconciler.reconcile(path.as_ref())?;
/// println!("changed: {}", result.changed);
/// # Ok::<(), declarative::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    files: Vec<ManagedFile>,
    options: ParseOptions,
}

impl Reconciler {
    /// Create a reconciler with default comment conventions
    pub fn new() -> Self {
        Self::default()
    }

    /// Use different comment conventions when parsing files
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse options used for every file
    pub fn parse_options(&self) -> &ParseOptions {
        &self.options
    }

    /// Associate a file with a file type (reserved sections, purge default)
    pub fn register_file(&mut self, target_file: impl Into<PathBuf>, file_type: FileType) {
        self.entry(target_file.into()).file_type = file_type;
    }

    /// Declare desired state for one section
    ///
    /// Duplicate sections and conflicting purge declarations are reported
    /// when the file is planned.
    pub fn declare(&mut self, resource: SectionResource) {
        let file = self.entry(resource.target_file.clone());
        if let Some(purge) = resource.purge {
            file.purge.push(purge);
        }
        file.resources.push(resource);
    }

    /// Declare whether unmanaged sections of a file are purged
    pub fn set_purge(&mut self, target_file: impl Into<PathBuf>, enabled: bool) {
        self.entry(target_file.into()).purge.push(enabled);
    }

    /// Every file with declarations, in first-declaration order
    pub fn targets(&self) -> Vec<&Path> {
        self.files.iter().map(|f| f.path.as_path()).collect()
    }

    /// Resources declared for a file
    pub fn resources(&self, target_file: &Path) -> &[SectionResource] {
        self.file(target_file)
            .map(|f| f.resources.as_slice())
            .unwrap_or_default()
    }

    /// File type registered for a file
    pub fn file_type(&self, target_file: &Path) -> Option<FileType> {
        self.file(target_file).map(|f| f.file_type)
    }

    /// Effective purge setting for a file
    pub fn purge_enabled(&self, target_file: &Path) -> Result<bool> {
        self.require(target_file)?.purge_enabled()
    }

    /// Compute the plan for a file without writing anything
    pub fn plan(&self, target_file: &Path) -> Result<FilePlan> {
        let file = self.require(target_file)?;
        file.check_duplicates()?;
        let purge = file.purge_enabled()?;
        plan_file(
            &file.path,
            &file.resources,
            purge,
            file.file_type.reserved_sections(),
            &self.options,
        )
    }

    /// Converge one file: parse, diff, purge and apply
    ///
    /// The file is written only if something changed. If it is modified
    /// between planning and writing, nothing is written and
    /// [`Error::ConcurrentModification`] is returned.
    pub fn reconcile(&self, target_file: &Path) -> Result<ApplyResult> {
        let plan = self.plan(target_file)?;
        apply(&plan.path, &plan.plan, Some(plan.hash), &self.options)
    }

    /// Converge every declared file in parallel
    ///
    /// Files are independent: an error in one is reported in its outcome
    /// and the others proceed.
    pub fn reconcile_all<P: ProgressCallback>(
        &self,
        options: &ExecuteOptions,
        progress: &mut P,
    ) -> anyhow::Result<ExecuteReport> {
        execute(self, options, progress, &mut AutoConfirm)
    }

    fn file(&self, path: &Path) -> Option<&ManagedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    fn require(&self, path: &Path) -> Result<&ManagedFile> {
        self.file(path)
            .ok_or_else(|| Error::UnknownTarget(path.to_path_buf()))
    }

    fn entry(&mut self, path: PathBuf) -> &mut ManagedFile {
        let index = match self.files.iter().position(|f| f.path == path) {
            Some(index) => index,
            None => {
                self.files.push(ManagedFile::new(path));
                self.files.len() - 1
            }
        };
        &mut self.files[index]
    }
}
