//! # Declarative
//!
//! Convergent reconciliation of INI-style settings files.
//!
//! Callers declare the desired state of individual `[section]`s; the crate
//! diffs that against what is on disk and applies the smallest set of edits
//! that makes the file match, leaving everything else byte for byte intact.
//!
//! ## Core Concepts
//!
//! - **SectionResource**: desired properties (or tombstones) for one section
//! - **FileType**: per-file reserved sections and purge default
//! - **Plan**: ordered [`Edit`]s computed fresh on every pass
//! - **Purge**: optional removal of sections no resource declares
//! - **Reconciler**: owns the declarations and runs read, diff, write
//!
//! ## Example
//!
//! ```
//! use declarative::{Reconciler, SectionResource};
//!
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("outputs.conf");
//! std::fs::write(&path, "[default]\nhost = old\n")?;
//!
//! let mut reconciler = Reconciler::new();
//! reconciler.declare(
//!     SectionResource::new(&path, "default")
//!         .set("host", "new")
//!         .set("port", "9997"),
//! );
//!
//! let result = reconciler.reconcile(&path)?;
//! assert!(result.changed);
//! assert_eq!(std::fs::read_to_string(&path)?, "[default]\nhost = new\nport = 9997\n");
//!
//! // Converged: a second pass is a no-op
//! assert!(!reconciler.reconcile(&path)?.changed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Callback Traits
//!
//! - [`ProgressCallback`]: receives per-file progress from [`execute`]
//! - [`ConfirmCallback`]: asked once before anything is written
//!
//! This keeps the crate free of any terminal UI dependency.

pub mod applier;
pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod filetype;
pub mod planner;
pub mod purge;
pub mod reconciler;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use applier::apply;
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diff::{DiffSummary, Edit, Plan, diff};
pub use error::{Error, Result};
pub use executor::{ExecuteReport, FileOutcome, execute, plan_all};
pub use filetype::FileType;
pub use planner::{FilePlan, Snapshot, plan_file, read_snapshot};
pub use purge::purge;
pub use reconciler::Reconciler;
pub use resource::{SectionResource, declare_resource};
pub use types::{ApplyResult, DesiredValue, ExecuteOptions, ExecuteSummary, Outcome};
