//! Execution engine - plans and applies every declared file in parallel

use crate::applier::apply;
use crate::context::{ConfirmCallback, ProgressCallback};
use crate::error::Result;
use crate::planner::FilePlan;
use crate::reconciler::Reconciler;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary, Outcome};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Outcome of one file in an execution
#[derive(Debug)]
pub struct FileOutcome {
    /// Target file
    pub path: PathBuf,
    /// The plan, if planning succeeded
    pub plan: Option<FilePlan>,
    /// What happened
    pub outcome: Outcome,
}

/// Per-file outcomes, in declaration order, plus totals
#[derive(Debug, Default)]
pub struct ExecuteReport {
    pub files: Vec<FileOutcome>,
    pub summary: ExecuteSummary,
}

impl ExecuteReport {
    fn from_files(files: Vec<FileOutcome>) -> Self {
        let mut summary = ExecuteSummary::default();
        for file in &files {
            summary.add_outcome(&file.outcome);
        }
        Self { files, summary }
    }
}

/// Plan every declared file on a pool of `jobs` threads
///
/// Results are in declaration order. Nothing is written.
pub fn plan_all(reconciler: &Reconciler, jobs: usize) -> anyhow::Result<Vec<Result<FilePlan>>> {
    let pool = build_pool(jobs)?;
    let targets = reconciler.targets();
    Ok(pool.install(|| targets.par_iter().map(|path| reconciler.plan(path)).collect()))
}

/// Reconcile every declared file
///
/// All files are planned first. On a dry run the plans are reported and
/// nothing is written. Otherwise, if any file has changes, `confirm` is
/// asked once; declining marks those files skipped. Each file is applied
/// with the hash it was planned from, so a file changed in between fails
/// with `ConcurrentModification` instead of being overwritten.
pub fn execute<P, C>(
    reconciler: &Reconciler,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> anyhow::Result<ExecuteReport>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let targets: Vec<PathBuf> = reconciler.targets().into_iter().map(Path::to_path_buf).collect();
    let plans = plan_all(reconciler, opts.jobs)?;

    let pending: Vec<&FilePlan> = plans
        .iter()
        .filter_map(|p| p.as_ref().ok())
        .filter(|p| p.has_changes())
        .collect();
    let edit_count: usize = pending.iter().map(|p| p.plan.len()).sum();
    let file_count = pending.len();

    let files = targets.into_iter().zip(plans);

    if opts.dry_run {
        let files = files.map(|(path, plan)| planned(path, plan)).collect();
        return Ok(ExecuteReport::from_files(files));
    }

    if file_count > 0 {
        let prompt = format!("Apply {edit_count} edit(s) to {file_count} file(s)?");
        if !confirm.confirm(&prompt)? {
            let files = files.map(|(path, plan)| declined(path, plan)).collect();
            return Ok(ExecuteReport::from_files(files));
        }
    }

    let pool = build_pool(opts.jobs)?;
    let options = reconciler.parse_options();
    let files: Vec<(PathBuf, Result<FilePlan>)> = files.collect();

    progress.on_batch_start(files.len(), opts.dry_run);
    let shared = Mutex::new(&mut *progress);

    let outcomes: Vec<FileOutcome> = pool.install(|| {
        files
            .into_par_iter()
            .map(|(path, plan)| {
                if let Ok(mut p) = shared.lock() {
                    p.on_file_start(&path);
                }

                let file = match plan {
                    Ok(plan) => {
                        let outcome =
                            Outcome::from(apply(&path, &plan.plan, Some(plan.hash), options));
                        FileOutcome {
                            path,
                            plan: Some(plan),
                            outcome,
                        }
                    }
                    Err(e) => FileOutcome {
                        path,
                        plan: None,
                        outcome: Outcome::Failed(e),
                    },
                };

                if let Some(e) = file.outcome.error() {
                    log::warn!("{e}");
                }
                if let Ok(mut p) = shared.lock() {
                    p.on_file_complete(&file.path, &file.outcome);
                }
                file
            })
            .collect()
    });
    drop(shared);

    progress.on_batch_complete();
    Ok(ExecuteReport::from_files(outcomes))
}

fn build_pool(jobs: usize) -> anyhow::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {e}"))
}

/// Outcome for a dry run: what would be applied
fn planned(path: PathBuf, plan: Result<FilePlan>) -> FileOutcome {
    match plan {
        Ok(plan) => FileOutcome {
            outcome: Outcome::Done(ApplyResult {
                path: path.clone(),
                changed: plan.has_changes(),
                edits: plan.plan.edits.clone(),
            }),
            path,
            plan: Some(plan),
        },
        Err(e) => FileOutcome {
            path,
            plan: None,
            outcome: Outcome::Failed(e),
        },
    }
}

/// Outcome when the user declined: changed files are skipped
fn declined(path: PathBuf, plan: Result<FilePlan>) -> FileOutcome {
    match plan {
        Ok(plan) if plan.has_changes() => FileOutcome {
            path,
            plan: Some(plan),
            outcome: Outcome::Skipped,
        },
        other => planned(path, other),
    }
}
