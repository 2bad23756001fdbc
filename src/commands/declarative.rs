//! Declarative commands for stanza
//!
//! - `status` - Show which files are in sync with the manifest
//! - `apply` - Make the files match the manifest
//! - `diff` - Preview what apply would change

use anyhow::{Context as AnyhowContext, Result, bail};
use colored::Colorize;
use declarative::{
    ConfirmCallback, DiffSummary, ExecuteOptions, ExecuteReport, FilePlan, Outcome, Reconciler,
    execute, plan_all,
};
use platform::PlatformProfile;
use serde::Serialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::Context;
use crate::cli::ApplyArgs;
use crate::engine::differ;
use crate::engine::{StageGraph, StageOutcome};
use crate::paths;
use crate::progress::BarProgress;
use crate::schema::Manifest;
use crate::ui::{self, FileState};

/// Where the settings directory came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfDirSource {
    Flag,
    Manifest,
    Platform,
}

/// Everything a command needs: manifest, platform profile and settings directory
pub struct Session {
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    pub profile: Option<PlatformProfile>,
    pub conf_dir: PathBuf,
    pub conf_dir_source: ConfDirSource,
}

impl Session {
    /// Load the manifest and derive the platform profile
    ///
    /// A missing manifest is an error only when `required`.
    pub fn load(ctx: &Context, required: bool) -> Result<Self> {
        let manifest_path = paths::manifest_path(ctx.manifest.as_deref())?;
        let manifest = if manifest_path.exists() || required {
            Manifest::load(&manifest_path)?
        } else {
            log::debug!("No manifest at {}, using defaults", manifest_path.display());
            Manifest::default()
        };

        let facts = platform::detect(manifest.release.as_deref().unwrap_or_default());
        let profile = match platform::profile(&facts, manifest.product) {
            Ok(profile) => Some(profile),
            Err(e) => {
                log::debug!("No platform profile: {e}");
                None
            }
        };

        let (conf_dir, conf_dir_source) = resolve_conf_dir(
            ctx.conf_dir.as_deref(),
            manifest.conf_dir.as_deref(),
            profile.as_ref(),
        )?;
        log::debug!("Settings directory: {}", conf_dir.display());

        Ok(Self {
            manifest_path,
            manifest,
            profile,
            conf_dir,
            conf_dir_source,
        })
    }

    /// Reconciler with every manifest declaration
    pub fn reconciler(&self) -> Result<Reconciler> {
        self.manifest
            .reconciler(&self.conf_dir)
            .with_context(|| format!("Invalid manifest: {}", self.manifest_path.display()))
    }
}

/// Pick the settings directory: flag, then manifest, then platform
fn resolve_conf_dir(
    flag: Option<&Path>,
    manifest: Option<&str>,
    profile: Option<&PlatformProfile>,
) -> Result<(PathBuf, ConfDirSource)> {
    if let Some(dir) = flag {
        return Ok((paths::expand(&dir.to_string_lossy()), ConfDirSource::Flag));
    }
    if let Some(dir) = manifest {
        return Ok((paths::expand(dir), ConfDirSource::Manifest));
    }
    match profile {
        Some(p) => Ok((p.conf_dir.clone(), ConfDirSource::Platform)),
        None => bail!(
            "Unsupported platform and no settings directory given; set conf_dir in the manifest or pass --conf-dir"
        ),
    }
}

/// Confirms on the terminal unless told to assume yes
struct Prompt {
    assume_yes: bool,
}

impl ConfirmCallback for Prompt {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        if !std::io::stdin().is_terminal() {
            bail!("{prompt} Not asking on a non-interactive terminal; pass --yes to apply");
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        Ok(confirmed)
    }
}

// ============================================================================
// Apply
// ============================================================================

/// JSON view of one file in an apply
#[derive(Debug, Serialize)]
struct FileReport<'a> {
    path: &'a Path,
    status: &'static str,
    changed: bool,
    edits: &'a [declarative::Edit],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// JSON view of an apply
#[derive(Debug, Serialize)]
struct ApplyReport<'a> {
    dry_run: bool,
    files: Vec<FileReport<'a>>,
    summary: &'a declarative::ExecuteSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    restart: Option<String>,
}

fn status_name(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Done(r) if r.changed => "changed",
        Outcome::Done(_) => "unchanged",
        Outcome::Skipped => "skipped",
        Outcome::Failed(_) => "failed",
    }
}

pub fn apply(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let session = Session::load(ctx, true)?;
    let reconciler = session.reconciler()?;
    let talk = !args.json && !ctx.quiet;

    if talk {
        ui::header("Applying Configuration");
        ui::kv("Manifest", &session.manifest_path.display().to_string());
        ui::kv("Settings", &session.conf_dir.display().to_string());
        if args.dry_run {
            ui::warn("Dry run - no changes will be made");
        }
    }

    let opts = ExecuteOptions {
        dry_run: args.dry_run,
        jobs: args.jobs.max(1),
    };
    let graph = StageGraph::standard();
    let total = graph.order()?.len();
    let mut report: Option<ExecuteReport> = None;
    let mut restart: Option<String> = None;
    let mut step = 0;

    let stages = graph.run::<anyhow::Error, _>(|stage| {
        step += 1;
        match stage {
            "install" => {
                if talk {
                    ui::step(step, total, "Checking installation");
                }
                check_installed(&session, args.dry_run, talk)
            }
            "configure" => {
                if talk {
                    ui::step(step, total, "Reconciling settings files");
                    preview(&reconciler, opts.jobs)?;
                }
                let mut progress = BarProgress::new(talk);
                let mut prompt = Prompt {
                    assume_yes: args.yes,
                };
                let done = execute(&reconciler, &opts, &mut progress, &mut prompt)?;
                let changed = done.summary.changed > 0;
                report = Some(done);
                Ok(if changed {
                    StageOutcome::Changed
                } else {
                    StageOutcome::Unchanged
                })
            }
            "restart" => {
                let message = restart_message(session.profile.as_ref(), args.dry_run);
                if talk {
                    ui::step(step, total, "Restart");
                    ui::warn(&message);
                }
                restart = Some(message);
                Ok(StageOutcome::Unchanged)
            }
            other => bail!("Unknown stage: {other}"),
        }
    })?;

    for (stage, status) in &stages {
        log::debug!("stage {stage}: {status:?}");
    }

    let report = report.unwrap_or_default();
    if args.json {
        print_json(&report, args.dry_run, restart)?;
    } else if !ctx.quiet {
        print_outcomes(&report, args.dry_run, ctx.verbose > 0);
    }

    if !report.summary.is_success() {
        bail!("{} failed", ui::plural(report.summary.failed, "file"));
    }
    Ok(())
}

/// The install stage: the product must already be there
fn check_installed(session: &Session, dry_run: bool, talk: bool) -> Result<StageOutcome> {
    let dir = match (&session.profile, session.conf_dir_source) {
        (Some(profile), ConfDirSource::Platform) => &profile.home_dir,
        _ => &session.conf_dir,
    };

    if dir.is_dir() {
        if talk {
            ui::dim(&format!("Found {}", dir.display()));
        }
        return Ok(StageOutcome::Unchanged);
    }

    let product = session.manifest.product;
    if dry_run {
        if talk {
            ui::warn(&format!("{product} not found at {}", dir.display()));
        }
        return Ok(StageOutcome::Unchanged);
    }
    match &session.profile {
        Some(profile) => bail!(
            "{product} is not installed: {} does not exist (install package {})",
            dir.display(),
            profile
                .package_file
                .as_deref()
                .unwrap_or(&profile.package_name)
        ),
        None => bail!("{} does not exist", dir.display()),
    }
}

fn restart_message(profile: Option<&PlatformProfile>, dry_run: bool) -> String {
    let verb = if dry_run { "would need" } else { "needs" };
    match profile {
        Some(p) => format!(
            "Service {} ({}) {verb} a restart to pick up the changes",
            p.service.name, p.service.provider
        ),
        None => format!("The service {verb} a restart to pick up the changes"),
    }
}

/// Print what each file is about to get
fn preview(reconciler: &Reconciler, jobs: usize) -> Result<()> {
    let plans = plan_all(reconciler, jobs)?;
    let pending: Vec<&FilePlan> = plans
        .iter()
        .filter_map(|p| p.as_ref().ok())
        .filter(|p| p.has_changes())
        .collect();

    if pending.is_empty() {
        return Ok(());
    }
    for plan in pending {
        ui::section(&plan.path.display().to_string());
        for edit in &plan.plan {
            differ::print_edit(edit);
        }
    }
    println!();
    Ok(())
}

fn print_outcomes(report: &ExecuteReport, dry_run: bool, verbose: bool) {
    ui::section("Results");
    for file in &report.files {
        let path = file.path.display().to_string();
        match &file.outcome {
            Outcome::Done(r) if r.changed => {
                let verb = if dry_run { "would apply" } else { "applied" };
                ui::success(&format!("{path}: {verb} {}", ui::plural(r.edits.len(), "edit")));
            }
            Outcome::Done(_) => {
                if verbose {
                    ui::dim(&format!("{path}: in sync"));
                }
            }
            Outcome::Skipped => ui::warn(&format!("{path}: skipped")),
            Outcome::Failed(e) => ui::error(&e.to_string()),
        }
    }

    let s = &report.summary;
    println!();
    if s.changed == 0 && s.failed == 0 && s.skipped == 0 {
        ui::success("Everything in sync");
        return;
    }
    let label = if dry_run { "Dry run" } else { "Apply" };
    println!(
        "{}: {} changed, {} unchanged, {} skipped, {} failed ({})",
        label.bold(),
        s.changed.to_string().green(),
        s.unchanged,
        s.skipped.to_string().yellow(),
        s.failed.to_string().red(),
        ui::plural(s.edits, "edit")
    );
}

fn print_json(report: &ExecuteReport, dry_run: bool, restart: Option<String>) -> Result<()> {
    let files = report
        .files
        .iter()
        .map(|f| FileReport {
            path: &f.path,
            status: status_name(&f.outcome),
            changed: f.outcome.is_changed(),
            edits: f.outcome.edits(),
            error: f.outcome.error().map(ToString::to_string),
        })
        .collect();
    let view = ApplyReport {
        dry_run,
        files,
        summary: &report.summary,
        restart,
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

// ============================================================================
// Diff
// ============================================================================

pub fn diff(ctx: &Context) -> Result<()> {
    let session = Session::load(ctx, true)?;
    let reconciler = session.reconciler()?;
    let plans = plan_all(&reconciler, ExecuteOptions::default().jobs)?;
    let plain = !std::io::stdout().is_terminal();

    let mut summary = DiffSummary::default();
    let mut files = 0;
    let mut failed = 0;

    for plan in &plans {
        match plan {
            Ok(plan) if plan.has_changes() => {
                if plain {
                    print!("{}", differ::unified(plan));
                } else {
                    differ::print_unified(plan);
                }
                let s = plan.plan.summary();
                summary.additions += s.additions;
                summary.removals += s.removals;
                summary.modifications += s.modifications;
                files += 1;
            }
            Ok(_) => {}
            Err(e) => {
                ui::error(&e.to_string());
                failed += 1;
            }
        }
    }

    if !ctx.quiet {
        println!();
        if files == 0 {
            ui::success("No changes - files match the manifest");
        } else {
            differ::print_summary(&summary, files);
        }
    }

    if failed > 0 {
        bail!("{} could not be planned", ui::plural(failed, "file"));
    }
    Ok(())
}

// ============================================================================
// Status
// ============================================================================

pub fn status(ctx: &Context) -> Result<()> {
    let session = Session::load(ctx, true)?;
    let reconciler = session.reconciler()?;

    ui::header("Stanza Status");
    ui::kv("Manifest", &session.manifest_path.display().to_string());
    ui::kv("Product", session.manifest.product.name());
    ui::kv("Settings", &session.conf_dir.display().to_string());

    let plans = plan_all(&reconciler, ExecuteOptions::default().jobs)?;
    ui::section("Files");

    let mut in_sync = 0;
    let mut failed = 0;
    for (path, plan) in reconciler.targets().into_iter().zip(&plans) {
        let purge = if matches!(reconciler.purge_enabled(path), Ok(true)) {
            " [purge]"
        } else {
            ""
        };
        let sections = reconciler.resources(path).len();
        match plan {
            Ok(plan) if !plan.has_changes() => {
                in_sync += 1;
                let detail = format!("({}){purge}", ui::plural(sections, "section"));
                ui::file_line(FileState::InSync, path, &detail);
            }
            Ok(plan) => {
                let state = if plan.exists { "" } else { ", missing" };
                let detail = format!("({} pending{state}){purge}", ui::plural(plan.plan.len(), "edit"));
                ui::file_line(FileState::Pending, path, &detail);
                if ctx.verbose > 0 {
                    for edit in &plan.plan {
                        differ::print_edit(edit);
                    }
                }
            }
            Err(e) => {
                failed += 1;
                ui::file_line(FileState::Failed, path, "");
                ui::dim(&e.to_string());
            }
        }
    }

    println!();
    let total = plans.len();
    if total == 0 {
        ui::info("The manifest declares no resources");
    } else if in_sync == total {
        ui::success(&format!("All {} in sync", ui::plural(total, "file")));
    } else {
        ui::info(&format!(
            "{in_sync}/{total} in sync; run 'stanza diff' for details"
        ));
    }

    if failed > 0 {
        bail!("{} could not be planned", ui::plural(failed, "file"));
    }
    Ok(())
}
