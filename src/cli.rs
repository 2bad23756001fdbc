use clap::{Parser, Subcommand};
use clap_complete::Shell;
use platform::Product;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stanza")]
#[command(version)]
#[command(about = "Declarative management of Splunk .conf files", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Manifest file
    #[arg(long, global = true, env = "STANZA_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Settings directory (overrides the manifest and the platform default)
    #[arg(long, global = true)]
    pub conf_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Make the settings files match the manifest
    Apply(ApplyArgs),

    /// Show what apply would change, as unified diffs
    Diff,

    /// Show which files are in sync
    Status,

    /// Print a settings file
    Show {
        /// File type (e.g. outputs) or path
        file: String,
    },

    /// Show the platform profile for this host
    Platform(PlatformArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Dry run - show what would be done
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Number of files reconciled in parallel
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct PlatformArgs {
    /// Product (defaults to the manifest's, else forwarder)
    #[arg(long)]
    pub product: Option<Product>,

    /// Product release, `<version>-<build>`
    #[arg(long)]
    pub release: Option<String>,

    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}
