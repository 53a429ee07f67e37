//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: No progress output

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::types::{PatchSelection, StrategyKind, Tool, VerifyMode};

/// patchcheck - find community patches that no longer apply
#[derive(Parser, Debug)]
#[command(name = "patchcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// No progress output; the report file is still written
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check which patches apply to a tool's source tree
    #[command(
        name = "check",
        long_about = "Check which patches apply to a tool's source tree.\n\n\
            Brings the tool checkout and the patch catalog up to date, checks out \
            the requested revision and tries every diff of every selected patch \
            against it. A patch is working if at least one of its diffs applies \
            cleanly; otherwise it is broken.\n\n\
            The broken patches are written to a report file. The run succeeds \
            no matter how many patches are broken.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Check every dwm patch against master
    patchcheck check dwm

    # Check two patches against a release, without touching the network
    patchcheck check dwm -p systray,alpha --revision 6.5 --no-refresh

    # Record the outcome of every diff, not only broken patches
    patchcheck check st --mode exhaustive

    # Machine-readable results for scripting
    patchcheck check surf --json -q

REPORT FILES:
    dwm-6.5-broken.md                  all patches, fast mode
    dwm-6.5-patches-broken.md          explicit --patches selection
    dwm-138b405-diffs-broken.md        exhaustive mode, untagged revision"
    )]
    Check(CheckArgs),

    /// List a tool's patches in the catalog
    #[command(
        name = "list",
        long_about = "List a tool's patches in the catalog.\n\n\
            Reads the local catalog checkout only: no network access, no trials.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Patch ids for dmenu
    patchcheck list dmenu

    # Each patch with its diff files
    patchcheck list dwm --diffs"
    )]
    List {
        /// Tool whose patches to list
        tool: Tool,

        /// Local checkout of the patch catalog
        #[arg(long, visible_alias = "sites", value_name = "DIR")]
        catalog_path: Option<PathBuf>,

        /// Also list each patch's diff files
        #[arg(long)]
        diffs: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of the `check` command.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Tool to check (dwm, st, surf, dmenu, ii)
    pub tool: Tool,

    /// Comma-separated patch ids, or "all"
    #[arg(short, long, default_value = "all", value_name = "IDS")]
    pub patches: PatchSelection,

    /// fast: stop at the first clean diff; exhaustive: try every diff
    #[arg(long, value_name = "MODE", conflicts_with = "diff")]
    pub mode: Option<VerifyMode>,

    /// Shorthand for --mode exhaustive
    #[arg(long)]
    pub diff: bool,

    /// Report file (default: derived from tool, revision and mode)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Local checkout of the tool's source tree
    #[arg(long, value_name = "DIR")]
    pub tool_path: Option<PathBuf>,

    /// Revision to check out: branch, tag or commit
    #[arg(long, visible_alias = "commit", value_name = "REF")]
    pub revision: Option<String>,

    /// Local checkout of the patch catalog
    #[arg(long, visible_alias = "sites", value_name = "DIR")]
    pub catalog_path: Option<PathBuf>,

    /// Skip cloning and pulling; use the checkouts as they are
    #[arg(long)]
    pub no_refresh: bool,

    /// How a diff is judged: stderr (git apply output) or check (dry run)
    #[arg(long, value_name = "STRATEGY")]
    pub apply_strategy: Option<StrategyKind>,

    /// Print the results as JSON
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    /// Verification mode from the flags, falling back to `default`.
    pub fn mode_or(&self, default: VerifyMode) -> VerifyMode {
        if self.diff {
            VerifyMode::Exhaustive
        } else {
            self.mode.unwrap_or(default)
        }
    }
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
