//! check command - Verify a tool's patches against a revision
//!
//! # Flow
//!
//! Load config -> prepare workspace -> run catalog verifier -> write report
//!
//! Broken patches are the normal output of this command, not a failure.
//! Only configuration, catalog and workspace problems make it exit non-zero.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::catalog::Catalog;
use crate::cli::args::CheckArgs;
use crate::core::config::Config;
use crate::core::paths::{self, CheckoutPaths};
use crate::core::results::{DiffVariant, PatchResult, TrialOutcome};
use crate::core::types::{PatchId, VerifyMode};
use crate::engine::{
    strategy_for, ApplyTrial, CatalogVerifier, Context, PatchVerifier, Progress,
    WorkspaceProvider, WorkspaceRequest,
};
use crate::git::GitProvider;
use crate::report::{self, JsonReport};
use crate::ui::output::{self, Verbosity};

/// Prints progress as patches are verified.
struct ConsoleProgress {
    verbosity: Verbosity,
    mode: VerifyMode,
}

impl Progress for ConsoleProgress {
    fn patch_started(&mut self, patch: &PatchId, variants: usize) {
        output::print(patch, self.verbosity);
        if variants == 0 {
            output::print("  (no diffs)", self.verbosity);
        }
    }

    fn trial_finished(&mut self, variant: &DiffVariant, outcome: TrialOutcome) {
        if self.verbosity.shows_trials(self.mode.is_exhaustive()) {
            output::print(report::trial_line(variant, outcome), self.verbosity);
        }
    }

    fn patch_finished(&mut self, result: &PatchResult) {
        if !self.mode.is_exhaustive() && !result.is_working() {
            output::print("  broken", self.verbosity);
        }
    }
}

/// Run the check command.
pub fn check(ctx: &Context, args: &CheckArgs) -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    let mode = args.mode_or(config.mode());
    let strategy_kind = args.apply_strategy.unwrap_or(config.apply_strategy());

    // JSON owns stdout, so progress is silenced.
    let verbosity = Verbosity::from_flags(ctx.quiet || args.json, ctx.debug);

    let (tool_path, catalog_path) = checkout_locations(&config, args)?;
    let request = WorkspaceRequest {
        tool_url: config.tool_url(args.tool),
        tool_path,
        catalog_url: config.catalog_url(),
        catalog_path,
        revision: args
            .revision
            .clone()
            .unwrap_or_else(|| config.mainline().to_string()),
        mainline: config.mainline().to_string(),
        refresh: !args.no_refresh,
    };

    let vcs = GitProvider::new();
    let prepared = WorkspaceProvider::new(&vcs).prepare(&request)?;
    let mut workspace = prepared.workspace;
    let revision = prepared.revision;
    output::debug(format!("{} at {}", args.tool, revision), verbosity);

    let catalog = Catalog::for_tool(&request.catalog_path, args.tool)
        .with_extensions(config.extensions());
    let strategy = strategy_for(strategy_kind);
    let runner = CatalogVerifier::new(PatchVerifier::new(ApplyTrial::new(
        &vcs,
        strategy.as_ref(),
    )));

    let mut progress = ConsoleProgress { verbosity, mode };
    let report = runner.run(
        &args.patches,
        &catalog,
        &mut workspace,
        mode,
        &mut progress,
    )?;

    let output_path = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(paths::report_file_name(
            args.tool,
            &revision,
            &args.patches,
            mode,
        ))
    });
    report::write_report(&output_path, &report)?;

    if args.json {
        println!("{}", JsonReport::new(args.tool, &revision, &report).to_json()?);
    } else {
        output::print(report::summary_line(&report), verbosity);
        output::print(
            format!("Report written to {}", output_path.display()),
            verbosity,
        );
    }

    Ok(())
}

/// Tool and catalog checkouts: flags first, then the workspace root.
fn checkout_locations(config: &Config, args: &CheckArgs) -> Result<(PathBuf, PathBuf)> {
    if let (Some(tool), Some(catalog)) = (&args.tool_path, &args.catalog_path) {
        return Ok((tool.clone(), catalog.clone()));
    }

    let root = config.workspace_root()?;
    let defaults = CheckoutPaths::new(root, config.catalog_repo());
    Ok((
        args.tool_path
            .clone()
            .unwrap_or_else(|| defaults.tool_dir(args.tool)),
        args.catalog_path
            .clone()
            .unwrap_or_else(|| defaults.catalog_dir()),
    ))
}
