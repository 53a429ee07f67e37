//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves defaults from configuration
//! 2. Calls the engine to do the work
//! 3. Formats and displays output
//!
//! Handlers never spawn git themselves; that goes through [`crate::git`].

mod check;
mod completion;
mod list;

pub use check::check;
pub use completion::completion;
pub use list::list;

use crate::cli::args::Command;
use crate::engine::Context;
use anyhow::Result;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Check(args) => check(ctx, &args),
        Command::List {
            tool,
            catalog_path,
            diffs,
        } => list(ctx, tool, catalog_path, diffs),
        Command::Completion { shell } => completion(shell),
    }
}
