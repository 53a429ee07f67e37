//! ui::output
//!
//! Console output for a check run.
//!
//! # Design
//!
//! A run writes three kinds of lines:
//!
//! - Progress on stdout: one line per patch, plus one line per diff in
//!   exhaustive mode (per diff in fast mode only with `--debug`)
//! - The summary line and report location on stdout once the run finishes
//! - Errors on stderr, always, as `error: <cause chain>`
//!
//! `-q` silences the first two. `--json` implies `-q` so stdout carries
//! only the JSON document.

use std::fmt::Display;

/// How much a run prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Progress and summary.
    Normal,
    /// Also every fast-mode trial and workspace details.
    Debug,
}

impl Verbosity {
    /// `-q` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Whether per-diff lines are shown for a run in the given mode.
    pub fn shows_trials(self, exhaustive: bool) -> bool {
        match self {
            Verbosity::Quiet => false,
            Verbosity::Normal => exhaustive,
            Verbosity::Debug => true,
        }
    }
}

/// Progress or summary line on stdout.
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{message}");
    }
}

/// Line shown only with `--debug`.
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {message}");
    }
}

/// Fatal error, shown even with `-q`.
pub fn error(message: impl Display) {
    eprintln!("error: {message}");
}

/// Join items one per line, each behind `prefix`.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{prefix}{item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
