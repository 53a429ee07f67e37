//! ui
//!
//! User-facing terminal output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! Progress and results go to stdout through [`output`] and respect
//! `--quiet`. Diagnostics go through `tracing` to stderr.

pub mod output;
