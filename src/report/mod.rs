//! report
//!
//! Rendering of a finished run: the report file, the summary line and the
//! JSON document.
//!
//! # File formats
//!
//! Fast mode writes one broken patch id per line, sorted:
//!
//! ```text
//! beta
//! gamma
//! ```
//!
//! Exhaustive mode writes every evaluated patch in report order, each
//! followed by one line per trial:
//!
//! ```text
//! alpha
//!   dwm-alpha-6.1.diff false
//!   dwm-alpha-6.4.diff true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::core::results::{CatalogReport, DiffVariant, PatchStatus, TrialOutcome};
use crate::core::types::{Revision, Tool, VerifyMode};

/// Errors from writing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Render the report file for the report's mode.
pub fn render(report: &CatalogReport) -> String {
    match report.mode() {
        VerifyMode::Fast => render_summary(report),
        VerifyMode::Exhaustive => render_exhaustive(report),
    }
}

/// Broken patch ids, sorted, one per line.
pub fn render_summary(report: &CatalogReport) -> String {
    report
        .broken_patches()
        .iter()
        .map(|id| format!("{id}\n"))
        .collect()
}

/// Every patch with the outcome of each of its trials.
pub fn render_exhaustive(report: &CatalogReport) -> String {
    let mut out = String::new();
    for result in report.results() {
        out.push_str(result.patch().as_str());
        out.push('\n');
        for trial in result.trials() {
            out.push_str(&trial_line(&trial.variant, trial.outcome));
            out.push('\n');
        }
    }
    out
}

/// One exhaustive-mode line: `  <file name> <true|false>`.
pub fn trial_line(variant: &DiffVariant, outcome: TrialOutcome) -> String {
    format!("  {} {}", variant.file_name(), outcome.is_clean())
}

/// Write the rendered report to `path`, replacing any existing file.
///
/// # Errors
///
/// [`ReportError::Write`] if the file cannot be written.
pub fn write_report(path: &Path, report: &CatalogReport) -> Result<(), ReportError> {
    fs::write(path, render(report)).map_err(|e| ReportError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// One-line summary printed after a run.
pub fn summary_line(report: &CatalogReport) -> String {
    format!("{}/{} broken patches", report.broken(), report.total())
}

/// Machine-readable view of a run.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub tool: Tool,
    pub revision: &'a Revision,
    pub mode: VerifyMode,
    pub total: usize,
    pub working: usize,
    pub broken: usize,
    pub patches: Vec<JsonPatch<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonPatch<'a> {
    pub id: &'a str,
    pub status: PatchStatus,
    pub trials: Vec<JsonTrial>,
}

#[derive(Debug, Serialize)]
pub struct JsonTrial {
    pub file: String,
    pub path: PathBuf,
    pub clean: bool,
}

impl<'a> JsonReport<'a> {
    pub fn new(tool: Tool, revision: &'a Revision, report: &'a CatalogReport) -> Self {
        let patches = report
            .results()
            .iter()
            .map(|result| JsonPatch {
                id: result.patch().as_str(),
                status: result.status(),
                trials: result
                    .trials()
                    .iter()
                    .map(|t| JsonTrial {
                        file: t.variant.file_name(),
                        path: t.variant.path().to_path_buf(),
                        clean: t.outcome.is_clean(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            tool,
            revision,
            mode: report.mode(),
            total: report.total(),
            working: report.working(),
            broken: report.broken(),
            patches,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
