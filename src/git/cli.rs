//! git::cli
//!
//! Operations delegated to the `git` binary.
//!
//! Network operations (clone, pull) go through the binary so that every
//! transport and credential helper the user has configured keeps working.
//! `git apply` goes through the binary because its error channel is the
//! signal the default apply strategy classifies.
//!
//! Every command gets an explicit working directory; nothing here reads or
//! changes the process's current directory.

use std::path::Path;
use std::process::{Command, Output};

use tracing::debug;

use super::GitError;

/// What `git apply` reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutput {
    /// Whether the process exited successfully.
    pub success: bool,
    /// Raw bytes written to stderr.
    pub stderr: Vec<u8>,
}

impl ApplyOutput {
    /// Check whether anything was written to the error channel.
    pub fn has_error_output(&self) -> bool {
        !self.stderr.is_empty()
    }
}

/// Clone `url` into `dest`.
pub fn clone(url: &str, dest: &Path) -> Result<(), GitError> {
    let dest_arg = dest.to_string_lossy();
    let output = run(None, &["clone", url, &dest_arg])?;
    check_success(&["clone", url, &dest_arg], output)
}

/// Pull `branch` from `remote` into the checkout at `dir`.
pub fn pull(dir: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
    let args = ["pull", remote, branch];
    let output = run(Some(dir), &args)?;
    check_success(&args, output)
}

/// Run `git apply <diff>` inside `dir` and capture its error channel.
///
/// A non-zero exit is not an error here: it is reported through
/// [`ApplyOutput`]. Only a failure to start the process is an error.
pub fn apply(dir: &Path, diff: &Path) -> Result<ApplyOutput, GitError> {
    let diff_arg = diff.to_string_lossy();
    let output = run(Some(dir), &["apply", &diff_arg])?;
    Ok(ApplyOutput {
        success: output.status.success(),
        stderr: output.stderr,
    })
}

fn run(dir: Option<&Path>, args: &[&str]) -> Result<Output, GitError> {
    let mut command = Command::new("git");
    command.args(args);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }

    debug!(dir = ?dir, "git {}", args.join(" "));
    command.output().map_err(|e| GitError::Launch {
        command: format!("git {}", args.join(" ")),
        source: e,
    })
}

fn check_success(args: &[&str], output: Output) -> Result<(), GitError> {
    if output.status.success() {
        return Ok(());
    }
    Err(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stderr_is_no_error_output() {
        let output = ApplyOutput {
            success: true,
            stderr: Vec::new(),
        };
        assert!(!output.has_error_output());
    }

    #[test]
    fn warnings_count_as_error_output() {
        let output = ApplyOutput {
            success: true,
            stderr: b"warning: 1 line adds whitespace errors.\n".to_vec(),
        };
        assert!(output.has_error_output());
    }

    #[test]
    fn pull_outside_repository_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = pull(dir.path(), "origin", "master");
        assert!(matches!(
            result,
            Err(GitError::CommandFailed { .. }) | Err(GitError::Launch { .. })
        ));
    }
}
