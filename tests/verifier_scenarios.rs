//! Scenario tests for patch and catalog verification.
//!
//! Version control is the in-memory `MockVcs`; diffs are judged by a
//! scripted strategy that reads the verdict from the diff file itself.
//! A diff file holds `<name> <clean|fail>`.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use patchcheck::catalog::{Catalog, CatalogError};
use patchcheck::core::paths;
use patchcheck::core::results::{
    CatalogReport, DiffVariant, PatchResult, PatchStatus, TrialOutcome,
};
use patchcheck::core::types::{PatchId, PatchSelection, VerifyMode};
use patchcheck::engine::{
    ApplyStrategy, ApplyTrial, CatalogVerifier, NoProgress, PatchVerifier, RunError, TrialError,
    Workspace,
};
use patchcheck::git::mock::{MockOperation, MockVcs};

/// Judges a staged diff by its content and remembers what it saw.
#[derive(Default)]
struct ScriptedApply {
    seen: RefCell<Vec<String>>,
}

impl ScriptedApply {
    fn seen(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl ApplyStrategy for ScriptedApply {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn apply(&self, staged: &Path, _workspace: &Path) -> Result<TrialOutcome, TrialError> {
        let content = std::fs::read_to_string(staged).map_err(|e| TrialError::Io {
            path: staged.to_path_buf(),
            source: e,
        })?;
        let mut parts = content.split_whitespace();
        let name = parts.next().unwrap_or_default().to_string();
        let verdict = parts.next().unwrap_or_default();
        self.seen.borrow_mut().push(name);
        Ok(if verdict == "clean" {
            TrialOutcome::Clean
        } else {
            TrialOutcome::Failed
        })
    }
}

struct Fixture {
    _dir: TempDir,
    checkout: PathBuf,
    catalog_root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let checkout = dir.path().join("dwm");
        std::fs::create_dir_all(paths::git_dir(&checkout)).unwrap();
        let catalog_root = dir.path().join("sites/dwm.suckless.org/patches");
        std::fs::create_dir_all(&catalog_root).unwrap();
        Self {
            _dir: dir,
            checkout,
            catalog_root,
        }
    }

    /// Add a diff `<patch>/<file>` whose verdict is `clean` or `fail`.
    fn diff(&self, patch: &str, file: &str, verdict: &str) -> DiffVariant {
        let dir = self.catalog_root.join(patch);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file);
        let name = file.trim_end_matches(".diff");
        std::fs::write(&path, format!("{name} {verdict}\n")).unwrap();
        DiffVariant::new(PatchId::new(patch).unwrap(), path)
    }

    fn empty_patch(&self, patch: &str) {
        std::fs::create_dir_all(self.catalog_root.join(patch)).unwrap();
        std::fs::write(self.catalog_root.join(patch).join("index.md"), "").unwrap();
    }

    fn catalog(&self) -> Catalog {
        Catalog::at(&self.catalog_root)
    }

    fn workspace(&self) -> Workspace {
        Workspace::open(&self.checkout).unwrap()
    }
}

fn run_catalog(
    fx: &Fixture,
    strategy: &ScriptedApply,
    vcs: &MockVcs,
    selection: &str,
    mode: VerifyMode,
) -> Result<CatalogReport, RunError> {
    let runner = CatalogVerifier::new(PatchVerifier::new(ApplyTrial::new(vcs, strategy)));
    let mut workspace = fx.workspace();
    runner.run(
        &PatchSelection::parse(selection).unwrap(),
        &fx.catalog(),
        &mut workspace,
        mode,
        &mut NoProgress,
    )
}

fn verify_patch(
    fx: &Fixture,
    strategy: &ScriptedApply,
    variants: &[DiffVariant],
    mode: VerifyMode,
) -> PatchResult {
    let vcs = MockVcs::new();
    let verifier = PatchVerifier::new(ApplyTrial::new(&vcs, strategy));
    let mut workspace = fx.workspace();
    verifier
        .verify(
            variants[0].patch(),
            variants,
            &mut workspace,
            mode,
            &mut NoProgress,
        )
        .unwrap()
}

mod scenario_a {
    use super::*;

    #[test]
    fn fast_mode_halts_after_first_clean() {
        let fx = Fixture::new();
        let variants = vec![fx.diff("x", "v1.diff", "fail"), fx.diff("x", "v2.diff", "clean")];
        let strategy = ScriptedApply::default();

        let result = verify_patch(&fx, &strategy, &variants, VerifyMode::Fast);
        assert_eq!(result.status(), PatchStatus::Working);
        assert_eq!(strategy.seen(), vec!["v1", "v2"]);
    }

    #[test]
    fn clean_variant_first_halts_immediately() {
        let fx = Fixture::new();
        let variants = vec![fx.diff("x", "v2.diff", "clean"), fx.diff("x", "v1.diff", "fail")];
        let strategy = ScriptedApply::default();

        let result = verify_patch(&fx, &strategy, &variants, VerifyMode::Fast);
        assert_eq!(result.status(), PatchStatus::Working);
        assert_eq!(strategy.seen(), vec!["v2"]);
        assert_eq!(result.trials().len(), 1);
    }

    #[test]
    fn exhaustive_mode_agrees_on_status() {
        let fx = Fixture::new();
        let variants = vec![fx.diff("x", "v1.diff", "fail"), fx.diff("x", "v2.diff", "clean")];
        let strategy = ScriptedApply::default();

        let result = verify_patch(&fx, &strategy, &variants, VerifyMode::Exhaustive);
        assert_eq!(result.status(), PatchStatus::Working);
        assert_eq!(result.trials().len(), 2);
    }
}

mod scenario_b {
    use super::*;

    #[test]
    fn all_failing_is_broken_in_both_modes() {
        for mode in [VerifyMode::Fast, VerifyMode::Exhaustive] {
            let fx = Fixture::new();
            let variants =
                vec![fx.diff("y", "v1.diff", "fail"), fx.diff("y", "v2.diff", "fail")];
            let strategy = ScriptedApply::default();

            let result = verify_patch(&fx, &strategy, &variants, mode);
            assert_eq!(result.status(), PatchStatus::Broken, "mode {mode}");
        }
    }

    #[test]
    fn exhaustive_records_every_failure() {
        let fx = Fixture::new();
        let variants = vec![fx.diff("y", "v1.diff", "fail"), fx.diff("y", "v2.diff", "fail")];
        let strategy = ScriptedApply::default();

        let result = verify_patch(&fx, &strategy, &variants, VerifyMode::Exhaustive);
        let outcomes: Vec<TrialOutcome> = result.trials().iter().map(|t| t.outcome).collect();
        assert_eq!(outcomes, vec![TrialOutcome::Failed, TrialOutcome::Failed]);
    }
}

mod scenario_c {
    use super::*;

    #[test]
    fn absent_patch_is_rejected_before_any_trial() {
        let fx = Fixture::new();
        fx.diff("alpha", "a.diff", "clean");
        let strategy = ScriptedApply::default();
        let vcs = MockVcs::new();

        let err = run_catalog(&fx, &strategy, &vcs, "Z", VerifyMode::Fast).unwrap_err();
        match err {
            RunError::Catalog(CatalogError::UnknownPatches { patches, .. }) => {
                assert_eq!(patches, vec!["Z".to_string()]);
            }
            other => panic!("expected UnknownPatches, got {other:?}"),
        }
        assert!(strategy.seen().is_empty());
        assert!(vcs.operations().is_empty());
    }
}

mod scenario_d {
    use super::*;

    #[test]
    fn exhaustive_records_every_clean_variant() {
        let fx = Fixture::new();
        let variants = vec![
            fx.diff("w", "v1.diff", "clean"),
            fx.diff("w", "v2.diff", "clean"),
            fx.diff("w", "v3.diff", "clean"),
        ];
        let strategy = ScriptedApply::default();

        let result = verify_patch(&fx, &strategy, &variants, VerifyMode::Exhaustive);
        assert_eq!(result.status(), PatchStatus::Working);
        assert_eq!(result.trials().len(), 3);
        assert!(result.trials().iter().all(|t| t.outcome.is_clean()));
    }
}

mod catalog_runs {
    use super::*;

    fn populate(fx: &Fixture) {
        fx.diff("systray", "dwm-systray-6.1.diff", "fail");
        fx.diff("systray", "dwm-systray-6.4.diff", "clean");
        fx.diff("alpha", "dwm-alpha-6.1.diff", "fail");
        fx.empty_patch("gaps");
    }

    #[test]
    fn patch_without_diffs_is_broken() {
        let fx = Fixture::new();
        populate(&fx);
        let strategy = ScriptedApply::default();
        let report =
            run_catalog(&fx, &strategy, &MockVcs::new(), "gaps", VerifyMode::Fast).unwrap();
        assert_eq!(report.broken(), 1);
        assert!(report.results()[0].trials().is_empty());
    }

    #[test]
    fn counts_patches_not_diffs() {
        let fx = Fixture::new();
        populate(&fx);
        let strategy = ScriptedApply::default();
        let report =
            run_catalog(&fx, &strategy, &MockVcs::new(), "all", VerifyMode::Exhaustive).unwrap();
        assert_eq!(report.total(), 3);
        assert_eq!(report.working(), 1);
        assert_eq!(report.broken(), 2);
        assert_eq!(report.working() + report.broken(), report.total());
    }

    #[test]
    fn runs_are_deterministic() {
        let fx = Fixture::new();
        populate(&fx);
        let first = run_catalog(
            &fx,
            &ScriptedApply::default(),
            &MockVcs::new(),
            "all",
            VerifyMode::Exhaustive,
        )
        .unwrap();
        let second = run_catalog(
            &fx,
            &ScriptedApply::default(),
            &MockVcs::new(),
            "all",
            VerifyMode::Exhaustive,
        )
        .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn all_selection_is_sorted() {
        let fx = Fixture::new();
        populate(&fx);
        let report = run_catalog(
            &fx,
            &ScriptedApply::default(),
            &MockVcs::new(),
            "all",
            VerifyMode::Fast,
        )
        .unwrap();
        let order: Vec<&str> = report.results().iter().map(|r| r.patch().as_str()).collect();
        assert_eq!(order, vec!["alpha", "gaps", "systray"]);
    }

    #[test]
    fn every_trial_is_followed_by_restore() {
        let fx = Fixture::new();
        populate(&fx);
        let vcs = MockVcs::new();
        let strategy = ScriptedApply::default();
        run_catalog(&fx, &strategy, &vcs, "systray,alpha", VerifyMode::Exhaustive).unwrap();

        let ops = vcs.operations();
        assert_eq!(strategy.seen().len(), 3);
        assert_eq!(ops.len(), 12);
        for trial in ops.chunks(4) {
            assert!(matches!(trial[0], MockOperation::SnapshotIgnored { .. }));
            assert!(matches!(trial[1], MockOperation::HardReset { .. }));
            assert!(matches!(trial[2], MockOperation::Clean { .. }));
            assert!(matches!(trial[3], MockOperation::RemoveIgnored { .. }));
        }
    }
}
