//! Property-based tests for verification results and selections.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::path::Path;

use proptest::prelude::*;
use tempfile::TempDir;

use patchcheck::core::paths;
use patchcheck::core::results::{
    CatalogReport, DiffVariant, PatchResult, PatchStatus, TrialOutcome, TrialRecord,
};
use patchcheck::core::types::{PatchId, PatchSelection, VerifyMode};
use patchcheck::engine::{
    ApplyStrategy, ApplyTrial, NoProgress, PatchVerifier, TrialError, Workspace,
};
use patchcheck::git::mock::MockVcs;

/// Strategy for generating valid patch ids.
fn patch_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,15}"
}

fn outcome() -> impl Strategy<Value = TrialOutcome> {
    prop_oneof![Just(TrialOutcome::Clean), Just(TrialOutcome::Failed)]
}

fn patch_result(id: &str, outcomes: &[TrialOutcome]) -> PatchResult {
    let patch = PatchId::new(id).unwrap();
    let trials = outcomes
        .iter()
        .enumerate()
        .map(|(i, outcome)| TrialRecord {
            variant: DiffVariant::new(patch.clone(), format!("{id}/v{i}.diff")),
            outcome: *outcome,
        })
        .collect();
    PatchResult::from_trials(patch, trials)
}

/// Clean iff the staged diff says so.
struct ContentApply;

impl ApplyStrategy for ContentApply {
    fn name(&self) -> &'static str {
        "content"
    }

    fn apply(&self, staged: &Path, _workspace: &Path) -> Result<TrialOutcome, TrialError> {
        let content = std::fs::read_to_string(staged).map_err(|e| TrialError::Io {
            path: staged.to_path_buf(),
            source: e,
        })?;
        Ok(if content == "clean" {
            TrialOutcome::Clean
        } else {
            TrialOutcome::Failed
        })
    }
}

fn verify(outcomes: &[TrialOutcome], mode: VerifyMode) -> PatchResult {
    let dir = TempDir::new().unwrap();
    let checkout = dir.path().join("dwm");
    std::fs::create_dir_all(paths::git_dir(&checkout)).unwrap();
    let patch = PatchId::new("p").unwrap();

    let variants: Vec<DiffVariant> = outcomes
        .iter()
        .enumerate()
        .map(|(i, outcome)| {
            let path = dir.path().join(format!("v{i}.diff"));
            let content = if outcome.is_clean() { "clean" } else { "fail" };
            std::fs::write(&path, content).unwrap();
            DiffVariant::new(patch.clone(), path)
        })
        .collect();

    let vcs = MockVcs::new();
    let verifier = PatchVerifier::new(ApplyTrial::new(&vcs, &ContentApply));
    let mut workspace = Workspace::open(&checkout).unwrap();
    verifier
        .verify(&patch, &variants, &mut workspace, mode, &mut NoProgress)
        .unwrap()
}

proptest! {
    #[test]
    fn status_is_working_iff_any_clean(outcomes in prop::collection::vec(outcome(), 0..8)) {
        let result = patch_result("p", &outcomes);
        let expected = if outcomes.iter().any(TrialOutcome::is_clean) {
            PatchStatus::Working
        } else {
            PatchStatus::Broken
        };
        prop_assert_eq!(result.status(), expected);
    }

    #[test]
    fn report_counts_add_up(
        patches in prop::collection::vec(prop::collection::vec(outcome(), 0..4), 0..12)
    ) {
        let mut report = CatalogReport::new(VerifyMode::Exhaustive);
        for (i, outcomes) in patches.iter().enumerate() {
            report.push(patch_result(&format!("p{i}"), outcomes));
        }
        prop_assert_eq!(report.total(), patches.len());
        prop_assert_eq!(report.working() + report.broken(), report.total());
        prop_assert_eq!(report.broken_patches().len(), report.broken());
    }

    #[test]
    fn broken_patches_are_sorted(
        ids in prop::collection::btree_set(patch_id(), 0..10)
    ) {
        let mut report = CatalogReport::new(VerifyMode::Fast);
        for id in ids.iter().rev() {
            report.push(patch_result(id, &[TrialOutcome::Failed]));
        }
        let broken: Vec<&str> = report.broken_patches().iter().map(|p| p.as_str()).collect();
        let mut sorted = broken.clone();
        sorted.sort();
        prop_assert_eq!(broken, sorted);
    }

    #[test]
    fn selection_display_roundtrips(ids in prop::collection::vec(patch_id(), 1..6)) {
        let input = ids.join(",");
        let selection = PatchSelection::parse(&input).unwrap();
        let reparsed = PatchSelection::parse(&selection.to_string()).unwrap();
        prop_assert_eq!(selection, reparsed);
    }

    #[test]
    fn selection_has_no_duplicates(ids in prop::collection::vec(patch_id(), 1..6)) {
        let doubled = format!("{},{}", ids.join(","), ids.join(","));
        match PatchSelection::parse(&doubled).unwrap() {
            PatchSelection::Explicit(parsed) => {
                let mut unique = parsed.clone();
                unique.sort();
                unique.dedup();
                prop_assert_eq!(unique.len(), parsed.len());
            }
            PatchSelection::All => prop_assert!(false, "explicit list parsed as all"),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn fast_and_exhaustive_agree(outcomes in prop::collection::vec(outcome(), 0..6)) {
        let fast = verify(&outcomes, VerifyMode::Fast);
        let exhaustive = verify(&outcomes, VerifyMode::Exhaustive);

        prop_assert_eq!(fast.status(), exhaustive.status());
        prop_assert_eq!(exhaustive.trials().len(), outcomes.len());

        // Fast mode stops right after the first clean variant.
        let expected_fast = outcomes
            .iter()
            .position(TrialOutcome::is_clean)
            .map_or(outcomes.len(), |i| i + 1);
        prop_assert_eq!(fast.trials().len(), expected_fast);
    }
}
