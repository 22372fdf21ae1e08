//! Given/when step definitions for match verification scenarios.

use rstest_bdd_macros::{given, when};
use stepcheck::catalog::FileBatchLoader;
use stepcheck::matcher::PatternMatcher;
use stepcheck::output_prefs::OutputPrefs;
use stepcheck::registry::SourceScanner;
use stepcheck::report::TextReporter;
use stepcheck::runner::{RunPlan, verify_catalogs};
use test_support::error::display_error_chain;

use super::state::{MatchesState, RunOutcome, StepResult};

const CUKE_STEPS: &str = include_str!("../fixtures/steps/cukes.rs");

macro_rules! catalog_step {
    ($fn_name:ident, $desc:literal, $file:literal, $yaml:expr) => {
        #[given($desc)]
        fn $fn_name(matches_state: &MatchesState) -> StepResult<()> {
            let workspace = matches_state.workspace()?;
            let path = workspace
                .write_catalog($file, $yaml)
                .map_err(|error| format!("failed to write {}: {error}", $file))?;
            matches_state.add_catalog(path);
            Ok(())
        }
    };
}

catalog_step!(
    a_passing_catalog,
    "a catalog where every sentence matches",
    "passing.yml",
    include_str!("../fixtures/catalogs/passing.yml")
);

catalog_step!(
    a_mismatching_catalog,
    "a catalog with a wrong argument and a wrong step",
    "mismatch.yml",
    include_str!("../fixtures/catalogs/mismatch.yml")
);

catalog_step!(
    a_partial_catalog,
    "a catalog covering half of the steps",
    "partial.yml",
    include_str!("../fixtures/catalogs/partial.yml")
);

catalog_step!(
    an_empty_catalog,
    "an empty catalog",
    "empty.yml",
    include_str!("../fixtures/catalogs/empty.yml")
);

catalog_step!(
    a_malformed_catalog,
    "a catalog with a record lacking should_match",
    "malformed.yml",
    include_str!("../fixtures/catalogs/malformed.yml")
);

#[given("step sources defining the cuke steps")]
fn cuke_step_sources(matches_state: &MatchesState) -> StepResult<()> {
    let workspace = matches_state.workspace()?;
    workspace
        .write_steps("cukes.rs", CUKE_STEPS)
        .map_err(|error| format!("failed to write step sources: {error}"))?;
    Ok(())
}

#[given("step sources without any step")]
fn empty_step_sources(matches_state: &MatchesState) -> StepResult<()> {
    let workspace = matches_state.workspace()?;
    workspace
        .write_steps("helpers.rs", "pub fn helper() {}\n")
        .map_err(|error| format!("failed to write step sources: {error}"))?;
    Ok(())
}

#[given("a minimum coverage of {minimum}")]
fn minimum_coverage(matches_state: &MatchesState, minimum: f64) {
    matches_state.minimum.set(minimum);
}

#[given("missing steps are listed")]
fn missing_steps_listed(matches_state: &MatchesState) {
    matches_state.show_missing.set(true);
}

#[when("the catalogs are verified")]
fn catalogs_are_verified(matches_state: &MatchesState) -> StepResult<()> {
    let workspace = matches_state.workspace()?;
    let plan = RunPlan {
        catalogs: matches_state.catalogs.get().unwrap_or_default(),
        minimum: matches_state.minimum.get(),
        show_missing: matches_state.show_missing.get().unwrap_or(false),
    };
    let scanner = SourceScanner::new(vec![workspace.steps_dir()]);
    let mut reporter = TextReporter::new(Vec::new(), OutputPrefs::with_emoji(false));
    let result = verify_catalogs(
        &plan,
        &scanner,
        &FileBatchLoader,
        &PatternMatcher,
        &mut reporter,
    );
    let report = String::from_utf8(reporter.into_inner())
        .map_err(|error| format!("report is not UTF-8: {error}"))?;
    let outcome = match result {
        Ok(status) => RunOutcome {
            status,
            report,
            error: None,
        },
        Err(error) => RunOutcome {
            status: error.exit_status(),
            report,
            error: Some(display_error_chain(&error)),
        },
    };
    matches_state.outcome.set(outcome);
    Ok(())
}
