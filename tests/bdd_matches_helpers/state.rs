//! Shared behavioural-test state for match verification scenarios.

use std::sync::Arc;

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use stepcheck::exit_status::ExitStatus;
use test_support::StepWorkspace;

/// Step result type for match verification BDD tests.
pub type StepResult<T> = Result<T, String>;

/// What a verification run produced.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    /// Final or abort status.
    pub(crate) status: ExitStatus,
    /// Report written to the output stream.
    pub(crate) report: String,
    /// Diagnostic message when the run aborted.
    pub(crate) error: Option<String>,
}

/// Shared scenario state for match verification behavioural tests.
#[derive(Default, ScenarioState)]
pub struct MatchesState {
    /// Scenario-scoped temporary directory with step sources and catalogs.
    pub(crate) workspace: Slot<Arc<StepWorkspace>>,

    /// Catalogs to verify, in order.
    pub(crate) catalogs: Slot<Vec<Utf8PathBuf>>,

    /// Requested minimum coverage.
    pub(crate) minimum: Slot<f64>,

    /// Whether uncovered steps should be listed.
    pub(crate) show_missing: Slot<bool>,

    /// Outcome of the `when` step.
    pub(crate) outcome: Slot<RunOutcome>,
}

impl MatchesState {
    /// Return the scenario workspace, creating it on first use.
    pub(crate) fn workspace(&self) -> StepResult<Arc<StepWorkspace>> {
        if let Some(existing) = self.workspace.get() {
            return Ok(existing);
        }
        let created = Arc::new(
            StepWorkspace::new().map_err(|error| format!("failed to create workspace: {error}"))?,
        );
        self.workspace.set(Arc::clone(&created));
        Ok(created)
    }

    /// Append a catalog to the run.
    pub(crate) fn add_catalog(&self, path: Utf8PathBuf) {
        let mut catalogs = self.catalogs.get().unwrap_or_default();
        catalogs.push(path);
        self.catalogs.set(catalogs);
    }

    /// Outcome recorded by the `when` step.
    pub(crate) fn outcome(&self) -> StepResult<RunOutcome> {
        self.outcome
            .get()
            .ok_or_else(|| String::from("catalogs have not been verified yet"))
    }
}

/// Fixture providing a fresh match verification state.
#[fixture]
pub fn matches_state() -> MatchesState {
    MatchesState::default()
}
