//! Then step definitions for match verification scenarios.

use rstest_bdd_macros::then;

use super::state::{MatchesState, StepResult};

#[then("the run ends with status {status}")]
fn run_ends_with_status(matches_state: &MatchesState, status: String) -> StepResult<()> {
    let outcome = matches_state.outcome()?;
    if outcome.status.to_string() == status {
        Ok(())
    } else {
        Err(format!(
            "expected status {status}, got {} (error: {:?})\n{}",
            outcome.status, outcome.error, outcome.report
        ))
    }
}

#[then("the report contains {text}")]
fn report_contains(matches_state: &MatchesState, text: String) -> StepResult<()> {
    let outcome = matches_state.outcome()?;
    if outcome.report.contains(&text) {
        Ok(())
    } else {
        Err(format!(
            "expected report to contain '{text}', got:\n{}",
            outcome.report
        ))
    }
}

#[then("the error mentions {text}")]
fn error_mentions(matches_state: &MatchesState, text: String) -> StepResult<()> {
    let outcome = matches_state.outcome()?;
    match outcome.error {
        Some(message) if message.contains(&text) => Ok(()),
        Some(message) => Err(format!("expected error to mention '{text}', got: {message}")),
        None => Err(format!("expected an error mentioning '{text}', but the run finished")),
    }
}

#[then("nothing is reported")]
fn nothing_is_reported(matches_state: &MatchesState) -> StepResult<()> {
    let outcome = matches_state.outcome()?;
    if outcome.report.is_empty() {
        Ok(())
    } else {
        Err(format!("expected no report, got:\n{}", outcome.report))
    }
}
