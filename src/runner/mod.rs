//! Run orchestration.
//!
//! This module keeps `main` minimal by providing a single entry point,
//! [`run`], that wires the concrete collaborators together and hands them to
//! [`verify_catalogs`], which owns the order of a verification run.

mod error;

pub use error::RunnerError;

use crate::catalog::{BatchLoader, FileBatchLoader};
use crate::cli::{Cli, Commands};
use crate::coverage::CoverageReport;
use crate::exit_status::ExitStatus;
use crate::matcher::{PatternMatcher, StepMatcher};
use crate::output_prefs;
use crate::registry::{SourceScanner, StepLoader};
use crate::report::{Reporter, TextReporter};
use crate::verify::suite::{Tally, run_suite};
use camino::Utf8PathBuf;
use std::io;
use tracing::{debug, info};

/// Highest minimum coverage that can be met.
pub const MAX_COVERAGE: f64 = 100.0;

/// What a verification run should do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunPlan {
    /// Catalogs to verify, in order.
    pub catalogs: Vec<Utf8PathBuf>,
    /// Minimum coverage in percent, if one is enforced.
    pub minimum: Option<f64>,
    /// Whether to list uncovered steps.
    pub show_missing: bool,
}

/// Execute the parsed [`Cli`] and report to standard output.
///
/// # Errors
///
/// Returns a [`RunnerError`] when the run is aborted; its
/// [`RunnerError::exit_status`] gives the process status.
pub fn run(cli: &Cli) -> Result<ExitStatus, RunnerError> {
    let Some(Commands::Matches(args)) = &cli.command else {
        return Err(RunnerError::NoCommand);
    };
    let plan = RunPlan {
        catalogs: args.catalogs.clone(),
        minimum: cli.cover_min_percentage,
        show_missing: cli.cover_show_missing,
    };
    let loader = SourceScanner::new(cli.basedirs());
    let prefs = output_prefs::resolve(cli.no_emoji);
    let mut reporter = TextReporter::new(io::stdout().lock(), prefs);
    verify_catalogs(&plan, &loader, &FileBatchLoader, &PatternMatcher, &mut reporter)
}

/// Verify every catalog in `plan` and derive the final status.
///
/// The minimum is checked before anything is loaded; an empty registry or an
/// empty catalog ends the run before matching. Match failures never abort:
/// they are tallied and only influence the returned status.
///
/// # Errors
///
/// Returns a [`RunnerError`] for every fatal condition.
pub fn verify_catalogs(
    plan: &RunPlan,
    steps: &dyn StepLoader,
    batches: &dyn BatchLoader,
    matcher: &dyn StepMatcher,
    reporter: &mut dyn Reporter,
) -> Result<ExitStatus, RunnerError> {
    if let Some(minimum) = plan.minimum.filter(|m| *m > MAX_COVERAGE) {
        return Err(RunnerError::MinimumOutOfRange { minimum });
    }

    let registry = steps.load()?;
    if registry.is_empty() {
        return Err(RunnerError::NoSteps {
            sources: steps.describe(),
        });
    }
    info!(steps = registry.len(), "loaded step registry");

    let mut tally = Tally::default();
    for path in &plan.catalogs {
        let batch = batches.load_batch(path)?;
        if batch.is_empty() {
            return Err(RunnerError::EmptyBatch { path: path.clone() });
        }
        debug!(%path, records = batch.len(), "verifying catalog");
        reporter.batch_started(path);
        let batch_tally = run_suite(&batch, &registry, matcher, reporter).map_err(|source| {
            RunnerError::MalformedRecord {
                path: path.clone(),
                source,
            }
        })?;
        reporter.batch_finished();
        tally = tally.merge(batch_tally);
    }

    reporter.summary(&tally);
    let coverage = CoverageReport::compute(&registry, tally.covered());
    reporter.coverage(&coverage, plan.minimum);
    if plan.show_missing {
        reporter.missing_steps(&coverage.missing);
    }

    let status = ExitStatus::derive(
        tally.failed(),
        plan.minimum.map(|minimum| coverage.meets(minimum)),
    );
    info!(
        passed = tally.passed(),
        failed = tally.failed(),
        coverage = coverage.percentage,
        %status,
        "verification finished"
    );
    Ok(status)
}

#[cfg(test)]
mod tests;
