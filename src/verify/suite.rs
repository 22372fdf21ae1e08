//! Verification of whole batches.

use super::verify_record;
use crate::catalog::{RecordEntry, RecordError, SentenceRecord};
use crate::matcher::StepMatcher;
use crate::registry::StepRegistry;
use crate::report::Reporter;
use indexmap::IndexSet;
use tracing::debug;

/// Running totals of a verification run.
///
/// A tally is never mutated in place by callers: [`Tally::record`] and
/// [`Tally::merge`] consume it and return the updated value, so batches fold
/// into a run total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    passed: usize,
    failed: usize,
    covered: IndexSet<String>,
}

impl Tally {
    /// Sentences that verified.
    #[must_use]
    pub const fn passed(&self) -> usize {
        self.passed
    }

    /// Sentences that did not verify.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failed
    }

    /// All verified sentences.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// Step names targeted by at least one attempted record, in first-seen
    /// order.
    #[must_use]
    pub const fn covered(&self) -> &IndexSet<String> {
        &self.covered
    }

    /// Count one attempted record targeting `step`.
    #[must_use]
    pub fn record(mut self, step: &str, passed: bool) -> Self {
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.covered.insert(step.to_owned());
        self
    }

    /// Combine two tallies; covered names are unioned.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.passed += other.passed;
        self.failed += other.failed;
        self.covered.extend(other.covered);
        self
    }
}

/// Verify every record of `batch` in order.
///
/// Match and argument failures are counted and reported; the batch always
/// runs to completion unless a record is malformed.
///
/// # Errors
///
/// Returns a [`RecordError`] for the first record lacking `sentence` or
/// `should_match`; records before it have already been reported.
pub fn run_suite(
    batch: &[RecordEntry],
    registry: &StepRegistry,
    matcher: &dyn StepMatcher,
    reporter: &mut dyn Reporter,
) -> Result<Tally, RecordError> {
    batch
        .iter()
        .enumerate()
        .try_fold(Tally::default(), |tally, (idx, entry)| {
            let record = SentenceRecord::from_entry(entry, idx + 1)?;
            reporter.record_started(&record);
            let outcome = verify_record(&record, registry, matcher);
            debug!(
                sentence = %record.sentence,
                expected = %record.should_match,
                passed = outcome.is_passed(),
                "verified sentence"
            );
            reporter.record_finished(&outcome);
            Ok(tally.record(&record.should_match, outcome.is_passed()))
        })
}
