//! Line-oriented reporting of verification progress.
//!
//! The [`Reporter`] trait receives events in run order: per batch a header,
//! then for each record a start event immediately followed by its outcome,
//! then the run summary, coverage and missing steps. [`TextReporter`] renders
//! them as plain text; [`SilentReporter`] discards them.

use crate::catalog::SentenceRecord;
use crate::coverage::{CoverageReport, MissingStep};
use crate::output_prefs::OutputPrefs;
use crate::verify::Verification;
use crate::verify::suite::Tally;
use camino::Utf8Path;
use itertools::Itertools;
use std::io::Write;

/// Receive verification progress.
pub trait Reporter {
    /// A batch file is about to be verified.
    fn batch_started(&mut self, source: &Utf8Path);

    /// A record is about to be verified.
    fn record_started(&mut self, record: &SentenceRecord);

    /// The record announced by the last [`Reporter::record_started`] finished.
    fn record_finished(&mut self, outcome: &Verification);

    /// The current batch is complete.
    fn batch_finished(&mut self);

    /// All batches are complete.
    fn summary(&mut self, tally: &Tally);

    /// Coverage for the run, with the requested minimum if any.
    fn coverage(&mut self, report: &CoverageReport, minimum: Option<f64>);

    /// Steps no record targeted.
    fn missing_steps(&mut self, missing: &[MissingStep]);
}

/// Plain text reporter.
///
/// Write failures are ignored: reporting must never abort verification.
#[derive(Debug)]
pub struct TextReporter<W> {
    out: W,
    prefs: OutputPrefs,
}

impl<W: Write> TextReporter<W> {
    /// Report to `out` using the markers selected by `prefs`.
    #[must_use]
    pub const fn new(out: W, prefs: OutputPrefs) -> Self {
        Self { out, prefs }
    }

    /// Consume the reporter and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn batch_started(&mut self, source: &Utf8Path) {
        drop(writeln!(self.out, "Testing sentences from {source}:"));
    }

    fn record_started(&mut self, record: &SentenceRecord) {
        drop(write!(
            self.out,
            ">> STEP \"{}\" SHOULD MATCH {}    ",
            record.sentence, record.should_match
        ));
    }

    fn record_finished(&mut self, outcome: &Verification) {
        match outcome {
            Verification::Passed => drop(writeln!(self.out, "{}", self.prefs.pass_marker())),
            Verification::Failed(failure) => {
                drop(write!(self.out, "{}", self.prefs.fail_marker()));
                if let Some(location) = &failure.location {
                    drop(write!(self.out, " (at {location})"));
                }
                drop(writeln!(self.out));
                for reason in &failure.reasons {
                    drop(writeln!(self.out, "  - {reason}"));
                }
            }
        }
        drop(self.out.flush());
    }

    fn batch_finished(&mut self) {
        drop(writeln!(self.out));
    }

    fn summary(&mut self, tally: &Tally) {
        let passed = (tally.passed() > 0).then(|| format!("{} passed", tally.passed()));
        let failed = (tally.failed() > 0).then(|| format!("{} failed", tally.failed()));
        drop(writeln!(
            self.out,
            "{} sentences ({})",
            tally.total(),
            passed.into_iter().chain(failed).join(", ")
        ));
    }

    fn coverage(&mut self, report: &CoverageReport, minimum: Option<f64>) {
        drop(write!(
            self.out,
            "Covered {} of {} step implementations",
            report.covered_steps, report.total_steps
        ));
        if let Some(min) = minimum {
            drop(write!(self.out, " (coverage: {:.2}%", report.percentage));
            if !report.meets(min) {
                drop(write!(self.out, ", expected a minimum of {min}%"));
            }
            drop(write!(self.out, ")"));
        }
        drop(writeln!(self.out));
    }

    fn missing_steps(&mut self, missing: &[MissingStep]) {
        if missing.is_empty() {
            return;
        }
        drop(writeln!(self.out, "Missing steps:"));
        for step in missing {
            drop(writeln!(self.out, "- {} at {}", step.name, step.location));
        }
    }
}

/// Silent reporter: emits nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn batch_started(&mut self, _source: &Utf8Path) {}
    fn record_started(&mut self, _record: &SentenceRecord) {}
    fn record_finished(&mut self, _outcome: &Verification) {}
    fn batch_finished(&mut self) {}
    fn summary(&mut self, _tally: &Tally) {}
    fn coverage(&mut self, _report: &CoverageReport, _minimum: Option<f64>) {}
    fn missing_steps(&mut self, _missing: &[MissingStep]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RecordEntry;
    use crate::registry::StepLocation;
    use crate::verify::{Failure, FailureReason};
    use rstest::rstest;

    fn render(emoji: bool, f: impl FnOnce(&mut TextReporter<Vec<u8>>)) -> String {
        let mut reporter = TextReporter::new(Vec::new(), OutputPrefs::with_emoji(emoji));
        f(&mut reporter);
        String::from_utf8(reporter.into_inner()).expect("utf-8 output")
    }

    fn record() -> SentenceRecord {
        SentenceRecord::from_entry(&RecordEntry::new("I eat", "eat"), 1).expect("record")
    }

    #[rstest]
    #[case::emoji(true, ">> STEP \"I eat\" SHOULD MATCH eat    ✔\n")]
    #[case::plain(false, ">> STEP \"I eat\" SHOULD MATCH eat    PASS\n")]
    fn passing_record_is_one_line(#[case] emoji: bool, #[case] expected: &str) {
        let out = render(emoji, |r| {
            r.record_started(&record());
            r.record_finished(&Verification::Passed);
        });
        assert_eq!(out, expected);
    }

    #[rstest]
    fn failing_record_lists_location_and_reasons() {
        let failure = Failure {
            reasons: vec![FailureReason::WrongStep {
                actual: "drink".into(),
                expected: "eat".into(),
            }],
            location: Some(StepLocation::new("tests/steps.rs", 7)),
        };
        let out = render(false, |r| {
            r.record_started(&record());
            r.record_finished(&Verification::Failed(failure));
        });
        assert_eq!(
            out,
            concat!(
                ">> STEP \"I eat\" SHOULD MATCH eat    FAIL (at tests/steps.rs:7)\n",
                "  - sentence matched step \"drink\" instead of \"eat\"\n",
            )
        );
    }

    #[rstest]
    #[case::all_passed(3, 0, "3 sentences (3 passed)\n")]
    #[case::mixed(1, 2, "3 sentences (1 passed, 2 failed)\n")]
    #[case::all_failed(0, 2, "2 sentences (2 failed)\n")]
    fn summary_omits_zero_counts(#[case] passed: usize, #[case] failed: usize, #[case] expected: &str) {
        let tally = (0..passed)
            .map(|_| true)
            .chain((0..failed).map(|_| false))
            .fold(Tally::default(), |t, ok| t.record("step", ok));
        assert_eq!(render(true, |r| r.summary(&tally)), expected);
    }

    #[rstest]
    #[case::no_minimum(None, "Covered 1 of 4 step implementations\n")]
    #[case::met(Some(25.0), "Covered 1 of 4 step implementations (coverage: 25.00%)\n")]
    #[case::short(
        Some(30.0),
        "Covered 1 of 4 step implementations (coverage: 25.00%, expected a minimum of 30%)\n"
    )]
    fn coverage_line(#[case] minimum: Option<f64>, #[case] expected: &str) {
        let report = CoverageReport {
            total_steps: 4,
            covered_steps: 1,
            percentage: 25.0,
            missing: Vec::new(),
        };
        assert_eq!(render(true, |r| r.coverage(&report, minimum)), expected);
    }

    #[rstest]
    fn missing_steps_are_listed_with_locations() {
        let missing = [
            MissingStep {
                name: "eat".into(),
                location: StepLocation::new("a.rs", 3),
            },
            MissingStep {
                name: "drink".into(),
                location: StepLocation::new("b.rs", 9),
            },
        ];
        assert_eq!(
            render(true, |r| r.missing_steps(&missing)),
            "Missing steps:\n- eat at a.rs:3\n- drink at b.rs:9\n"
        );
        assert_eq!(render(true, |r| r.missing_steps(&[])), "");
    }
}
