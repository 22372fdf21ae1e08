//! Verification of single sentence records.
//!
//! [`verify_record`] resolves a record's sentence through a [`StepMatcher`],
//! checks the resolved step against the record's expectation and, when the
//! record declares expected arguments, compares them with the matched values.
//! Verification is pure: the registry and record are only read.

pub mod compare;
pub mod suite;

use crate::catalog::SentenceRecord;
use crate::matcher::{MatchResult, StepMatch, StepMatcher};
use crate::registry::{StepImpl, StepLocation, StepRegistry};
use crate::value::ArgMap;
use compare::{ArgumentError, compare_arguments};
use std::fmt;

/// Why a record failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// The sentence resolved to no step.
    NoMatch,
    /// The sentence resolved to a different step.
    WrongStep {
        /// Step the matcher resolved.
        actual: String,
        /// Step the record expected.
        expected: String,
    },
    /// A matched argument did not meet its expectation.
    Argument(ArgumentError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => f.write_str("sentence didn't match any step implementation"),
            Self::WrongStep { actual, expected } => write!(
                f,
                "sentence matched step \"{actual}\" instead of \"{expected}\""
            ),
            Self::Argument(err) => err.fmt(f),
        }
    }
}

/// Details of a failed record.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Reasons in detection order; never empty.
    pub reasons: Vec<FailureReason>,
    /// Source of the step the sentence resolved to, if any.
    pub location: Option<StepLocation>,
}

/// Result of verifying one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    /// The sentence resolved as expected.
    Passed,
    /// The sentence did not resolve as expected.
    Failed(Failure),
}

impl Verification {
    /// Return `true` for [`Verification::Passed`].
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Verify `record` against `registry` using `matcher`.
#[must_use]
pub fn verify_record(
    record: &SentenceRecord,
    registry: &StepRegistry,
    matcher: &dyn StepMatcher,
) -> Verification {
    let MatchResult::Matched(found) = matcher.find_match(&record.sentence, registry) else {
        return Verification::Failed(Failure {
            reasons: vec![FailureReason::NoMatch],
            location: None,
        });
    };
    let step = registry.get(&found.step);
    let location = step.map(|s| s.location().clone());

    if found.step != record.should_match {
        return Verification::Failed(Failure {
            reasons: vec![FailureReason::WrongStep {
                actual: found.step,
                expected: record.should_match.clone(),
            }],
            location,
        });
    }
    if record.expected.is_empty() {
        return Verification::Passed;
    }

    let actual = merge_arguments(step, found);
    let errors = compare_arguments(&record.expected, &actual);
    if errors.is_empty() {
        Verification::Passed
    } else {
        Verification::Failed(Failure {
            reasons: errors.into_iter().map(FailureReason::Argument).collect(),
            location,
        })
    }
}

/// Bind positional values to the step's argument names, then overlay named
/// values.
///
/// Positional values beyond the declared argument names are dropped.
#[must_use]
pub fn merge_arguments(step: Option<&StepImpl>, found: StepMatch) -> ArgMap {
    let mut merged: ArgMap = step
        .into_iter()
        .flat_map(StepImpl::argument_names)
        .map(str::to_owned)
        .zip(found.positional)
        .collect();
    merged.extend(found.named);
    merged
}
