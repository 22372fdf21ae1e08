//! Type-aware comparison of expected and matched arguments.

use crate::catalog::{ExpectedArg, ExpectedArgs};
use crate::value::{ArgKind, ArgMap, ArgValue};
use itertools::Itertools;
use thiserror::Error;

/// One argument that did not meet its expectation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgumentError {
    /// The matched step produced no value under this name.
    #[error(
        "expected argument \"{name}\" is not among the matched arguments [{}]",
        available.iter().join(", ")
    )]
    Missing {
        /// Expected argument name.
        name: String,
        /// Names that were matched, in binding order.
        available: Vec<String>,
    },

    /// The matched value has a different kind.
    #[error("expected argument \"{name}\" to be of type {expected}, but it is {actual}")]
    KindMismatch {
        /// Argument name.
        name: String,
        /// Kind the catalog expects.
        expected: ArgKind,
        /// Kind that was matched.
        actual: ArgKind,
    },

    /// The matched value differs.
    #[error("expected argument \"{name}\" with value \"{expected}\" but matched \"{actual}\"")]
    ValueMismatch {
        /// Argument name.
        name: String,
        /// Value the catalog expects.
        expected: ArgValue,
        /// Value that was matched.
        actual: ArgValue,
    },
}

/// Check a single expectation against the matched arguments.
///
/// Checks run in order (presence, kind, value) and stop at the first failure.
#[must_use]
pub fn check_argument(name: &str, expected: &ExpectedArg, actual: &ArgMap) -> Option<ArgumentError> {
    let Some(value) = actual.get(name) else {
        return Some(ArgumentError::Missing {
            name: name.to_owned(),
            available: actual.keys().cloned().collect(),
        });
    };
    if value.kind() != expected.kind() {
        return Some(ArgumentError::KindMismatch {
            name: name.to_owned(),
            expected: expected.kind(),
            actual: value.kind(),
        });
    }
    (value != expected.value()).then(|| ArgumentError::ValueMismatch {
        name: name.to_owned(),
        expected: expected.value().clone(),
        actual: value.clone(),
    })
}

/// Check every expectation independently.
///
/// Errors are returned in the iteration order of `expected`; a failing
/// argument never suppresses checks of its siblings.
///
/// ```rust
/// use stepcheck::catalog::{ExpectedArg, ExpectedArgs};
/// use stepcheck::value::{ArgMap, ArgValue};
/// use stepcheck::verify::compare::compare_arguments;
///
/// let mut expected = ExpectedArgs::new();
/// expected.insert("arg".into(), ExpectedArg::from(5_i64));
/// let mut actual = ArgMap::new();
/// actual.insert("arg".into(), ArgValue::Integer(5));
/// assert!(compare_arguments(&expected, &actual).is_empty());
/// ```
#[must_use]
pub fn compare_arguments(expected: &ExpectedArgs, actual: &ArgMap) -> Vec<ArgumentError> {
    expected
        .iter()
        .filter_map(|(name, spec)| check_argument(name, spec, actual))
        .collect()
}
