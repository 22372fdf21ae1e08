//! Resolve sentences to step implementations.
//!
//! Verification treats matching as a black box behind [`StepMatcher`]. The
//! default [`PatternMatcher`] tries each registered step's compiled pattern
//! in registration order and returns the first full-sentence match.

pub mod pattern;

use crate::registry::StepRegistry;
use crate::value::ArgValue;
use indexmap::IndexMap;
use tracing::trace;

/// A sentence resolved to a step together with the extracted arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct StepMatch {
    /// Name of the matched step.
    pub step: String,
    /// Values bound by position to the step's argument parameters.
    pub positional: Vec<ArgValue>,
    /// Values bound by name.
    pub named: IndexMap<String, ArgValue>,
}

impl StepMatch {
    /// A match without extracted arguments.
    #[must_use]
    pub fn bare(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            positional: Vec::new(),
            named: IndexMap::new(),
        }
    }

    /// Add a positional value.
    #[must_use]
    pub fn with_positional(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a named value.
    #[must_use]
    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }
}

/// Outcome of resolving one sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// No step accepts the sentence.
    NoMatch,
    /// The sentence resolved to a step.
    Matched(StepMatch),
}

/// Resolves sentences against a registry.
#[cfg_attr(test, mockall::automock)]
pub trait StepMatcher {
    /// Resolve `sentence` against `registry`.
    fn find_match(&self, sentence: &str, registry: &StepRegistry) -> MatchResult;
}

/// Matcher backed by each step's compiled pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatcher;

impl StepMatcher for PatternMatcher {
    fn find_match(&self, sentence: &str, registry: &StepRegistry) -> MatchResult {
        for step in registry {
            if let Some(captured) = step.pattern().captures(sentence) {
                trace!(sentence, step = step.name(), "sentence matched");
                return MatchResult::Matched(StepMatch {
                    step: step.name().to_owned(),
                    positional: captured.positional,
                    named: captured.named,
                });
            }
        }
        MatchResult::NoMatch
    }
}
