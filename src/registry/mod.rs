//! Step implementation registry.
//!
//! A [`StepRegistry`] is built once per run, by a [`StepLoader`], and then
//! passed by reference to every verification call. Steps keep their
//! registration order so coverage listings are stable.
//!
//! ```rust
//! use stepcheck::registry::{StepImpl, StepLocation, StepParam, StepRegistry};
//!
//! let step = StepImpl::new(
//!     "have_cukes",
//!     StepLocation::new("tests/steps.rs", 12),
//!     vec![StepParam::new("world", Some("&World")), StepParam::new("count", Some("u32"))],
//!     stepcheck::registry::StepPattern::placeholder("I have {count} cukes"),
//! )
//! .expect("valid pattern");
//! let mut registry = StepRegistry::default();
//! registry.insert(step).expect("unique name");
//! assert_eq!(registry.len(), 1);
//! ```

mod error;
mod scan;

pub use error::RegistryError;
pub use scan::SourceScanner;

use crate::matcher::pattern::CompiledPattern;
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use std::fmt;

/// Source position of a step implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepLocation {
    path: Utf8PathBuf,
    line: usize,
}

impl StepLocation {
    /// Record a `path:line` location.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }

    /// File containing the step.
    #[must_use]
    pub fn path(&self) -> &camino::Utf8Path {
        self.path.as_path()
    }

    /// One-based line of the step function.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for StepLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

/// A declared parameter of a step function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepParam {
    /// Parameter binding name.
    pub name: String,
    /// Declared type, when the source spelled one out.
    pub ty: Option<String>,
}

impl StepParam {
    /// Describe a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Option<&str>) -> Self {
        Self {
            name: name.into(),
            ty: ty.map(str::to_owned),
        }
    }
}

/// How a step pattern should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSyntax {
    /// Literal text with `{name}` / `{name:type}` / `{}` placeholders.
    Placeholder,
    /// A regular expression; named groups are named arguments.
    Regex,
}

/// Uncompiled step pattern as written in the step source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPattern {
    /// Pattern text.
    pub text: String,
    /// Interpretation of [`Self::text`].
    pub syntax: PatternSyntax,
}

impl StepPattern {
    /// A placeholder pattern.
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            syntax: PatternSyntax::Placeholder,
        }
    }

    /// A regular expression pattern.
    #[must_use]
    pub fn regex(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            syntax: PatternSyntax::Regex,
        }
    }
}

/// A registered step implementation.
#[derive(Debug, Clone)]
pub struct StepImpl {
    name: String,
    location: StepLocation,
    params: Vec<StepParam>,
    pattern: CompiledPattern,
}

impl StepImpl {
    /// Describe a step and compile its pattern.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPattern`] when the pattern does not
    /// compile.
    pub fn new(
        name: impl Into<String>,
        location: StepLocation,
        params: Vec<StepParam>,
        pattern: StepPattern,
    ) -> Result<Self, RegistryError> {
        let step_name = name.into();
        let compiled = CompiledPattern::compile(&pattern, &params).map_err(|source| {
            RegistryError::InvalidPattern {
                step: step_name.clone(),
                location: location.to_string(),
                source: Box::new(source),
            }
        })?;
        Ok(Self {
            name: step_name,
            location,
            params,
            pattern: compiled,
        })
    }

    /// Unique step name (the function name).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the step is defined.
    #[must_use]
    pub const fn location(&self) -> &StepLocation {
        &self.location
    }

    /// All declared parameters, including the leading context parameter.
    #[must_use]
    pub fn params(&self) -> &[StepParam] {
        &self.params
    }

    /// Names that positional matches bind to.
    ///
    /// The first declared parameter is the implicit step context and never
    /// receives a matched value.
    pub fn argument_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().skip(1).map(|p| p.name.as_str())
    }

    /// Compiled pattern used by the matcher.
    #[must_use]
    pub const fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }
}

/// Read-only mapping of step name to implementation, in registration order.
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    steps: IndexMap<String, StepImpl>,
}

impl StepRegistry {
    /// Register `step`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateStep`] if a step with the same name
    /// is already registered.
    pub fn insert(&mut self, step: StepImpl) -> Result<(), RegistryError> {
        if let Some(existing) = self.steps.get(step.name()) {
            return Err(RegistryError::DuplicateStep {
                name: step.name().to_owned(),
                first: existing.location().to_string(),
                second: step.location().to_string(),
            });
        }
        self.steps.insert(step.name().to_owned(), step);
        Ok(())
    }

    /// Look up a step by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StepImpl> {
        self.steps.get(name)
    }

    /// Return `true` when `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Number of registered steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Return `true` when no step is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate over steps in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &StepImpl> {
        self.steps.values()
    }
}

impl<'a> IntoIterator for &'a StepRegistry {
    type Item = &'a StepImpl;
    type IntoIter = indexmap::map::Values<'a, String, StepImpl>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.values()
    }
}

/// Source of a populated [`StepRegistry`].
#[cfg_attr(test, mockall::automock)]
pub trait StepLoader {
    /// Build the registry.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] when step sources cannot be read or
    /// contain invalid definitions.
    fn load(&self) -> Result<StepRegistry, RegistryError>;

    /// Human-readable description of where steps are loaded from.
    fn describe(&self) -> String;
}
