//! Error types for the runner module.
//!
//! This submodule isolates derive-macro-affected code to scope lint suppressions
//! narrowly. The `unused_assignments` lint fires in some Rust versions due to
//! thiserror/miette derive macro expansion.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros. The unused_assignments lint fires in some
// Rust versions but not others. Since `#[expect]` fails when the lint doesn't
// fire, and `unfulfilled_lint_expectations` cannot be expected, we must use
// `#[allow]` here.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use crate::catalog::{CatalogError, RecordError};
use crate::exit_status::ExitStatus;
use crate::registry::RegistryError;
use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Conditions that end a run before a final status can be derived.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// No subcommand was supplied.
    #[error("no command given")]
    #[diagnostic(code(stepcheck::runner::no_command), help("try `stepcheck matches <CATALOG>`"))]
    NoCommand,

    /// The requested minimum coverage cannot be reached.
    #[error("a minimum coverage of {minimum:.2}% cannot be reached")]
    #[diagnostic(
        code(stepcheck::runner::minimum_out_of_range),
        help("choose a minimum between 0 and 100")
    )]
    MinimumOutOfRange {
        /// Requested minimum.
        minimum: f64,
    },

    /// Step sources could not be loaded.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    /// The step sources define no steps.
    #[error("no step implementations found in {sources}")]
    #[diagnostic(
        code(stepcheck::runner::no_steps),
        help("point --basedir at the directories holding your step definitions")
    )]
    NoSteps {
        /// Description of the scanned sources.
        sources: String,
    },

    /// A catalog could not be loaded.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    /// A catalog holds no records.
    #[error("no sentences found in {path} to test against")]
    #[diagnostic(code(stepcheck::runner::empty_batch))]
    EmptyBatch {
        /// Catalog path.
        path: Utf8PathBuf,
    },

    /// A record lacks a required key.
    #[error("malformed record in {path}")]
    #[diagnostic(code(stepcheck::runner::malformed_record))]
    MalformedRecord {
        /// Catalog path.
        path: Utf8PathBuf,
        /// The offending record.
        #[source]
        #[diagnostic_source]
        source: RecordError,
    },
}

impl RunnerError {
    /// Exit status reported for this error.
    #[must_use]
    pub const fn exit_status(&self) -> ExitStatus {
        match self {
            Self::NoCommand
            | Self::MinimumOutOfRange { .. }
            | Self::Registry(_)
            | Self::Catalog(_) => ExitStatus::InvalidConfiguration,
            Self::NoSteps { .. } => ExitStatus::NoSteps,
            Self::EmptyBatch { .. } => ExitStatus::EmptyBatch,
            Self::MalformedRecord { .. } => ExitStatus::MalformedRecord,
        }
    }
}
