//! Errors raised while building a step registry.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use crate::matcher::pattern::PatternError;
use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Failures encountered while discovering or registering steps.
#[derive(Debug, Error, Diagnostic)]
pub enum RegistryError {
    /// A base directory could not be walked.
    #[error("failed to scan step sources in {root}")]
    #[diagnostic(
        code(stepcheck::registry::scan),
        help("check that the directory passed with --basedir exists and is readable")
    )]
    Scan {
        /// Directory being scanned.
        root: Utf8PathBuf,
        /// Underlying walk failure.
        #[source]
        source: walkdir::Error,
    },

    /// A step source file could not be read.
    #[error("failed to read step source {path}")]
    #[diagnostic(code(stepcheck::registry::read))]
    Read {
        /// File being read.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A path under a base directory is not valid UTF-8.
    #[error("step source path {path} is not valid UTF-8")]
    #[diagnostic(code(stepcheck::registry::non_utf8_path))]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// A step pattern failed to compile.
    #[error("step {step} at {location} has an invalid pattern")]
    #[diagnostic(code(stepcheck::registry::invalid_pattern))]
    InvalidPattern {
        /// Step name.
        step: String,
        /// Step location as `path:line`.
        location: String,
        /// Compilation failure.
        #[source]
        source: Box<PatternError>,
    },

    /// Two steps share a name.
    #[error("step {name} is defined twice: at {first} and at {second}")]
    #[diagnostic(
        code(stepcheck::registry::duplicate_step),
        help("step names identify implementations and must be unique")
    )]
    DuplicateStep {
        /// Conflicting name.
        name: String,
        /// Location of the first definition.
        first: String,
        /// Location of the second definition.
        second: String,
    },
}
