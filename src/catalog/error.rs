//! Errors raised while loading sentence catalogs.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Failures reading or interpreting a catalog file.
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("failed to read sentence catalog {path}")]
    #[diagnostic(code(stepcheck::catalog::read))]
    Read {
        /// Catalog path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML.
    #[error("failed to parse sentence catalog {path}: {message}")]
    #[diagnostic(code(stepcheck::catalog::parse))]
    Parse {
        /// Catalog path.
        path: Utf8PathBuf,
        /// Parser message.
        message: String,
    },

    /// The document is valid YAML but not a list of records.
    #[error("sentence catalog {path} must be a list of records, found {found}")]
    #[diagnostic(
        code(stepcheck::catalog::not_a_sequence),
        help("each catalog entry starts with `- sentence: ...`")
    )]
    NotASequence {
        /// Catalog path.
        path: Utf8PathBuf,
        /// Kind of the top-level node.
        found: &'static str,
    },

    /// A record has an unusable shape.
    #[error("record #{record} in {path} is invalid: {reason}")]
    #[diagnostic(code(stepcheck::catalog::invalid_record))]
    InvalidRecord {
        /// Catalog path.
        path: Utf8PathBuf,
        /// One-based record position.
        record: usize,
        /// What is wrong with it.
        reason: String,
    },
}

/// A record that lacks one of its required keys.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("record #{record} is missing `{field}`")]
#[diagnostic(
    code(stepcheck::catalog::missing_field),
    help("every record needs both `sentence` and `should_match`")
)]
pub struct RecordError {
    /// One-based record position within its batch.
    pub record: usize,
    /// Name of the missing key.
    pub field: &'static str,
}
