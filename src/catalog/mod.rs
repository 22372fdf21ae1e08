//! Sentence catalog loading.
//!
//! A catalog (batch) is a YAML list of records:
//!
//! ```yaml
//! - sentence: I have 5 cukes
//!   should_match: have_cukes
//!   with-arguments:
//!     - count: 5
//!     - ratio:
//!         type: float
//!         value: 5
//! - sentence: I eat them
//!   should_match: eat_cukes
//! ```
//!
//! YAML is parsed with `serde-saphyr` into an order-preserving JSON value, with
//! `~`/`null` scalars resolved to null, and then converted by hand so each
//! shape problem gets a precise diagnostic.
//! Expected arguments are resolved once, at load time, into
//! [`ExpectedArg::Literal`] or [`ExpectedArg::Explicit`]. The `sentence` and
//! `should_match` keys stay optional in [`RecordEntry`]; the suite runner
//! turns a missing key into a [`RecordError`] when it reaches that record.

mod error;
mod yaml;

pub use error::{CatalogError, RecordError};

use crate::value::{ArgKind, ArgValue};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fs;
use yaml::YamlValue;

/// Key holding the expected arguments of a record.
pub const WITH_ARGUMENTS: &str = "with-arguments";

/// Expected arguments keyed by name, in catalog order.
pub type ExpectedArgs = IndexMap<String, ExpectedArg>;

/// One batch of records, in file order.
pub type Batch = Vec<RecordEntry>;

/// The expectation for a single matched argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedArg {
    /// A bare literal; its own kind is the expected kind.
    Literal(ArgValue),
    /// An explicit `{type, value}` pair.
    Explicit {
        /// Expected kind.
        kind: ArgKind,
        /// Expected value, already coerced into `kind` where lossless.
        value: ArgValue,
    },
}

impl ExpectedArg {
    /// Declare an explicit expectation, coercing `value` into `kind`.
    #[must_use]
    pub fn explicit(kind: ArgKind, value: impl Into<ArgValue>) -> Self {
        Self::Explicit {
            kind,
            value: value.into().coerce(kind),
        }
    }

    /// Kind the actual value must have.
    #[must_use]
    pub const fn kind(&self) -> ArgKind {
        match self {
            Self::Literal(value) => value.kind(),
            Self::Explicit { kind, .. } => *kind,
        }
    }

    /// Value the actual value must equal.
    #[must_use]
    pub const fn value(&self) -> &ArgValue {
        match self {
            Self::Literal(value) | Self::Explicit { value, .. } => value,
        }
    }
}

impl<T: Into<ArgValue>> From<T> for ExpectedArg {
    fn from(value: T) -> Self {
        Self::Literal(value.into())
    }
}

/// A catalog record as written; required keys may still be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordEntry {
    /// Sentence to resolve.
    pub sentence: Option<String>,
    /// Name of the step the sentence should resolve to.
    pub should_match: Option<String>,
    /// Merged argument expectations, when the record declares any.
    pub with_arguments: Option<ExpectedArgs>,
}

impl RecordEntry {
    /// A complete record without argument expectations.
    #[must_use]
    pub fn new(sentence: impl Into<String>, should_match: impl Into<String>) -> Self {
        Self {
            sentence: Some(sentence.into()),
            should_match: Some(should_match.into()),
            with_arguments: None,
        }
    }

    /// Add an argument expectation.
    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, expected: impl Into<ExpectedArg>) -> Self {
        self.with_arguments
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), expected.into());
        self
    }
}

/// A validated record ready for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceRecord {
    /// Sentence to resolve.
    pub sentence: String,
    /// Name of the step the sentence should resolve to.
    pub should_match: String,
    /// Argument expectations; empty means "do not check arguments".
    pub expected: ExpectedArgs,
}

impl SentenceRecord {
    /// Validate `entry`, which sits at one-based position `record`.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] naming the first missing required key.
    pub fn from_entry(entry: &RecordEntry, record: usize) -> Result<Self, RecordError> {
        let sentence = entry.sentence.clone().ok_or(RecordError {
            record,
            field: "sentence",
        })?;
        let should_match = entry.should_match.clone().ok_or(RecordError {
            record,
            field: "should_match",
        })?;
        Ok(Self {
            sentence,
            should_match,
            expected: entry.with_arguments.clone().unwrap_or_default(),
        })
    }
}

/// Source of record batches.
#[cfg_attr(test, mockall::automock)]
pub trait BatchLoader {
    /// Load the batch stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] when the batch cannot be read or parsed.
    fn load_batch(&self, path: &Utf8Path) -> Result<Batch, CatalogError>;
}

/// Reads batches from YAML files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileBatchLoader;

impl BatchLoader for FileBatchLoader {
    fn load_batch(&self, path: &Utf8Path) -> Result<Batch, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        parse_batch(&text, path)
    }
}

/// Parse catalog `text`; `path` labels diagnostics.
///
/// Blank or comment-only documents, `null` and empty lists all yield an empty
/// batch.
///
/// # Errors
///
/// Returns a [`CatalogError`] when the YAML is invalid or a record has an
/// unusable shape.
pub fn parse_batch(text: &str, path: &Utf8Path) -> Result<Batch, CatalogError> {
    if is_blank_document(text) {
        return Ok(Batch::new());
    }
    let doc = serde_saphyr::from_str::<YamlValue>(text)
        .map(YamlValue::into_inner)
        .map_err(|e| CatalogError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    match doc {
        Value::Null => Ok(Batch::new()),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                parse_record(item).map_err(|reason| CatalogError::InvalidRecord {
                    path: path.to_path_buf(),
                    record: idx + 1,
                    reason,
                })
            })
            .collect(),
        other => Err(CatalogError::NotASequence {
            path: Utf8PathBuf::from(path),
            found: json_kind(&other),
        }),
    }
}

fn is_blank_document(text: &str) -> bool {
    text.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

fn parse_record(item: Value) -> Result<RecordEntry, String> {
    let Value::Object(mut map) = item else {
        return Err(format!("expected a mapping, found {}", json_kind(&item)));
    };
    let sentence = optional_string(&mut map, "sentence")?;
    let should_match = optional_string(&mut map, "should_match")?;
    let with_arguments = match map.remove(WITH_ARGUMENTS) {
        None | Some(Value::Null) => None,
        Some(Value::Array(fragments)) => Some(merge_fragments(fragments)?),
        Some(other) => {
            return Err(format!(
                "`{WITH_ARGUMENTS}` must be a list of mappings, found {}",
                json_kind(&other)
            ));
        }
    };
    Ok(RecordEntry {
        sentence,
        should_match,
        with_arguments,
    })
}

fn optional_string(map: &mut Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(format!(
            "`{key}` must be a string, found {}",
            json_kind(&other)
        )),
    }
}

/// Merge `with-arguments` fragments left to right; later keys win.
fn merge_fragments(fragments: Vec<Value>) -> Result<ExpectedArgs, String> {
    let mut merged = ExpectedArgs::new();
    for fragment in fragments {
        let Value::Object(entries) = fragment else {
            return Err(format!(
                "`{WITH_ARGUMENTS}` entries must be mappings, found {}",
                json_kind(&fragment)
            ));
        };
        for (name, spec) in entries {
            let expected = parse_expected(&name, spec)?;
            merged.insert(name, expected);
        }
    }
    Ok(merged)
}

/// Resolve one expectation: a mapping with a `type` key is explicit, any
/// other value is a literal.
fn parse_expected(name: &str, spec: Value) -> Result<ExpectedArg, String> {
    let Value::Object(mut map) = spec else {
        return Ok(ExpectedArg::Literal(ArgValue::from(spec)));
    };
    let Some(type_name) = map.remove("type") else {
        return Ok(ExpectedArg::Literal(ArgValue::from(Value::Object(map))));
    };
    let Value::String(type_text) = type_name else {
        return Err(format!("argument `{name}` has a non-string `type`"));
    };
    let kind: ArgKind = type_text
        .parse()
        .map_err(|e| format!("argument `{name}`: {e}"))?;
    let value = map
        .remove("value")
        .ok_or_else(|| format!("argument `{name}` declares a type but no `value`"))?;
    Ok(ExpectedArg::explicit(kind, ArgValue::from(value)))
}
