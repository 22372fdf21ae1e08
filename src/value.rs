//! Comparable argument values.
//!
//! Matched step arguments and catalog expectations are both expressed as
//! [`ArgValue`]s. Each value belongs to exactly one [`ArgKind`]; comparisons
//! check the kind first and only then the value, so a whole-number float is
//! never equal to an integer.
//!
//! ```rust
//! use stepcheck::value::{ArgKind, ArgValue};
//!
//! let value = ArgValue::from(5_i64);
//! assert_eq!(value.kind(), ArgKind::Integer);
//! assert_ne!(value, ArgValue::Float(5.0));
//! ```

use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt;
use std::str::FromStr;

/// Ordered mapping of argument names to values.
pub type ArgMap = IndexMap<String, ArgValue>;

/// The closed set of kinds an argument value can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Signed whole numbers.
    Integer,
    /// Floating point numbers.
    Float,
    /// Text.
    String,
    /// `true` or `false`.
    Boolean,
    /// Ordered sequence of values.
    List,
    /// Name to value mapping.
    Mapping,
    /// Absence of a value.
    Null,
}

impl ArgKind {
    /// Canonical name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::List => "list",
            Self::Mapping => "mapping",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a type name does not denote a known [`ArgKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown argument type '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for ArgKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            "str" | "string" => Ok(Self::String),
            "bool" | "boolean" => Ok(Self::Boolean),
            "list" => Ok(Self::List),
            "dict" | "map" | "mapping" => Ok(Self::Mapping),
            "null" | "none" => Ok(Self::Null),
            _ => Err(UnknownKind(s.to_owned())),
        }
    }
}

/// A single argument value.
///
/// Equality follows the rule of each kind: floats use IEEE equality so `NaN`
/// never matches, lists compare element-wise in order and mappings compare by
/// key set regardless of insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// See [`ArgKind::Integer`].
    Integer(i64),
    /// See [`ArgKind::Float`].
    Float(f64),
    /// See [`ArgKind::String`].
    String(String),
    /// See [`ArgKind::Boolean`].
    Boolean(bool),
    /// See [`ArgKind::List`].
    List(Vec<ArgValue>),
    /// See [`ArgKind::Mapping`].
    Mapping(ArgMap),
    /// See [`ArgKind::Null`].
    Null,
}

impl ArgValue {
    /// Return the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ArgKind {
        match self {
            Self::Integer(_) => ArgKind::Integer,
            Self::Float(_) => ArgKind::Float,
            Self::String(_) => ArgKind::String,
            Self::Boolean(_) => ArgKind::Boolean,
            Self::List(_) => ArgKind::List,
            Self::Mapping(_) => ArgKind::Mapping,
            Self::Null => ArgKind::Null,
        }
    }

    /// Convert this value into `kind` when the conversion loses nothing.
    ///
    /// Only integers widen, to floats, and only while the float holds them
    /// exactly. Any other combination returns the value unchanged so that the
    /// later kind or value check reports the mismatch.
    ///
    /// ```rust
    /// use stepcheck::value::{ArgKind, ArgValue};
    ///
    /// assert_eq!(ArgValue::Integer(2).coerce(ArgKind::Float), ArgValue::Float(2.0));
    /// assert_eq!(ArgValue::Integer(5).coerce(ArgKind::String), ArgValue::Integer(5));
    /// assert_eq!(ArgValue::Null.coerce(ArgKind::List), ArgValue::Null);
    /// ```
    #[must_use]
    pub fn coerce(self, kind: ArgKind) -> Self {
        match (self, kind) {
            (Self::Integer(n), ArgKind::Float) => exact_float(n).map_or(Self::Integer(n), Self::Float),
            (other, _) => other,
        }
    }

    /// Parse `raw` as a value of `kind`.
    ///
    /// Returns `None` when the text is not a valid literal for the kind, or
    /// when the kind has no textual form.
    #[must_use]
    pub fn parse_as(raw: &str, kind: ArgKind) -> Option<Self> {
        let text = raw.trim();
        match kind {
            ArgKind::Integer => text.parse().ok().map(Self::Integer),
            ArgKind::Float => text.parse().ok().map(Self::Float),
            ArgKind::Boolean => text.parse().ok().map(Self::Boolean),
            ArgKind::String => Some(Self::String(raw.to_owned())),
            ArgKind::List | ArgKind::Mapping | ArgKind::Null => None,
        }
    }
}

/// Largest magnitude up to which every integer has an exact `f64`.
const MAX_EXACT_FLOAT_INT: u64 = 1 << f64::MANTISSA_DIGITS;

#[expect(
    clippy::cast_precision_loss,
    reason = "magnitude is checked against the f64 mantissa first"
)]
fn exact_float(n: i64) -> Option<f64> {
    (n.unsigned_abs() <= MAX_EXACT_FLOAT_INT).then_some(n as f64)
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Self::Mapping(map) => write!(
                f,
                "{{{}}}",
                map.iter().map(|(k, v)| format!("{k}: {v}")).join(", ")
            ),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<serde_json::Value> for ArgValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("int", ArgKind::Integer)]
    #[case("Integer", ArgKind::Integer)]
    #[case("float", ArgKind::Float)]
    #[case("str", ArgKind::String)]
    #[case("bool", ArgKind::Boolean)]
    #[case("list", ArgKind::List)]
    #[case("dict", ArgKind::Mapping)]
    #[case("none", ArgKind::Null)]
    fn parses_type_names(#[case] name: &str, #[case] expected: ArgKind) {
        assert_eq!(name.parse::<ArgKind>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_type_name() {
        assert_eq!(
            "decimal".parse::<ArgKind>(),
            Err(UnknownKind("decimal".into()))
        );
    }

    #[test]
    fn whole_float_is_not_an_integer() {
        assert_ne!(ArgValue::Float(5.0), ArgValue::Integer(5));
    }

    #[test]
    fn nan_never_equals_itself() {
        assert_ne!(ArgValue::Float(f64::NAN), ArgValue::Float(f64::NAN));
    }

    #[test]
    fn mapping_equality_ignores_order() {
        let left = ArgValue::from(json!({"a": 1, "b": 2}));
        let right = ArgValue::from(json!({"b": 2, "a": 1}));
        assert_eq!(left, right);
    }

    #[test]
    fn list_equality_respects_order() {
        let left = ArgValue::from(json!([1, 2]));
        let right = ArgValue::from(json!([2, 1]));
        assert_ne!(left, right);
    }

    #[rstest]
    #[case(json!(3), ArgKind::Integer)]
    #[case(json!(3.5), ArgKind::Float)]
    #[case(json!("x"), ArgKind::String)]
    #[case(json!(false), ArgKind::Boolean)]
    #[case(json!([1]), ArgKind::List)]
    #[case(json!({"k": "v"}), ArgKind::Mapping)]
    #[case(json!(null), ArgKind::Null)]
    fn converts_json_kinds(#[case] input: serde_json::Value, #[case] kind: ArgKind) {
        assert_eq!(ArgValue::from(input).kind(), kind);
    }

    #[rstest]
    #[case("42", ArgKind::Integer, Some(ArgValue::Integer(42)))]
    #[case("-7", ArgKind::Integer, Some(ArgValue::Integer(-7)))]
    #[case("4.5", ArgKind::Float, Some(ArgValue::Float(4.5)))]
    #[case("true", ArgKind::Boolean, Some(ArgValue::Boolean(true)))]
    #[case("abc", ArgKind::Integer, None)]
    #[case("abc", ArgKind::List, None)]
    fn parses_captured_text(
        #[case] raw: &str,
        #[case] kind: ArgKind,
        #[case] expected: Option<ArgValue>,
    ) {
        assert_eq!(ArgValue::parse_as(raw, kind), expected);
    }

    #[rstest]
    #[case::small(2, ArgValue::Float(2.0))]
    #[case::above_i32(3_000_000_000, ArgValue::Float(3_000_000_000.0))]
    #[case::mantissa_limit(-(1_i64 << 53), ArgValue::Float(-9_007_199_254_740_992.0))]
    #[case::inexact(i64::MAX, ArgValue::Integer(i64::MAX))]
    fn integers_widen_to_exact_floats(#[case] n: i64, #[case] expected: ArgValue) {
        assert_eq!(ArgValue::Integer(n).coerce(ArgKind::Float), expected);
    }

    #[rstest]
    #[case(ArgValue::Integer(5))]
    #[case(ArgValue::Float(1.5))]
    #[case(ArgValue::Boolean(true))]
    fn scalars_do_not_become_strings(#[case] value: ArgValue) {
        assert_eq!(value.clone().coerce(ArgKind::String), value);
    }

    #[test]
    fn displays_nested_values() {
        let value = ArgValue::from(json!({"items": [1, "two", null]}));
        assert_eq!(value.to_string(), "{items: [1, two, null]}");
    }
}
