//! Step pattern compilation.
//!
//! Placeholder patterns are literal text with embedded captures:
//!
//! | Form            | Capture                                   |
//! |-----------------|-------------------------------------------|
//! | `{name}`        | named, kind from the parameter's type     |
//! | `{name:type}`   | named, kind from `type`                   |
//! | `{}`            | positional, kind from the parameter's type |
//! | `{:type}`       | positional, kind from `type`              |
//! | `{{` / `}}`     | literal brace                             |
//!
//! Regex patterns are used as written; named groups become named captures
//! and unnamed groups positional ones. Both forms must match the whole
//! sentence.

use crate::registry::{PatternSyntax, StepParam, StepPattern};
use crate::value::{ArgKind, ArgValue};
use indexmap::IndexMap;
use regex::Regex;
use thiserror::Error;

/// Errors raised while compiling a step pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The generated or supplied regular expression is invalid.
    #[error("invalid regular expression: {0}")]
    Regex(#[from] regex::Error),
    /// A placeholder was opened but never closed.
    #[error("unterminated placeholder in '{0}'")]
    Unterminated(String),
}

/// Where a captured value goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTarget {
    /// Bound by name.
    Named(String),
    /// Bound to the n-th argument parameter.
    Positional(usize),
}

#[derive(Debug, Clone)]
struct Capture {
    group: usize,
    target: CaptureTarget,
    kind: ArgKind,
}

/// Values extracted from a successful match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Captured {
    /// Values bound by position, in order.
    pub positional: Vec<ArgValue>,
    /// Values bound by name, in pattern order.
    pub named: IndexMap<String, ArgValue>,
}

/// A step pattern ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: StepPattern,
    regex: Regex,
    captures: Vec<Capture>,
}

impl CompiledPattern {
    /// Compile `pattern`, resolving capture kinds against `params`.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] when the pattern is malformed.
    pub fn compile(pattern: &StepPattern, params: &[StepParam]) -> Result<Self, PatternError> {
        let (expr, hints) = match pattern.syntax {
            PatternSyntax::Placeholder => translate_placeholders(&pattern.text)?,
            PatternSyntax::Regex => (pattern.text.clone(), Vec::new()),
        };
        let regex = Regex::new(&format!("^(?:{expr})$"))?;
        let mut positional = 0_usize;
        let mut captures = Vec::new();
        for (group, name) in regex.capture_names().enumerate().skip(1) {
            let hint = hints.get(group - 1).copied().flatten();
            let target = if let Some(n) = name {
                CaptureTarget::Named(n.to_owned())
            } else {
                positional += 1;
                CaptureTarget::Positional(positional - 1)
            };
            let declared = match &target {
                CaptureTarget::Named(n) => params.iter().skip(1).find(|p| &p.name == n),
                CaptureTarget::Positional(i) => params.iter().skip(1).nth(*i),
            }
            .and_then(|p| p.ty.as_deref())
            .and_then(rust_type_kind);
            let kind = hint.map(|h| h.kind).or(declared).unwrap_or(ArgKind::String);
            captures.push(Capture {
                group,
                target,
                kind,
            });
        }
        Ok(Self {
            source: pattern.clone(),
            regex,
            captures,
        })
    }

    /// The pattern text as written.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.source.text
    }

    /// How the pattern text is interpreted.
    #[must_use]
    pub const fn syntax(&self) -> PatternSyntax {
        self.source.syntax
    }

    /// Capture targets with their resolved kinds, in group order.
    pub fn targets(&self) -> impl Iterator<Item = (&CaptureTarget, ArgKind)> {
        self.captures.iter().map(|c| (&c.target, c.kind))
    }

    /// Match the whole of `sentence`, returning the typed captures.
    ///
    /// A capture whose text does not parse as its kind is kept as a string;
    /// an optional group that did not participate yields `null`.
    #[must_use]
    pub fn captures(&self, sentence: &str) -> Option<Captured> {
        let caps = self.regex.captures(sentence)?;
        let mut out = Captured::default();
        for capture in &self.captures {
            let value = caps.get(capture.group).map_or(ArgValue::Null, |m| {
                ArgValue::parse_as(m.as_str(), capture.kind)
                    .unwrap_or_else(|| ArgValue::from(m.as_str()))
            });
            match &capture.target {
                CaptureTarget::Named(name) => {
                    out.named.insert(name.clone(), value);
                }
                CaptureTarget::Positional(_) => out.positional.push(value),
            }
        }
        Some(out)
    }
}

#[derive(Debug, Clone, Copy)]
struct Hint {
    kind: ArgKind,
    word: bool,
}

/// Map a declared Rust parameter type to the kind its captures parse as.
pub(crate) fn rust_type_kind(ty: &str) -> Option<ArgKind> {
    let unreferenced = ty.trim().trim_start_matches('&').trim_start();
    let without_lifetime = if unreferenced.starts_with('\'') {
        unreferenced
            .split_once(char::is_whitespace)
            .map_or(unreferenced, |(_, rest)| rest)
    } else {
        unreferenced
    };
    let bare = without_lifetime.trim_start_matches("mut ").trim();
    let last = bare.rsplit("::").next().unwrap_or(bare);
    match last {
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
        | "u128" | "usize" => Some(ArgKind::Integer),
        "f32" | "f64" => Some(ArgKind::Float),
        "bool" => Some(ArgKind::Boolean),
        "String" | "str" => Some(ArgKind::String),
        _ => None,
    }
}

fn placeholder_hint(ty: &str) -> Option<Hint> {
    match ty.trim() {
        "" => None,
        "d" => Some(Hint {
            kind: ArgKind::Integer,
            word: false,
        }),
        "f" => Some(Hint {
            kind: ArgKind::Float,
            word: false,
        }),
        "w" => Some(Hint {
            kind: ArgKind::String,
            word: true,
        }),
        other => rust_type_kind(other).map(|kind| Hint { kind, word: false }),
    }
}

fn fragment(hint: Option<Hint>) -> &'static str {
    match hint {
        Some(Hint { word: true, .. }) => r"\w+",
        Some(Hint {
            kind: ArgKind::Integer,
            ..
        }) => r"[+-]?\d+",
        Some(Hint {
            kind: ArgKind::Float,
            ..
        }) => r"[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?",
        Some(Hint {
            kind: ArgKind::Boolean,
            ..
        }) => "true|false",
        _ => ".+?",
    }
}

/// Translate a placeholder pattern into a regular expression.
///
/// Returns the expression and the type hint of each capture group, in group
/// order.
fn translate_placeholders(text: &str) -> Result<(String, Vec<Option<Hint>>), PatternError> {
    let mut expr = String::new();
    let mut hints = Vec::new();
    let mut literal = String::new();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.next_if_eq(&'{').is_some() => literal.push('{'),
            '}' if chars.next_if_eq(&'}').is_some() => literal.push('}'),
            '{' => {
                let mut body = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => body.push(c),
                        None => return Err(PatternError::Unterminated(text.to_owned())),
                    }
                }
                expr.push_str(&regex::escape(&literal));
                literal.clear();
                let (name, ty) = body.split_once(':').unwrap_or((body.as_str(), ""));
                let hint = placeholder_hint(ty);
                let name_part = name.trim();
                if name_part.is_empty() {
                    expr.push_str(&format!("({})", fragment(hint)));
                } else {
                    expr.push_str(&format!("(?P<{name_part}>{})", fragment(hint)));
                }
                hints.push(hint);
            }
            other => literal.push(other),
        }
    }
    expr.push_str(&regex::escape(&literal));
    Ok((expr, hints))
}
