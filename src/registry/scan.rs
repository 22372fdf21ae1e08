//! Discover step implementations in Rust sources.
//!
//! Every function annotated with `#[given(..)]`, `#[when(..)]`, `#[then(..)]`
//! or `#[step(..)]` (optionally path-qualified, e.g.
//! `#[rstest_bdd_macros::given(..)]`) becomes a registered step. The first
//! string literal inside the attribute is the pattern; an attribute argument
//! spelled `regex = ...` marks it as a regular expression. The parameter list
//! of the annotated function provides argument names and declared types.

use super::{RegistryError, StepImpl, StepLoader, StepLocation, StepParam, StepPattern, StepRegistry};
use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use regex::Regex;
use std::fs;
use std::iter::Peekable;
use std::str::CharIndices;
use std::sync::LazyLock;
use tracing::debug;
use walkdir::WalkDir;

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static STEP_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#\[\s*(?:[A-Za-z_][A-Za-z0-9_]*\s*::\s*)*(?:given|when|then|step)\s*\(")
        .expect("step attribute regex")
});

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static FN_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfn\s+([A-Za-z_][A-Za-z0-9_]*)").expect("function item regex")
});

/// Loads steps by scanning `*.rs` files below one or more base directories.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    roots: Vec<Utf8PathBuf>,
}

impl SourceScanner {
    /// Scan the given base directories in order.
    #[must_use]
    pub const fn new(roots: Vec<Utf8PathBuf>) -> Self {
        Self { roots }
    }

    /// Base directories scanned by this loader.
    #[must_use]
    pub fn roots(&self) -> &[Utf8PathBuf] {
        &self.roots
    }

    fn source_files(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, RegistryError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let dir_entry = entry.map_err(|source| RegistryError::Scan {
                root: root.to_path_buf(),
                source,
            })?;
            if !dir_entry.file_type().is_file() {
                continue;
            }
            let path = Utf8PathBuf::from_path_buf(dir_entry.into_path()).map_err(|invalid| {
                RegistryError::NonUtf8Path {
                    path: invalid.display().to_string(),
                }
            })?;
            if path.extension() == Some("rs") {
                files.push(path);
            }
        }
        Ok(files)
    }
}

impl StepLoader for SourceScanner {
    fn load(&self) -> Result<StepRegistry, RegistryError> {
        let mut registry = StepRegistry::default();
        for root in &self.roots {
            for path in Self::source_files(root)? {
                let text = fs::read_to_string(&path).map_err(|source| RegistryError::Read {
                    path: path.clone(),
                    source,
                })?;
                for step in extract_steps(&path, &text)? {
                    debug!(step = step.name(), location = %step.location(), "registered step");
                    registry.insert(step)?;
                }
            }
        }
        Ok(registry)
    }

    fn describe(&self) -> String {
        self.roots.iter().join(", ")
    }
}

/// Extract every annotated step function from one source file.
pub(crate) fn extract_steps(path: &Utf8Path, text: &str) -> Result<Vec<StepImpl>, RegistryError> {
    let mut steps = Vec::new();
    for attr in STEP_ATTR.find_iter(text) {
        if in_line_comment(text, attr.start()) {
            continue;
        }
        let Some(args) = text.get(attr.end()..) else {
            continue;
        };
        let Some((literal, literal_end)) = first_string_literal(args) else {
            continue;
        };
        let is_regex = args
            .get(..literal_end)
            .is_some_and(|head| head.trim_start().starts_with("regex"));
        let Some(close) = args.get(literal_end..).and_then(|tail| tail.find(']')) else {
            continue;
        };
        let item_start = attr.end() + literal_end + close + 1;
        let Some(function) = following_function(text, item_start) else {
            continue;
        };
        let pattern = if is_regex {
            StepPattern::regex(literal)
        } else {
            StepPattern::placeholder(literal)
        };
        let location = StepLocation::new(path, line_of(text, function.offset));
        steps.push(StepImpl::new(function.name, location, function.params, pattern)?);
    }
    Ok(steps)
}

/// Whether `offset` sits after a `//` on its own line.
fn in_line_comment(text: &str, offset: usize) -> bool {
    let Some(head) = text.get(..offset) else {
        return false;
    };
    let line_start = head.rfind('\n').map_or(0, |idx| idx + 1);
    head.get(line_start..).is_some_and(|line| line.contains("//"))
}

struct FunctionItem {
    name: String,
    offset: usize,
    params: Vec<StepParam>,
}

/// Find the function an attribute ending at `from` is attached to.
///
/// Only attributes, comments and qualifiers may sit between the attribute and
/// the `fn` keyword; anything that ends or opens another item disqualifies
/// the match.
fn following_function(text: &str, from: usize) -> Option<FunctionItem> {
    let caps = FN_ITEM.captures_at(text, from)?;
    let whole = caps.get(0)?;
    let gap = text.get(from..whole.start())?;
    if gap.contains([';', '{', '}']) {
        return None;
    }
    let name = caps.get(1)?.as_str().to_owned();
    let after_name = text.get(whole.end()..)?;
    let open = after_name.find('(')?;
    let param_text = balanced_params(after_name.get(open + 1..)?)?;
    Some(FunctionItem {
        name,
        offset: whole.start(),
        params: split_params(param_text),
    })
}

/// Return the text up to the `)` closing an already opened parameter list.
fn balanced_params(text: &str) -> Option<&str> {
    let mut depth = 0_usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' | '[' | '<' => depth += 1,
            ')' if depth == 0 => return text.get(..idx),
            ')' | ']' | '>' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

fn split_params(text: &str) -> Vec<StepParam> {
    let mut params = Vec::new();
    let mut depth = 0_usize;
    let mut current = String::new();
    for ch in text.chars() {
        match ch {
            '(' | '[' | '<' => depth += 1,
            ')' | ']' | '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                params.extend(parse_param(&current));
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    params.extend(parse_param(&current));
    params
}

fn parse_param(raw: &str) -> Option<StepParam> {
    let without_attrs = strip_param_attributes(raw.trim());
    if without_attrs.is_empty() || without_attrs.ends_with("self") {
        return None;
    }
    let (binding, ty) = split_binding(without_attrs);
    let name = binding.trim().trim_start_matches("mut ").trim();
    Some(StepParam::new(name, ty.map(str::trim)))
}

/// Split `name: Type` at the first single colon, ignoring `::` paths.
fn split_binding(param: &str) -> (&str, Option<&str>) {
    let mut chars = param.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch != ':' {
            continue;
        }
        if chars.next_if(|&(_, next)| next == ':').is_some() {
            continue;
        }
        return (
            param.get(..idx).unwrap_or(param),
            param.get(idx + 1..),
        );
    }
    (param, None)
}

fn strip_param_attributes(param: &str) -> &str {
    let mut rest = param;
    while let Some(after_hash) = rest.strip_prefix("#[") {
        let Some(end) = after_hash.find(']') else {
            return rest;
        };
        rest = after_hash.get(end + 1..).unwrap_or_default().trim_start();
    }
    rest
}

fn line_of(text: &str, offset: usize) -> usize {
    text.get(..offset)
        .map_or(0, |head| head.matches('\n').count())
        + 1
}

/// Extract the first Rust string literal (plain or raw) from `text`.
///
/// Returns the unescaped contents and the byte offset just past the closing
/// delimiter.
fn first_string_literal(text: &str) -> Option<(String, usize)> {
    let mut chars = text.char_indices().peekable();
    let mut previous = None;
    while let Some((_, ch)) = chars.next() {
        let starts_word = !previous.is_some_and(|p: char| p.is_alphanumeric() || p == '_');
        match ch {
            '"' => return read_plain(&mut chars),
            'r' if starts_word => {
                let mut hashes = 0_usize;
                while chars.next_if(|&(_, c)| c == '#').is_some() {
                    hashes += 1;
                }
                if chars.next_if(|&(_, c)| c == '"').is_some() {
                    return read_raw(&mut chars, hashes);
                }
            }
            _ => {}
        }
        previous = Some(ch);
    }
    None
}

fn read_raw(chars: &mut Peekable<CharIndices<'_>>, hashes: usize) -> Option<(String, usize)> {
    let mut out = String::new();
    while let Some((idx, ch)) = chars.next() {
        if ch == '"' {
            let mut lookahead = chars.clone();
            if (0..hashes).all(|_| lookahead.next().is_some_and(|(_, c)| c == '#')) {
                return Some((out, idx + 1 + hashes));
            }
        }
        out.push(ch);
    }
    None
}

fn read_plain(chars: &mut Peekable<CharIndices<'_>>) -> Option<(String, usize)> {
    let mut out = String::new();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '"' => return Some((out, idx + 1)),
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    '"' | '\\' | '\'' => out.push(escaped),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
            }
            other => out.push(other),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PatternSyntax;
    use rstest::rstest;

    #[rstest]
    #[case(r#"r"^foo$""#, "^foo$")]
    #[case(r##"r#"a "quoted" word"#"##, r#"a "quoted" word"#)]
    #[case(r#""hello\nworld""#, "hello\nworld")]
    #[case(r#"regex = r"^(\d+)$""#, r"^(\d+)$")]
    fn extracts_literals(#[case] input: &str, #[case] expected: &str) {
        let (literal, _) = first_string_literal(input).expect("literal");
        assert_eq!(literal, expected);
    }

    #[test]
    fn reports_end_offset_past_closing_quote() {
        let (_, end) = first_string_literal(r#"  "ab")]"#).expect("literal");
        assert_eq!(r#"  "ab")]"#.get(end..), Some(")]"));
    }

    #[test]
    fn extracts_annotated_functions() {
        let source = r#"
use rstest_bdd_macros::{given, then};

#[given("I have {count} cukes")]
fn have_cukes(world: &World, count: u32) {}

/// Checks the result.
#[then(regex = r"^the total is (\d+)$")]
#[expect(unused, reason = "demo")]
pub fn total_is(
    world: &World,
    total: i64,
) -> Result<(), String> {
    Ok(())
}
"#;
        let steps = extract_steps(Utf8Path::new("tests/steps.rs"), source).expect("steps");
        let names: Vec<_> = steps.iter().map(StepImpl::name).collect();
        assert_eq!(names, ["have_cukes", "total_is"]);

        let have = steps.first().expect("first step");
        assert_eq!(have.location().to_string(), "tests/steps.rs:5");
        assert_eq!(have.argument_names().collect::<Vec<_>>(), ["count"]);
        assert_eq!(have.pattern().syntax(), PatternSyntax::Placeholder);

        let total = steps.get(1).expect("second step");
        assert_eq!(total.location().line(), 10);
        assert_eq!(total.pattern().syntax(), PatternSyntax::Regex);
        assert_eq!(
            total.params().get(1),
            Some(&StepParam::new("total", Some("i64")))
        );
    }

    #[test]
    fn ignores_attributes_in_comments() {
        let source = r#"
/// Registers a cuke count, e.g.
///
/// ```ignore
/// #[given("I have {count} cukes")]
/// ```
#[given("I have {count} cukes")]
fn have_cukes(world: &World, count: u32) {}

// #[when("I eat a cuke")]
#[then("nothing is left")]
fn nothing_left(world: &World) {}
"#;
        let steps = extract_steps(Utf8Path::new("tests/steps.rs"), source).expect("steps");
        let names: Vec<_> = steps.iter().map(StepImpl::name).collect();
        assert_eq!(names, ["have_cukes", "nothing_left"]);
        assert_eq!(steps.first().map(|s| s.location().line()), Some(8));
    }

    #[test]
    fn skips_attributes_not_attached_to_functions() {
        let source = r#"
#[given("orphan")]
struct NotAStep;

fn helper() {}
"#;
        let steps = extract_steps(Utf8Path::new("s.rs"), source).expect("steps");
        assert!(steps.is_empty());
    }

    #[test]
    fn parses_parameter_attributes_and_paths() {
        let params = split_params("#[from(world)] w: &TestWorld, mut items: Vec<std::string::String>");
        assert_eq!(
            params,
            vec![
                StepParam::new("w", Some("&TestWorld")),
                StepParam::new("items", Some("Vec<std::string::String>")),
            ]
        );
    }

    #[test]
    fn reports_invalid_patterns() {
        let source = "#[when(regex = r\"^(unclosed$\")]\nfn broken(w: &W) {}\n";
        let err = extract_steps(Utf8Path::new("bad.rs"), source).expect_err("invalid regex");
        assert!(matches!(err, RegistryError::InvalidPattern { .. }));
    }
}
