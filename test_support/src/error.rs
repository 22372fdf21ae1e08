//! Error formatting helpers for stable, deterministic test assertions.

use std::error::Error;

/// Messages of an error and its sources, outermost first.
pub fn error_messages(e: &(dyn Error + 'static)) -> Vec<String> {
    let mut current: Option<&(dyn Error + 'static)> = Some(e);
    std::iter::from_fn(|| {
        let err = current?;
        current = err.source();
        Some(err.to_string())
    })
    .collect()
}

/// Join an error and its sources with `": "`.
///
/// Stepcheck wraps record errors in runner errors; flattening the chain lets
/// tests assert on the innermost cause without matching variants.
///
/// ```ignore
/// let err = std::io::Error::other("oops");
/// assert_eq!(display_error_chain(&err), "oops");
/// ```
pub fn display_error_chain(e: &(dyn Error + 'static)) -> String {
    error_messages(e).join(": ")
}
