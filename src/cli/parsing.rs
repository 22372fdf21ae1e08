//! CLI parsing helpers for clap value parsers.

/// Parse a coverage percentage.
///
/// Values above 100 parse successfully; the run rejects them before any
/// verification so they surface with their own diagnostic.
pub(super) fn parse_percentage(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("{s} is not a valid percentage"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("coverage percentage must be a non-negative number, got {s}"));
    }
    Ok(value)
}
