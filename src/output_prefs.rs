//! Output preference resolution for pass/fail markers.
//!
//! This module determines whether stepcheck should print emoji glyphs next to
//! each verified sentence. Preferences are auto-detected from the `NO_COLOR`
//! and `STEPCHECK_NO_EMOJI` environment variables, or forced via explicit
//! configuration.

use std::env;

/// Resolved output formatting preferences.
///
/// # Examples
///
/// ```
/// use stepcheck::output_prefs::{OutputPrefs, resolve_with};
///
/// let prefs = resolve_with(None, |_| None);
/// assert!(prefs.emoji_allowed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPrefs {
    /// Whether emoji glyphs are permitted in output.
    emoji: bool,
}

impl OutputPrefs {
    /// Preferences with emoji explicitly allowed or suppressed.
    #[must_use]
    pub const fn with_emoji(emoji: bool) -> Self {
        Self { emoji }
    }

    /// Return `true` when emoji glyphs are permitted.
    #[must_use]
    pub const fn emoji_allowed(self) -> bool {
        self.emoji
    }

    /// Marker printed after a sentence that verified.
    ///
    /// Returns `"✔"` when emoji is allowed, `"PASS"` otherwise.
    #[must_use]
    pub const fn pass_marker(self) -> &'static str {
        if self.emoji { "✔" } else { "PASS" }
    }

    /// Marker printed after a sentence that failed.
    ///
    /// Returns `"✘"` when emoji is allowed, `"FAIL"` otherwise.
    #[must_use]
    pub const fn fail_marker(self) -> &'static str {
        if self.emoji { "✘" } else { "FAIL" }
    }
}

/// Resolve output preferences from explicit configuration and environment.
///
/// Precedence:
/// 1. Explicit `Some(true)` forces emoji off unconditionally.
/// 2. `NO_COLOR` environment variable (any value, including empty):
///    emoji off.
/// 3. `STEPCHECK_NO_EMOJI` environment variable (any value, including
///    empty): emoji off.
/// 4. Default: emoji allowed.
///
/// `Some(false)` is treated the same as `None`; only `Some(true)` acts as a
/// hard override.
///
/// # Examples
///
/// ```
/// use stepcheck::output_prefs::resolve;
///
/// assert!(!resolve(Some(true)).emoji_allowed());
/// ```
#[must_use]
pub fn resolve(no_emoji: Option<bool>) -> OutputPrefs {
    resolve_with(no_emoji, |key| env::var(key).ok())
}

/// Testable variant that accepts an environment lookup function.
///
/// The `read_env` closure receives an environment variable name and returns
/// `Some(value)` when the variable is set.
#[must_use]
pub fn resolve_with<F>(no_emoji: Option<bool>, read_env: F) -> OutputPrefs
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(true) = no_emoji {
        return OutputPrefs { emoji: false };
    }

    if read_env("NO_COLOR").is_some() || read_env("STEPCHECK_NO_EMOJI").is_some() {
        return OutputPrefs { emoji: false };
    }

    OutputPrefs { emoji: true }
}
