//! Process exit statuses.
//!
//! Each fatal condition and each aggregate outcome of a run maps to its own
//! status code so callers can tell them apart.

use std::fmt;
use std::process::ExitCode;

/// Final status of a stepcheck run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every sentence verified and the coverage minimum, if any, was met.
    Success,
    /// At least one sentence failed to verify.
    FailedMatches,
    /// All sentences verified but coverage fell below the minimum.
    CoverageShortfall,
    /// Options, configuration, step sources or catalogs are unusable.
    InvalidConfiguration,
    /// No step implementations were found.
    NoSteps,
    /// A catalog contains no records.
    EmptyBatch,
    /// A record lacks `sentence` or `should_match`.
    MalformedRecord,
}

impl ExitStatus {
    /// Derive the status of a completed run.
    ///
    /// `coverage_met` is `None` when no minimum was requested. Failed
    /// matches take precedence over a coverage shortfall.
    ///
    /// ```
    /// use stepcheck::exit_status::ExitStatus;
    ///
    /// assert_eq!(ExitStatus::derive(2, Some(false)), ExitStatus::FailedMatches);
    /// assert_eq!(ExitStatus::derive(0, Some(false)), ExitStatus::CoverageShortfall);
    /// ```
    #[must_use]
    pub const fn derive(failed: usize, coverage_met: Option<bool>) -> Self {
        if failed > 0 {
            Self::FailedMatches
        } else if let Some(false) = coverage_met {
            Self::CoverageShortfall
        } else {
            Self::Success
        }
    }

    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::FailedMatches => 1,
            Self::CoverageShortfall => 2,
            Self::InvalidConfiguration => 3,
            Self::NoSteps => 4,
            Self::EmptyBatch => 5,
            Self::MalformedRecord => 6,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::FailedMatches => "failed-matches",
            Self::CoverageShortfall => "coverage-shortfall",
            Self::InvalidConfiguration => "invalid-configuration",
            Self::NoSteps => "no-steps",
            Self::EmptyBatch => "empty-batch",
            Self::MalformedRecord => "malformed-record",
        })
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status.code())
    }
}
