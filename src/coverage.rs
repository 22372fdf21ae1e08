//! Step coverage accounting.
//!
//! Coverage is the share of registered steps named by at least one record's
//! `should_match`. Names that are not registered never count.

use crate::registry::{StepLocation, StepRegistry};
use indexmap::IndexSet;

/// A registered step no record targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingStep {
    /// Step name.
    pub name: String,
    /// Where the step is defined.
    pub location: StepLocation,
}

/// Coverage snapshot for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    /// Registered steps.
    pub total_steps: usize,
    /// Registered steps targeted by at least one record.
    pub covered_steps: usize,
    /// `covered_steps` as a percentage of `total_steps`.
    pub percentage: f64,
    /// Uncovered steps in registration order.
    pub missing: Vec<MissingStep>,
}

impl CoverageReport {
    /// Derive the report from the registry and the targeted step names.
    #[must_use]
    pub fn compute(registry: &StepRegistry, covered: &IndexSet<String>) -> Self {
        let covered_steps = registry.iter().filter(|s| covered.contains(s.name())).count();
        Self {
            total_steps: registry.len(),
            covered_steps,
            percentage: percentage(registry.len(), covered_steps),
            missing: missing_steps(registry, covered),
        }
    }

    /// Return `true` when the coverage reaches `minimum` (inclusive).
    #[must_use]
    pub fn meets(&self, minimum: f64) -> bool {
        self.percentage >= minimum
    }
}

/// Coverage percentage of `covered` out of `total` steps.
///
/// An empty registry has no coverage.
///
/// ```
/// assert_eq!(stepcheck::coverage::percentage(10, 5), 50.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "coverage is reported as a fractional percentage"
)]
pub fn percentage(total: usize, covered: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * count_as_f64(covered) / count_as_f64(total)
}

fn count_as_f64(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}

/// Registered steps absent from `covered`, in registration order.
#[must_use]
pub fn missing_steps(registry: &StepRegistry, covered: &IndexSet<String>) -> Vec<MissingStep> {
    registry
        .iter()
        .filter(|step| !covered.contains(step.name()))
        .map(|step| MissingStep {
            name: step.name().to_owned(),
            location: step.location().clone(),
        })
        .collect()
}
