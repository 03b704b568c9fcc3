//! Control-versus-treatment significance testing.
//!
//! Wraps the pooled two-proportion z-test with the experiment's significance
//! level and group lookup.

use std::collections::BTreeMap;

use abtest_core::{two_proportion_z_test, DEFAULT_ALPHA};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::GroupStats;
use crate::error::{AnalysisError, Result};
use crate::record::{CONTROL, TREATMENT};

/// Result of comparing treatment against control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Positive when treatment converts better than control.
    pub z_statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// `p_value < alpha`.
    pub significant: bool,
}

impl TestResult {
    /// The dashboard conclusion for an observed result at level `alpha`.
    #[must_use]
    pub fn verdict(&self, alpha: f64) -> String {
        if self.significant {
            format!(
                "Statistically significant difference at the {} percent level. The groups behave differently.",
                percent(alpha)
            )
        } else {
            "No statistically significant difference. You cannot conclude the new page is better."
                .to_string()
        }
    }
}

/// Formats a fraction as a whole-number percentage where possible (0.10 -> "10").
pub(crate) fn percent(fraction: f64) -> String {
    let value = fraction * 100.0;
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round())
    } else {
        format!("{value:.1}")
    }
}

/// Runs the two-sided z-test and classifies it against `alpha`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypothesisTester {
    alpha: f64,
}

impl Default for HypothesisTester {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl HypothesisTester {
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Tests `(successes, trials)` pairs for control and treatment.
    ///
    /// # Errors
    ///
    /// Returns `EmptyGroup` if either group has zero trials.
    pub fn test_counts(&self, control: (u64, u64), treatment: (u64, u64)) -> Result<TestResult> {
        let (control_successes, control_trials) = control;
        let (treatment_successes, treatment_trials) = treatment;

        if control_trials == 0 {
            return Err(AnalysisError::EmptyGroup {
                group: CONTROL.to_string(),
            });
        }
        if treatment_trials == 0 {
            return Err(AnalysisError::EmptyGroup {
                group: TREATMENT.to_string(),
            });
        }

        let z = two_proportion_z_test(
            control_successes,
            control_trials,
            treatment_successes,
            treatment_trials,
        );
        Ok(TestResult {
            z_statistic: z.z_statistic,
            p_value: z.p_value,
            significant: z.p_value < self.alpha,
        })
    }

    /// Tests two groups' aggregated stats.
    ///
    /// # Errors
    ///
    /// Returns `EmptyGroup` if either group has zero trials.
    pub fn test(&self, control: &GroupStats, treatment: &GroupStats) -> Result<TestResult> {
        self.test_counts(
            (control.successes, control.count),
            (treatment.successes, treatment.count),
        )
    }

    /// Looks up `control` and `treatment` by label and tests them. Other
    /// labels in the map are ignored.
    ///
    /// # Errors
    ///
    /// Returns `EmptyGroup` if either label is absent.
    pub fn compare(&self, stats: &BTreeMap<String, GroupStats>) -> Result<TestResult> {
        let lookup = |group: &str| {
            stats.get(group).ok_or_else(|| AnalysisError::EmptyGroup {
                group: group.to_string(),
            })
        };
        let control = lookup(CONTROL)?;
        let treatment = lookup(TREATMENT)?;

        let result = self.test(control, treatment)?;
        info!(
            z = result.z_statistic,
            p = result.p_value,
            significant = result.significant,
            alpha = self.alpha,
            "two-proportion z-test"
        );
        Ok(result)
    }
}
