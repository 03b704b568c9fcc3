//! Statistical primitives for conversion experiments.
//!
//! Provides the pooled two-proportion z-test, the standard normal CDF it
//! relies on, and Wilson score intervals for describing a single proportion.

use serde::{Deserialize, Serialize};

/// Outcome of a two-proportion z-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZTest {
    /// Test statistic, positive when the second proportion is larger.
    pub z_statistic: f64,
    /// Two-sided p-value in [0, 1].
    pub p_value: f64,
}

impl ZTest {
    /// The result reported when the data carry no evidence of a difference.
    #[must_use]
    pub fn no_difference() -> Self {
        Self {
            z_statistic: 0.0,
            p_value: 1.0,
        }
    }
}

/// Runs a pooled two-sided z-test comparing two binomial proportions.
///
/// # Formula
/// ```text
/// p_pool = (s_a + s_b) / (n_a + n_b)
/// se     = sqrt(p_pool * (1 - p_pool) * (1/n_a + 1/n_b))
/// z      = (s_b/n_b - s_a/n_a) / se
/// p      = 2 * (1 - Phi(|z|))
/// ```
///
/// A zero standard error (both groups all-success or all-failure) is not
/// an error: it yields `z = 0, p = 1`. Callers must reject `n == 0` before
/// calling; with an empty group this returns the no-difference result.
///
/// # Arguments
/// * `successes_a`, `trials_a` - Baseline group (control)
/// * `successes_b`, `trials_b` - Comparison group (treatment)
///
/// # Examples
/// ```
/// use abtest_core::validation::two_proportion_z_test;
///
/// let test = two_proportion_z_test(50, 100, 50, 100);
/// assert_eq!(test.z_statistic, 0.0);
/// assert_eq!(test.p_value, 1.0);
/// ```
#[must_use]
pub fn two_proportion_z_test(
    successes_a: u64,
    trials_a: u64,
    successes_b: u64,
    trials_b: u64,
) -> ZTest {
    if trials_a == 0 || trials_b == 0 {
        return ZTest::no_difference();
    }

    let n_a = trials_a as f64;
    let n_b = trials_b as f64;
    let p_a = successes_a as f64 / n_a;
    let p_b = successes_b as f64 / n_b;

    let pooled = (successes_a + successes_b) as f64 / (n_a + n_b);
    let variance = pooled * (1.0 - pooled) * (1.0 / n_a + 1.0 / n_b);
    let standard_error = variance.sqrt();

    if !standard_error.is_finite() || standard_error <= 0.0 {
        return ZTest::no_difference();
    }

    let z_statistic = (p_b - p_a) / standard_error;
    ZTest {
        z_statistic,
        p_value: two_sided_p_value(z_statistic),
    }
}

/// Two-sided p-value for a standard normal test statistic.
#[must_use]
pub fn two_sided_p_value(z: f64) -> f64 {
    if z == 0.0 {
        return 1.0;
    }
    (2.0 * (1.0 - standard_normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

/// Calculates the Wilson score confidence interval for a proportion.
///
/// # Formula
/// ```text
/// CI = (p + z^2/(2n) +/- z * sqrt(p(1-p)/n + z^2/(4n^2))) / (1 + z^2/n)
/// ```
///
/// # Returns
/// Tuple of (lower_bound, upper_bound), `(0, 0)` for an empty sample
///
/// # Examples
/// ```
/// use abtest_core::validation::wilson_ci;
///
/// let (lower, upper) = wilson_ci(50, 100, 1.96);
/// assert!(lower > 0.39 && lower < 0.41);
/// assert!(upper > 0.59 && upper < 0.61);
/// ```
#[must_use]
pub fn wilson_ci(successes: u64, n: u64, z: f64) -> (f64, f64) {
    if n == 0 {
        return (0.0, 0.0);
    }

    let n_f = n as f64;
    let p = successes as f64 / n_f;
    let z_sq = z * z;

    let denominator = 1.0 + z_sq / n_f;
    let center = p + z_sq / (2.0 * n_f);

    let variance_term = p * (1.0 - p) / n_f;
    let correction_term = z_sq / (4.0 * n_f * n_f);
    let spread = z * (variance_term + correction_term).sqrt();

    let lower = (center - spread) / denominator;
    let upper = (center + spread) / denominator;

    (lower.max(0.0), upper.min(1.0))
}

/// Standard normal CDF using the Abramowitz and Stegun formula 26.2.17.
/// Accurate to about 7.5 * 10^-8.
#[must_use]
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x < 0.0 {
        return 1.0 - standard_normal_cdf(-x);
    }

    let b1 = 0.319_381_530;
    let b2 = -0.356_563_782;
    let b3 = 1.781_477_937;
    let b4 = -1.821_255_978;
    let b5 = 1.330_274_429;
    let p = 0.231_641_9;

    let t = 1.0 / (1.0 + p * x);
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;

    let pdf = (-x * x / 2.0).exp() / (2.0 * std::f64::consts::PI).sqrt();
    1.0 - pdf * (b1 * t + b2 * t2 + b3 * t3 + b4 * t4 + b5 * t5)
}
