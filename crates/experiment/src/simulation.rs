//! What-if simulation of a higher treatment conversion rate.
//!
//! The simulator copies the dataset and flips randomly chosen unconverted
//! treatment rows to converted until the treatment group reaches
//! `floor(target_rate * treatment_rows)` conversions. It never lowers a
//! conversion count and never adds or removes rows. The random source is
//! passed in, so a seeded [`ChaCha8Rng`] gives reproducible flips.
//!
//! The follow-up test on the modified data is descriptive: it shows what the
//! z-test would report if treatment converted at the target rate.

use std::collections::BTreeMap;

use abtest_core::DEFAULT_SIMULATION_TARGET_RATE;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{summarize, GroupStats};
use crate::error::{AnalysisError, Result};
use crate::hypothesis::{percent, HypothesisTester, TestResult};
use crate::record::{Dataset, TREATMENT};

/// Creates the simulation's random source: seeded when `seed` is given,
/// otherwise from OS entropy.
#[must_use]
pub fn rng_from_seed(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// A modified copy of the dataset plus what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedDataset {
    pub dataset: Dataset,
    /// Treatment rows in the dataset.
    pub treatment_rows: usize,
    /// Treatment conversions before flipping.
    pub previous_successes: usize,
    /// `floor(target_rate * treatment_rows)`.
    pub target_successes: usize,
    /// Positions (in dataset order) of the rows flipped to converted, ascending.
    pub flipped_rows: Vec<usize>,
}

/// Raises the treatment group's conversions toward `target_rate` on a copy
/// of `dataset`.
///
/// # Errors
///
/// Returns `InvalidConfig` if `target_rate` is outside [0, 1].
pub fn simulate<R: Rng + ?Sized>(
    dataset: &Dataset,
    target_rate: f64,
    rng: &mut R,
) -> Result<SimulatedDataset> {
    if !(0.0..=1.0).contains(&target_rate) {
        return Err(AnalysisError::InvalidConfig(format!(
            "simulation target rate must be in [0, 1], got {target_rate}"
        )));
    }

    let treatment: Vec<usize> = dataset
        .iter()
        .enumerate()
        .filter(|(_, r)| r.group == TREATMENT)
        .map(|(i, _)| i)
        .collect();
    let unconverted: Vec<usize> = treatment
        .iter()
        .copied()
        .filter(|&i| !dataset.records()[i].converted)
        .collect();

    let treatment_rows = treatment.len();
    let previous_successes = treatment_rows - unconverted.len();
    let target_successes = (target_rate * treatment_rows as f64).floor() as usize;
    let to_flip = target_successes.saturating_sub(previous_successes);

    let mut simulated = dataset.clone();
    let mut flipped_rows = Vec::new();
    if to_flip > 0 {
        let amount = to_flip.min(unconverted.len());
        flipped_rows = index::sample(rng, unconverted.len(), amount)
            .into_iter()
            .map(|pos| unconverted[pos])
            .collect();
        flipped_rows.sort_unstable();

        let records = simulated.records_mut();
        for &row in &flipped_rows {
            records[row].converted = true;
        }
    }

    debug!(
        treatment_rows,
        previous_successes,
        target_successes,
        flipped = flipped_rows.len(),
        "simulated treatment conversions"
    );

    Ok(SimulatedDataset {
        dataset: simulated,
        treatment_rows,
        previous_successes,
        target_successes,
        flipped_rows,
    })
}

/// Summary of a simulation run and its re-test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub target_rate: f64,
    pub treatment_rows: usize,
    pub previous_successes: usize,
    pub target_successes: usize,
    pub rows_flipped: usize,
    /// Stats for every group in the modified dataset.
    pub group_stats: BTreeMap<String, GroupStats>,
    pub test: TestResult,
}

impl SimulationReport {
    /// The dashboard conclusion for the simulated test.
    #[must_use]
    pub fn verdict(&self) -> String {
        let rate = percent(self.target_rate);
        if self.test.significant {
            format!(
                "After applying {rate} percent conversion, the difference becomes statistically significant."
            )
        } else {
            format!("Even after forcing {rate} percent conversion, significance is not reached.")
        }
    }
}

/// Output of [`Simulator::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    pub simulated: SimulatedDataset,
    pub report: SimulationReport,
}

/// Simulates the target rate and re-runs aggregation and the z-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simulator {
    target_rate: f64,
    tester: HypothesisTester,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATION_TARGET_RATE, HypothesisTester::default())
    }
}

impl Simulator {
    #[must_use]
    pub fn new(target_rate: f64, tester: HypothesisTester) -> Self {
        Self {
            target_rate,
            tester,
        }
    }

    #[must_use]
    pub fn target_rate(&self) -> f64 {
        self.target_rate
    }

    /// Simulates on a copy of `dataset`, then aggregates and tests the copy.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an out-of-range target rate, or
    /// `EmptyGroup` if control or treatment has no rows.
    pub fn run<R: Rng + ?Sized>(&self, dataset: &Dataset, rng: &mut R) -> Result<SimulationRun> {
        let simulated = simulate(dataset, self.target_rate, rng)?;
        let group_stats = summarize(&simulated.dataset);
        let test = self.tester.compare(&group_stats)?;

        info!(
            target_rate = self.target_rate,
            rows_flipped = simulated.flipped_rows.len(),
            z = test.z_statistic,
            p = test.p_value,
            "simulation re-test complete"
        );

        let report = SimulationReport {
            target_rate: self.target_rate,
            treatment_rows: simulated.treatment_rows,
            previous_successes: simulated.previous_successes,
            target_successes: simulated.target_successes,
            rows_flipped: simulated.flipped_rows.len(),
            group_stats,
            test,
        };
        Ok(SimulationRun { simulated, report })
    }
}
