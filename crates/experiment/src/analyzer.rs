//! End-to-end experiment analysis.
//!
//! Stages run strictly in order: schema validation, value coercion,
//! duplicate-user removal, aggregation, the control/treatment z-test, and
//! optionally the what-if simulation. Any error halts the run; no partial
//! report is produced.

use std::collections::BTreeMap;

use abtest_core::AnalysisConfig;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::{summarize, GroupStats};
use crate::cleaning::{remove_duplicate_users, CleanedDataset, CleaningSummary};
use crate::error::{AnalysisError, Result};
use crate::hypothesis::{HypothesisTester, TestResult};
use crate::record::{Dataset, Record};
use crate::schema::SchemaValidator;
use crate::simulation::{SimulationReport, Simulator};
use crate::table::RawTable;

/// Rows shown in the raw data preview.
pub const PREVIEW_ROWS: usize = 5;

/// Everything an analysis run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    /// Significance level the test was classified against.
    pub alpha: f64,
    /// First rows of the uploaded data.
    pub preview: Vec<Record>,
    /// `(rows, columns)` as uploaded.
    pub raw_shape: (usize, usize),
    /// `(rows, columns)` after duplicate removal.
    pub cleaned_shape: (usize, usize),
    pub cleaning: CleaningSummary,
    /// Descriptive stats for every group label present after cleaning.
    pub group_stats: BTreeMap<String, GroupStats>,
    pub test: TestResult,
    pub simulation: Option<SimulationReport>,
}

impl AnalysisReport {
    #[must_use]
    pub fn verdict(&self) -> String {
        self.test.verdict(self.alpha)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Runs the analysis pipeline for one configuration.
#[derive(Debug, Clone)]
pub struct ExperimentAnalyzer {
    config: AnalysisConfig,
    validator: SchemaValidator,
    tester: HypothesisTester,
}

impl ExperimentAnalyzer {
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            validator: SchemaValidator::new(config.required_columns.clone()),
            tester: HypothesisTester::new(config.alpha),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Validates, coerces, and cleans a table.
    ///
    /// # Errors
    ///
    /// Returns `Schema` or `InvalidValue` for malformed input.
    pub fn prepare(&self, table: &RawTable) -> Result<CleanedDataset> {
        let dataset = Dataset::from_table(table, &self.validator)?;
        Ok(remove_duplicate_users(&dataset))
    }

    /// Runs every stage except the simulation.
    ///
    /// # Errors
    ///
    /// Returns `Schema`, `InvalidValue`, or `EmptyGroup`.
    pub fn analyze(&self, table: &RawTable) -> Result<AnalysisReport> {
        self.run(table, None::<&mut rand_chacha::ChaCha8Rng>)
    }

    /// Runs every stage including the simulation, drawing flips from `rng`.
    ///
    /// # Errors
    ///
    /// Returns `Schema`, `InvalidValue`, or `EmptyGroup`.
    pub fn analyze_with_simulation<R: Rng + ?Sized>(
        &self,
        table: &RawTable,
        rng: &mut R,
    ) -> Result<AnalysisReport> {
        self.run(table, Some(rng))
    }

    fn run<R: Rng + ?Sized>(
        &self,
        table: &RawTable,
        rng: Option<&mut R>,
    ) -> Result<AnalysisReport> {
        let raw_shape = table.shape();
        info!(rows = raw_shape.0, columns = raw_shape.1, "analyzing experiment");

        let dataset = Dataset::from_table(table, &self.validator)?;
        let preview = dataset.iter().take(PREVIEW_ROWS).cloned().collect();

        let cleaned = remove_duplicate_users(&dataset);
        let cleaned_shape = (cleaned.dataset.len(), raw_shape.1);

        let group_stats = summarize(&cleaned.dataset);
        let test = self.tester.compare(&group_stats)?;

        let simulation = match rng {
            Some(rng) => {
                let simulator = Simulator::new(self.config.simulation_target_rate, self.tester);
                Some(simulator.run(&cleaned.dataset, rng)?.report)
            }
            None => None,
        };

        Ok(AnalysisReport {
            generated_at: Utc::now(),
            alpha: self.config.alpha,
            preview,
            raw_shape,
            cleaned_shape,
            cleaning: cleaned.summary,
            group_stats,
            test,
            simulation,
        })
    }
}
