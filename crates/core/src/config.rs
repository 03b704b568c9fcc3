use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Columns every uploaded experiment file must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = ["user_id", "group", "landing_page", "converted"];

/// Significance level used when none is configured.
pub const DEFAULT_ALPHA: f64 = 0.10;

/// Treatment conversion rate the what-if simulation aims for.
pub const DEFAULT_SIMULATION_TARGET_RATE: f64 = 0.70;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Parameters for a single analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Column names that must be present in the input.
    pub required_columns: Vec<String>,
    /// Significance threshold; `p_value < alpha` is significant.
    pub alpha: f64,
    /// Treatment conversion rate forced by the simulation.
    pub simulation_target_rate: f64,
    /// Seed for the simulation's random source; `None` draws from entropy.
    pub random_seed: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            required_columns: REQUIRED_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
            alpha: DEFAULT_ALPHA,
            simulation_target_rate: DEFAULT_SIMULATION_TARGET_RATE,
            random_seed: None,
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    #[must_use]
    pub fn with_simulation_target_rate(mut self, rate: f64) -> Self {
        self.simulation_target_rate = rate;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Checks that the thresholds are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if `alpha` is outside (0, 1), the target rate is
    /// outside [0, 1], or no required columns are listed.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            bail!("alpha must be in (0, 1), got {}", self.alpha);
        }
        if !(0.0..=1.0).contains(&self.simulation_target_rate) {
            bail!(
                "simulation_target_rate must be in [0, 1], got {}",
                self.simulation_target_rate
            );
        }
        if self.required_columns.is_empty() {
            bail!("required_columns must not be empty");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
