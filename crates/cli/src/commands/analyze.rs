//! Analyze CLI command.
//!
//! Loads an experiment CSV, runs the analysis pipeline, and prints the
//! report as text or JSON.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;

use abtest_core::AnalysisConfig;
use abtest_experiment::{
    rng_from_seed, AnalysisReport, ExperimentAnalyzer, RawTable, ReportFormatter,
};

/// Arguments for the analyze command.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Experiment CSV with user_id, group, landing_page, converted
    #[arg(short, long)]
    pub data: PathBuf,

    /// Significance level (overrides config)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Also simulate the treatment group at the target conversion rate
    #[arg(long)]
    pub simulate: bool,

    /// Treatment conversion rate for the simulation (overrides config)
    #[arg(long)]
    pub target_rate: Option<f64>,

    /// Seed for the simulation's random flips (overrides config)
    #[arg(long, env = "ABTEST_SEED")]
    pub seed: Option<u64>,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Output format for analysis reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parses an output format from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!(
                "Unknown format: '{}'. Valid formats: text, json",
                s
            )),
        }
    }
}

/// Applies command-line overrides on top of the loaded configuration.
fn merge_overrides(mut config: AnalysisConfig, args: &AnalyzeArgs) -> AnalysisConfig {
    if let Some(alpha) = args.alpha {
        config.alpha = alpha;
    }
    if let Some(rate) = args.target_rate {
        config.simulation_target_rate = rate;
    }
    if args.seed.is_some() {
        config.random_seed = args.seed;
    }
    config
}

/// Runs the pipeline and returns the report.
///
/// # Errors
/// Returns an error if the file cannot be read or any analysis stage fails.
pub fn analyze_file(args: &AnalyzeArgs, config: AnalysisConfig) -> Result<AnalysisReport> {
    let config = merge_overrides(config, args);
    let seed = config.random_seed;
    let analyzer = ExperimentAnalyzer::new(config)?;

    let table = RawTable::from_path(&args.data)
        .with_context(|| format!("Failed to read {}", args.data.display()))?;
    tracing::info!(
        "Loaded {} rows with columns {:?}",
        table.len(),
        table.columns()
    );

    let report = if args.simulate {
        match seed {
            Some(seed) => tracing::info!("Simulating with seed {}", seed),
            None => tracing::info!("Simulating with an entropy seed"),
        }
        let mut rng = rng_from_seed(seed);
        analyzer.analyze_with_simulation(&table, &mut rng)?
    } else {
        analyzer.analyze(&table)?
    };

    Ok(report)
}

/// Runs the analyze command.
///
/// # Errors
/// Returns an error if parsing, analysis, or writing the report fails.
pub fn run_analyze(args: AnalyzeArgs, config: AnalysisConfig) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let report = analyze_file(&args, config)?;

    let rendered = match format {
        OutputFormat::Text => ReportFormatter::format(&report),
        OutputFormat::Json => report.to_json()?,
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
