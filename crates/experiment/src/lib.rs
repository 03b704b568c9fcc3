//! Conversion experiment analysis.
//!
//! Takes an uploaded table of per-user conversion records, checks its schema,
//! drops users that appear more than once, aggregates conversions per group,
//! and runs a pooled two-proportion z-test of treatment against control. A
//! seedable what-if simulation shows how the test would change if treatment
//! converted at a chosen target rate.
//!
//! # Example
//!
//! ```
//! use abtest_core::AnalysisConfig;
//! use abtest_experiment::{ExperimentAnalyzer, RawTable};
//!
//! let csv = "user_id,group,landing_page,converted\n\
//!            1,control,old_page,0\n\
//!            2,control,old_page,1\n\
//!            3,treatment,new_page,1\n\
//!            4,treatment,new_page,1\n";
//! let table = RawTable::from_reader(csv.as_bytes()).unwrap();
//! let analyzer = ExperimentAnalyzer::new(AnalysisConfig::default()).unwrap();
//! let report = analyzer.analyze(&table).unwrap();
//!
//! assert_eq!(report.group_stats["treatment"].successes, 2);
//! assert!(report.test.z_statistic > 0.0);
//! ```

pub mod aggregate;
pub mod analyzer;
pub mod cleaning;
pub mod error;
pub mod hypothesis;
pub mod record;
pub mod report;
pub mod schema;
pub mod simulation;
pub mod table;

pub use aggregate::{group_stats, summarize, GroupStats};
pub use analyzer::{AnalysisReport, ExperimentAnalyzer, PREVIEW_ROWS};
pub use cleaning::{remove_duplicate_users, CleanedDataset, CleaningSummary};
pub use error::{AnalysisError, Result};
pub use hypothesis::{HypothesisTester, TestResult};
pub use record::{parse_converted, Dataset, Record, CONTROL, TREATMENT};
pub use report::ReportFormatter;
pub use schema::SchemaValidator;
pub use simulation::{
    rng_from_seed, simulate, SimulatedDataset, SimulationReport, SimulationRun, Simulator,
};
pub use table::RawTable;
