//! Shared configuration and statistics for conversion experiment analysis.

pub mod config;
pub mod config_loader;
pub mod validation;

pub use config::{
    AnalysisConfig, AppConfig, LoggingConfig, DEFAULT_ALPHA, DEFAULT_SIMULATION_TARGET_RATE,
    REQUIRED_COLUMNS,
};
pub use config_loader::ConfigLoader;
pub use validation::{
    standard_normal_cdf, two_proportion_z_test, two_sided_p_value, wilson_ci, ZTest,
};
