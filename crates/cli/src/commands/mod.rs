//! CLI commands for experiment analysis.

pub mod analyze;
pub mod template;

pub use analyze::{run_analyze, AnalyzeArgs};
pub use template::{run_template, TemplateArgs};
