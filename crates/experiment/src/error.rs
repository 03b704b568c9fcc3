//! Error type shared by every analysis stage.

use thiserror::Error;

/// Errors raised while validating, cleaning, or analyzing experiment data.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Required columns are absent; the pipeline must not continue.
    #[error("Missing required columns: {missing:?}")]
    Schema { missing: Vec<String> },

    /// A group needed for the comparison has no rows after cleaning.
    #[error("Group '{group}' has no rows; conversion rate is undefined")]
    EmptyGroup { group: String },

    /// A cell could not be coerced to its column's type.
    #[error("Invalid value {value:?} in column '{column}' at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    /// Analysis parameters are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// CSV read or write failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error reading or writing a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
