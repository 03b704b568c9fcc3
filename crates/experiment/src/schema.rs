//! Structural validation of uploaded tables.

use abtest_core::REQUIRED_COLUMNS;
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};
use crate::table::RawTable;

/// Checks that a table carries every required column.
///
/// Only column presence is checked. Cell values are interpreted later, when
/// the table is converted into a [`crate::Dataset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidator {
    required: Vec<String>,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(REQUIRED_COLUMNS.iter().map(|c| (*c).to_string()).collect())
    }
}

impl SchemaValidator {
    #[must_use]
    pub fn new(required: Vec<String>) -> Self {
        Self { required }
    }

    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Required columns absent from `columns`, in required order.
    /// An empty list means the table is valid.
    #[must_use]
    pub fn missing_columns(&self, columns: &[String]) -> Vec<String> {
        self.required
            .iter()
            .filter(|required| !columns.contains(required))
            .cloned()
            .collect()
    }

    /// Fails with [`AnalysisError::Schema`] when any required column is missing.
    ///
    /// # Errors
    ///
    /// Returns `Schema` listing the missing columns.
    pub fn validate(&self, table: &RawTable) -> Result<()> {
        let missing = self.missing_columns(table.columns());
        if missing.is_empty() {
            debug!(columns = table.columns().len(), "schema validated");
            Ok(())
        } else {
            warn!(?missing, "table is missing required columns");
            Err(AnalysisError::Schema { missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn complete_schema_has_nothing_missing() {
        let validator = SchemaValidator::default();
        let cols = columns(&["converted", "landing_page", "group", "user_id", "extra"]);
        assert!(validator.missing_columns(&cols).is_empty());
    }

    #[test]
    fn reports_missing_in_required_order() {
        let validator = SchemaValidator::default();
        let cols = columns(&["group", "user_id"]);
        assert_eq!(
            validator.missing_columns(&cols),
            vec!["landing_page", "converted"]
        );
    }

    #[test]
    fn column_names_are_case_sensitive() {
        let validator = SchemaValidator::default();
        let cols = columns(&["User_ID", "group", "landing_page", "converted"]);
        assert_eq!(validator.missing_columns(&cols), vec!["user_id"]);
    }

    #[test]
    fn validate_returns_schema_error() {
        let table = RawTable::new(columns(&["user_id", "group"]), Vec::new());
        let err = SchemaValidator::default().validate(&table).unwrap_err();

        match err {
            AnalysisError::Schema { missing } => {
                assert_eq!(missing, vec!["landing_page", "converted"]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn custom_required_columns() {
        let validator = SchemaValidator::new(columns(&["user_id"]));
        let table = RawTable::new(columns(&["user_id"]), Vec::new());
        assert!(validator.validate(&table).is_ok());
    }

    #[test]
    fn validation_is_repeatable() {
        let validator = SchemaValidator::default();
        let cols = columns(&["user_id", "converted"]);
        assert_eq!(
            validator.missing_columns(&cols),
            validator.missing_columns(&cols)
        );
    }
}
