//! Typed experiment records.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::schema::SchemaValidator;
use crate::table::RawTable;

/// Label of the baseline arm.
pub const CONTROL: &str = "control";
/// Label of the arm being evaluated.
pub const TREATMENT: &str = "treatment";

/// One user's exposure to the experiment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub user_id: String,
    pub group: String,
    pub landing_page: String,
    pub converted: bool,
}

impl Record {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        group: impl Into<String>,
        landing_page: impl Into<String>,
        converted: bool,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            group: group.into(),
            landing_page: landing_page.into(),
            converted,
        }
    }
}

/// Ordered sequence of records, in upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Validates the table's columns, then coerces every row.
    ///
    /// # Errors
    ///
    /// - `Schema` if a required column is missing (no rows are read)
    /// - `InvalidValue` if a `converted` cell is not 0/1/true/false
    pub fn from_table(table: &RawTable, validator: &SchemaValidator) -> Result<Self> {
        validator.validate(table)?;

        let index = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| AnalysisError::Schema {
                    missing: vec![name.to_string()],
                })
        };
        let user_id = index("user_id")?;
        let group = index("group")?;
        let landing_page = index("landing_page")?;
        let converted = index("converted")?;

        let records = table
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| -> Result<Record> {
                let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or_default();
                let raw_converted = cell(converted);
                let converted =
                    parse_converted(raw_converted).ok_or_else(|| AnalysisError::InvalidValue {
                        row: i + 1,
                        column: "converted".to_string(),
                        value: raw_converted.to_string(),
                    })?;
                Ok(Record::new(
                    cell(user_id),
                    cell(group),
                    cell(landing_page),
                    converted,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { records })
    }

    /// The four-row sample offered to users as a CSV template.
    #[must_use]
    pub fn template() -> Self {
        Self::new(vec![
            Record::new("111111", CONTROL, "old_page", false),
            Record::new("111112", CONTROL, "old_page", true),
            Record::new("111113", TREATMENT, "new_page", false),
            Record::new("111114", TREATMENT, "new_page", true),
        ])
    }

    /// Writes the dataset as CSV with `converted` encoded as 0/1.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["user_id", "group", "landing_page", "converted"])?;
        for record in &self.records {
            csv.write_record([
                record.user_id.as_str(),
                record.group.as_str(),
                record.landing_page.as_str(),
                if record.converted { "1" } else { "0" },
            ])?;
        }
        csv.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Records belonging to `group`.
    pub fn group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |r| r.group == group)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Parses a conversion flag. Accepts 0/1 (optionally as `0.0`/`1.0`) and
/// true/false in any case.
#[must_use]
pub fn parse_converted(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" => Some(true),
        "0" | "0.0" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> RawTable {
        RawTable::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn parse_converted_accepts_common_encodings() {
        assert_eq!(parse_converted("1"), Some(true));
        assert_eq!(parse_converted("0"), Some(false));
        assert_eq!(parse_converted("1.0"), Some(true));
        assert_eq!(parse_converted("TRUE"), Some(true));
        assert_eq!(parse_converted(" false "), Some(false));
        assert_eq!(parse_converted("yes"), None);
        assert_eq!(parse_converted("2"), None);
        assert_eq!(parse_converted(""), None);
    }

    #[test]
    fn from_table_reorders_columns_by_name() {
        let t = table("converted,extra,group,user_id,landing_page\n1,x,treatment,42,new_page\n");
        let dataset = Dataset::from_table(&t, &SchemaValidator::default()).unwrap();

        assert_eq!(
            dataset.records(),
            [Record::new("42", TREATMENT, "new_page", true)]
        );
    }

    #[test]
    fn from_table_rejects_missing_columns_before_reading_rows() {
        let t = table("user_id,group,converted\n1,control,banana\n");
        let err = Dataset::from_table(&t, &SchemaValidator::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::Schema { .. }));
    }

    #[test]
    fn from_table_rejects_unparseable_converted() {
        let t = table(
            "user_id,group,landing_page,converted\n1,control,old_page,0\n2,control,old_page,maybe\n",
        );
        let err = Dataset::from_table(&t, &SchemaValidator::default()).unwrap_err();

        match err {
            AnalysisError::InvalidValue { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "converted");
                assert_eq!(value, "maybe");
            }
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn group_filters_by_label() {
        let dataset = Dataset::template();
        assert_eq!(dataset.group(CONTROL).count(), 2);
        assert_eq!(dataset.group(TREATMENT).count(), 2);
        assert_eq!(dataset.group("holdout").count(), 0);
    }

    #[test]
    fn template_csv_matches_published_sample() {
        let mut out = Vec::new();
        Dataset::template().write_csv(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "user_id,group,landing_page,converted\n\
             111111,control,old_page,0\n\
             111112,control,old_page,1\n\
             111113,treatment,new_page,0\n\
             111114,treatment,new_page,1\n"
        );
    }

    #[test]
    fn template_round_trips_through_table() {
        let mut out = Vec::new();
        Dataset::template().write_csv(&mut out).unwrap();

        let t = RawTable::from_reader(out.as_slice()).unwrap();
        let dataset = Dataset::from_table(&t, &SchemaValidator::default()).unwrap();
        assert_eq!(dataset, Dataset::template());
    }
}
