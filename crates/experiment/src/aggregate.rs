//! Per-group conversion statistics.

use std::collections::BTreeMap;

use abtest_core::wilson_ci;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::record::Dataset;

/// Trial count, success count, and conversion rate for one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    /// Number of users in the group.
    pub count: u64,
    /// Number of those users that converted (never exceeds `count`).
    pub successes: u64,
    /// `successes / count`.
    pub conversion_rate: f64,
}

impl GroupStats {
    /// Builds stats from raw counts.
    ///
    /// # Errors
    ///
    /// Returns `EmptyGroup` when `count` is zero, and `InvalidValue` when
    /// `successes` exceeds `count`.
    pub fn from_counts(group: &str, successes: u64, count: u64) -> Result<Self> {
        if count == 0 {
            return Err(AnalysisError::EmptyGroup {
                group: group.to_string(),
            });
        }
        if successes > count {
            return Err(AnalysisError::InvalidValue {
                row: 0,
                column: "converted".to_string(),
                value: format!("{successes} successes out of {count} rows in '{group}'"),
            });
        }

        Ok(Self {
            count,
            successes,
            conversion_rate: successes as f64 / count as f64,
        })
    }

    /// Wilson score interval for the conversion rate at critical value `z`
    /// (1.96 for 95%).
    #[must_use]
    pub fn wilson_interval(&self, z: f64) -> (f64, f64) {
        wilson_ci(self.successes, self.count, z)
    }
}

/// Computes stats for a single group label.
///
/// # Errors
///
/// Returns `EmptyGroup` if no row carries `group`.
pub fn group_stats(dataset: &Dataset, group: &str) -> Result<GroupStats> {
    let (count, successes) = dataset
        .group(group)
        .fold((0u64, 0u64), |(count, successes), record| {
            (count + 1, successes + u64::from(record.converted))
        });

    let stats = GroupStats::from_counts(group, successes, count)?;
    debug!(
        group,
        count = stats.count,
        successes = stats.successes,
        conversion_rate = stats.conversion_rate,
        "aggregated group"
    );
    Ok(stats)
}

/// Computes stats for every group label present, keyed by label.
///
/// Labels other than control and treatment are included here even though
/// the hypothesis test ignores them.
#[must_use]
pub fn summarize(dataset: &Dataset) -> BTreeMap<String, GroupStats> {
    let mut tallies: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for record in dataset {
        let entry = tallies.entry(record.group.as_str()).or_default();
        entry.0 += 1;
        entry.1 += u64::from(record.converted);
    }

    tallies
        .into_iter()
        .map(|(group, (count, successes))| {
            let stats = GroupStats {
                count,
                successes,
                conversion_rate: successes as f64 / count as f64,
            };
            (group.to_string(), stats)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Record, CONTROL, TREATMENT};

    fn dataset(rows: &[(&str, &str, bool)]) -> Dataset {
        rows.iter()
            .map(|(id, group, converted)| Record::new(*id, *group, "page", *converted))
            .collect()
    }

    #[test]
    fn group_stats_counts_conversions() {
        let data = dataset(&[
            ("1", CONTROL, true),
            ("2", CONTROL, false),
            ("3", CONTROL, false),
            ("4", TREATMENT, true),
        ]);

        let stats = group_stats(&data, CONTROL).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.conversion_rate, 1.0 / 3.0);
    }

    #[test]
    fn group_stats_empty_group_is_an_error() {
        let data = dataset(&[("1", CONTROL, true)]);
        let err = group_stats(&data, TREATMENT).unwrap_err();

        match err {
            AnalysisError::EmptyGroup { group } => assert_eq!(group, TREATMENT),
            other => panic!("expected empty group, got {other:?}"),
        }
    }

    #[test]
    fn from_counts_rejects_impossible_counts() {
        assert!(GroupStats::from_counts(CONTROL, 5, 4).is_err());
        assert!(GroupStats::from_counts(CONTROL, 0, 0).is_err());
        assert!(GroupStats::from_counts(CONTROL, 4, 4).is_ok());
    }

    #[test]
    fn summarize_includes_unexpected_labels() {
        let data = dataset(&[
            ("1", CONTROL, true),
            ("2", TREATMENT, false),
            ("3", "holdout", true),
            ("4", "holdout", false),
        ]);

        let stats = summarize(&data);

        assert_eq!(
            stats.keys().map(String::as_str).collect::<Vec<_>>(),
            vec![CONTROL, "holdout", TREATMENT]
        );
        assert_eq!(stats["holdout"].count, 2);
        assert_eq!(stats["holdout"].conversion_rate, 0.5);
    }

    #[test]
    fn summarize_agrees_with_group_stats() {
        let data = dataset(&[
            ("1", CONTROL, true),
            ("2", CONTROL, false),
            ("3", TREATMENT, true),
            ("4", TREATMENT, true),
            ("5", TREATMENT, false),
        ]);

        let all = summarize(&data);
        assert_eq!(all[CONTROL], group_stats(&data, CONTROL).unwrap());
        assert_eq!(all[TREATMENT], group_stats(&data, TREATMENT).unwrap());
    }

    #[test]
    fn summarize_empty_dataset_is_empty() {
        assert!(summarize(&Dataset::default()).is_empty());
    }

    #[test]
    fn wilson_interval_brackets_rate() {
        let stats = GroupStats::from_counts(TREATMENT, 60, 500).unwrap();
        let (lower, upper) = stats.wilson_interval(1.96);
        assert!(lower < stats.conversion_rate && stats.conversion_rate < upper);
    }
}
