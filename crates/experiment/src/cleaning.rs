//! Duplicate-user removal.
//!
//! A user that appears more than once cannot be attributed to a single arm,
//! so every row carrying that `user_id` is discarded, including the first.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::record::Dataset;

/// Row counts before and after cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Rows in the uploaded dataset.
    pub before: usize,
    /// Rows surviving duplicate removal.
    pub after: usize,
    /// Distinct user ids that appeared more than once.
    pub duplicate_users: usize,
}

impl CleaningSummary {
    /// Rows discarded by cleaning.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.before - self.after
    }
}

/// Output of [`remove_duplicate_users`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedDataset {
    pub dataset: Dataset,
    pub summary: CleaningSummary,
}

/// Drops every row whose `user_id` occurs more than once.
///
/// Surviving rows keep their input order. The input is not modified.
#[must_use]
pub fn remove_duplicate_users(dataset: &Dataset) -> CleanedDataset {
    let mut occurrences: HashMap<&str, usize> = HashMap::with_capacity(dataset.len());
    for record in dataset {
        *occurrences.entry(record.user_id.as_str()).or_default() += 1;
    }

    let duplicate_users = occurrences.values().filter(|&&n| n > 1).count();
    let cleaned: Dataset = dataset
        .iter()
        .filter(|r| occurrences.get(r.user_id.as_str()).copied() == Some(1))
        .cloned()
        .collect();

    let summary = CleaningSummary {
        before: dataset.len(),
        after: cleaned.len(),
        duplicate_users,
    };
    info!(
        before = summary.before,
        after = summary.after,
        duplicate_users,
        "removed duplicate users"
    );

    CleanedDataset {
        dataset: cleaned,
        summary,
    }
}
