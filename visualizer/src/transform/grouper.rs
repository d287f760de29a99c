//! Count long-form rows per (split value, feature, feature value).
//!
//! # Ordering
//!
//! ```text
//! split ascending
//! └── feature in the requested order
//!     └── feature value ascending
//! ```

use serde::Serialize;
use std::collections::BTreeMap;

use super::melt::LongRow;
use crate::models::Field;

/// Number of subjects sharing a (split, feature, value) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountRecord {
    pub split: i64,
    pub feature: Field,
    pub value: i64,
    pub total: usize,
}

/// Group and count long-form rows.
///
/// `features` fixes the feature order; rows whose feature is not listed are
/// ignored.
pub fn count(rows: &[LongRow], features: &[Field]) -> Vec<CountRecord> {
    let mut groups: BTreeMap<(i64, usize, i64), usize> = BTreeMap::new();

    for row in rows {
        if let Some(rank) = features.iter().position(|f| *f == row.feature) {
            *groups.entry((row.split, rank, row.value)).or_default() += 1;
        }
    }

    groups
        .into_iter()
        .map(|((split, rank, value), total)| CountRecord {
            split,
            feature: features[rank],
            value,
            total,
        })
        .collect()
}

/// Sum of counts per split value.
pub fn split_totals(counts: &[CountRecord]) -> BTreeMap<i64, usize> {
    let mut totals = BTreeMap::new();
    for c in counts {
        *totals.entry(c.split).or_default() += c.total;
    }
    totals
}

/// Distinct split values, ascending.
pub fn split_values(counts: &[CountRecord]) -> Vec<i64> {
    split_totals(counts).into_keys().collect()
}

/// Distinct feature values across all features, ascending.
pub fn feature_values(counts: &[CountRecord]) -> Vec<i64> {
    let mut values: Vec<i64> = counts.iter().map(|c| c.value).collect();
    values.sort_unstable();
    values.dedup();
    values
}
