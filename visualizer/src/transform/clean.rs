//! Outlier filtering applied before correlating.
//!
//! Keeps records with a plausible pressure pair (`ap_lo <= ap_hi`) and with
//! height and weight inside their [2.5 %, 97.5 %] quantile ranges. Quantiles
//! are taken over the unfiltered table.

use crate::models::{Field, Table};

pub const LOWER_QUANTILE: f64 = 0.025;
pub const UPPER_QUANTILE: f64 = 0.975;

/// Quantile with linear interpolation between closest ranks.
///
/// NaN values are skipped; an empty input gives NaN.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Inclusive bounds used by [`clean`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub height: (f64, f64),
    pub weight: (f64, f64),
}

impl Bounds {
    pub fn of(table: &Table) -> Self {
        let heights = table.column(Field::Height);
        let weights = table.column(Field::Weight);
        Self {
            height: (quantile(&heights, LOWER_QUANTILE), quantile(&heights, UPPER_QUANTILE)),
            weight: (quantile(&weights, LOWER_QUANTILE), quantile(&weights, UPPER_QUANTILE)),
        }
    }
}

/// Filter the table for the heat map.
pub fn clean(table: &Table) -> Table {
    let bounds = Bounds::of(table);
    let within = |v: f64, (lo, hi): (f64, f64)| v >= lo && v <= hi;

    table.filter(|s| {
        let r = &s.record;
        r.ap_lo <= r.ap_hi && within(r.height, bounds.height) && within(r.weight, bounds.weight)
    })
}
