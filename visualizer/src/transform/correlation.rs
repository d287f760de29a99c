//! Pearson correlation matrix and its upper-triangle mask.
//!
//! The full matrix is symmetric by construction: every off-diagonal pair is
//! computed once and written to both cells. Constant columns produce NaN,
//! which is passed through untouched.

use ndarray::{Array2, ArrayView1};
use serde::Serialize;

use crate::error::{TransformError, TransformResult};
use crate::models::{Field, Table};

/// Pearson coefficient of two equally long samples.
///
/// NaN when either sample has zero variance (or is empty).
pub fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return f64::NAN;
    }
    let mean_x = x.iter().take(n).sum::<f64>() / n as f64;
    let mean_y = y.iter().take(n).sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y.iter()).take(n) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    if r.is_nan() {
        r
    } else {
        r.clamp(-1.0, 1.0)
    }
}

/// Mask covering the upper triangle, diagonal included (`j >= i`).
pub fn upper_triangle_mask(n: usize) -> Array2<bool> {
    Array2::from_shape_fn((n, n), |(i, j)| j >= i)
}

/// Full pairwise correlation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Array2<f64>,
}

impl CorrelationMatrix {
    /// Correlate `columns` (one `Vec` per label, all the same length).
    pub fn compute(labels: Vec<String>, columns: &[Vec<f64>]) -> Self {
        let k = columns.len();
        let n = columns.iter().map(Vec::len).min().unwrap_or(0);
        let data = Array2::from_shape_fn((n, k), |(row, col)| columns[col][row]);

        let mut values = Array2::from_elem((k, k), f64::NAN);
        for i in 0..k {
            for j in i..k {
                let r = pearson(data.column(i), data.column(j));
                // Self-correlation is exactly 1 unless the column is constant.
                let r = if i == j && !r.is_nan() { 1.0 } else { r };
                values[[i, j]] = r;
                values[[j, i]] = r;
            }
        }

        Self { labels, values }
    }

    /// Correlate the given table columns.
    pub fn from_table(table: &Table, fields: &[Field]) -> TransformResult<Self> {
        if table.is_empty() {
            return Err(TransformError::EmptyInput);
        }
        let labels = fields.iter().map(|f| f.name().to_string()).collect();
        let columns: Vec<Vec<f64>> = fields.iter().map(|f| table.column(*f)).collect();
        Ok(Self::compute(labels, &columns))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        Some(self.values[[self.index_of(row)?, self.index_of(column)?]])
    }

    /// `cell(i, j) == cell(j, i)` for every pair (NaN equals NaN here).
    pub fn is_symmetric(&self) -> bool {
        let n = self.len();
        (0..n).all(|i| {
            (0..n).all(|j| {
                let (a, b) = (self.values[[i, j]], self.values[[j, i]]);
                a == b || (a.is_nan() && b.is_nan())
            })
        })
    }

    /// Suppress the upper triangle and the diagonal.
    pub fn masked(&self) -> MaskedMatrix {
        let mask = upper_triangle_mask(self.len());
        let cells = Array2::from_shape_fn(self.values.dim(), |(i, j)| {
            if mask[[i, j]] {
                None
            } else {
                Some(self.values[[i, j]])
            }
        });
        MaskedMatrix {
            labels: self.labels.clone(),
            cells,
        }
    }
}

/// One retained cell of the masked matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationCell {
    pub row: String,
    pub column: String,
    pub value: f64,
}

/// Correlation matrix with the upper triangle (and diagonal) suppressed.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedMatrix {
    pub labels: Vec<String>,
    pub cells: Array2<Option<f64>>,
}

impl MaskedMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.cells.get((row, column)).copied().flatten()
    }

    /// Retained cells, row-major.
    pub fn lower_triangle(&self) -> Vec<CorrelationCell> {
        self.cells
            .indexed_iter()
            .filter_map(|((i, j), v)| {
                v.as_ref().map(|&value| CorrelationCell {
                    row: self.labels[i].clone(),
                    column: self.labels[j].clone(),
                    value,
                })
            })
            .collect()
    }

    pub fn retained_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
