//! Pearson correlation between every query sample and every reference sample.
//!
//! Both tables are column-centred and the full `Q x R` covariance block is one
//! matrix product over the shared gene axis. Each cell is then scaled by the
//! product of the two columns' root sums of squares. The `1/n` factors cancel, so
//! no population/sample choice is made.
//!
//! A sample whose expression is constant across the aligned genes has no
//! defined correlation. Every cell in its row (query) or column (reference) is
//! set to `NaN`; the rest of the matrix is unaffected.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use tracing::{debug, warn};

use crate::core::table::{first_duplicate, TableError};
use crate::matching::align::AlignedPair;

/// Tolerance for accepting precomputed correlations slightly outside [-1, 1]
const RANGE_TOLERANCE: f64 = 1e-9;

/// Query-by-reference matrix of Pearson correlation coefficients.
///
/// Defined values lie in [-1, 1]; `NaN` marks an undefined correlation.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    query_ids: Vec<String>,
    reference_ids: Vec<String>,
    values: Array2<f64>,
}

impl CorrelationMatrix {
    /// Correlate every query sample with every reference sample.
    #[must_use]
    pub fn compute(pair: &AlignedPair) -> Self {
        let (query_centered, query_ss) = center_columns(pair.query().values());
        let (reference_centered, reference_ss) = center_columns(pair.reference().values());

        let mut values = query_centered.t().dot(&reference_centered);

        Zip::from(values.rows_mut())
            .and(&query_ss)
            .for_each(|mut row, &qs| {
                Zip::from(&mut row).and(&reference_ss).for_each(|cell, &rs| {
                    *cell = scale(*cell, qs, rs);
                });
            });

        let matrix = Self {
            query_ids: pair.query().samples().to_vec(),
            reference_ids: pair.reference().samples().to_vec(),
            values,
        };

        let undefined = matrix.undefined_count();
        if undefined > 0 {
            warn!(
                undefined,
                "Some correlations are undefined because a sample has constant expression"
            );
        }
        debug!(
            rows = matrix.n_queries(),
            cols = matrix.n_references(),
            genes = pair.n_genes(),
            "Computed correlation matrix"
        );

        matrix
    }

    /// Build a matrix from precomputed values (e.g. a correlation file).
    ///
    /// # Errors
    ///
    /// Returns `TableError::Dimensions` if the shape does not match the ids,
    /// `TableError::DuplicateId` for repeated ids, or `TableError::OutOfRange`
    /// for a defined value outside [-1, 1].
    pub fn from_parts(
        query_ids: Vec<String>,
        reference_ids: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self, TableError> {
        let (rows, cols) = values.dim();
        if rows != query_ids.len() || cols != reference_ids.len() {
            return Err(TableError::Dimensions {
                expected_rows: query_ids.len(),
                expected_cols: reference_ids.len(),
                rows,
                cols,
            });
        }
        if let Some(id) = first_duplicate(&query_ids) {
            return Err(TableError::DuplicateId {
                axis: "query sample",
                id: id.to_string(),
            });
        }
        if let Some(id) = first_duplicate(&reference_ids) {
            return Err(TableError::DuplicateId {
                axis: "reference sample",
                id: id.to_string(),
            });
        }
        if let Some(((r, c), &value)) = values
            .indexed_iter()
            .find(|(_, v)| !v.is_nan() && v.abs() > 1.0 + RANGE_TOLERANCE)
        {
            return Err(TableError::OutOfRange {
                query: query_ids[r].clone(),
                reference: reference_ids[c].clone(),
                value,
            });
        }

        Ok(Self {
            query_ids,
            reference_ids,
            values,
        })
    }

    #[must_use]
    pub fn query_ids(&self) -> &[String] {
        &self.query_ids
    }

    #[must_use]
    pub fn reference_ids(&self) -> &[String] {
        &self.reference_ids
    }

    #[must_use]
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    #[must_use]
    pub fn row(&self, query: usize) -> ArrayView1<'_, f64> {
        self.values.row(query)
    }

    /// `(query samples, reference samples)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    #[must_use]
    pub fn n_queries(&self) -> usize {
        self.query_ids.len()
    }

    #[must_use]
    pub fn n_references(&self) -> usize {
        self.reference_ids.len()
    }

    /// Correlation for a named pair; `None` if either id is unknown
    #[must_use]
    pub fn get(&self, query: &str, reference: &str) -> Option<f64> {
        let q = self.query_ids.iter().position(|id| id == query)?;
        let r = self.reference_ids.iter().position(|id| id == reference)?;
        Some(self.values[[q, r]])
    }

    /// Number of undefined cells
    #[must_use]
    pub fn undefined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }
}

/// Subtract each column's mean and return the centred matrix with each
/// column's sum of squares. Constant columns get a sum of squares of zero.
fn center_columns(values: ArrayView2<'_, f64>) -> (Array2<f64>, Array1<f64>) {
    let n_cols = values.ncols();
    let means = values
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(n_cols));
    let centered = &values - &means.insert_axis(Axis(0));

    // Rounding in the mean can leave constant columns slightly non-zero after
    // centring, so constancy is checked on the raw values.
    let sum_squares = Zip::from(centered.columns())
        .and(values.columns())
        .map_collect(|col, raw| {
            if is_constant(raw) {
                0.0
            } else {
                col.dot(&col)
            }
        });

    (centered, sum_squares)
}

fn is_constant(column: ArrayView1<'_, f64>) -> bool {
    match column.first() {
        Some(&first) => column.iter().all(|&v| v == first),
        None => true,
    }
}

/// Scale a covariance cell to a correlation, or `NaN` when either side has no variance
fn scale(covariance: f64, query_ss: f64, reference_ss: f64) -> f64 {
    let denominator = (query_ss * reference_ss).sqrt();
    if denominator > 0.0 && denominator.is_finite() {
        (covariance / denominator).clamp(-1.0, 1.0)
    } else {
        f64::NAN
    }
}
