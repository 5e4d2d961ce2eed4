use std::collections::{HashMap, HashSet};

use ndarray::{Array2, ArrayView2, Axis};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Duplicate {axis} identifier: '{id}'")]
    DuplicateId { axis: &'static str, id: String },

    #[error("Dimension mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    Dimensions {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Non-finite expression value for gene '{gene}' in sample '{sample}'")]
    NonFiniteValue { gene: String, sample: String },

    #[error("Correlation value {value} out of range [-1, 1] for '{query}' vs '{reference}'")]
    OutOfRange {
        query: String,
        reference: String,
        value: f64,
    },

    #[error("Metadata row '{id}' has {found} values, expected {expected}")]
    RowLength {
        id: String,
        expected: usize,
        found: usize,
    },

    #[error("Column '{column}' not found (available: {})", available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },
}

/// Return the first identifier that occurs more than once, if any.
pub(crate) fn first_duplicate(ids: &[String]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().map(String::as_str).find(|id| !seen.insert(*id))
}

/// Gene-by-sample matrix of expression levels.
///
/// Rows are genes and columns are samples. Identifiers on both axes are
/// unique and every value is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTable {
    genes: Vec<String>,
    samples: Vec<String>,
    values: Array2<f64>,
}

impl ExpressionTable {
    /// Build a table, validating identifiers and values.
    ///
    /// # Errors
    ///
    /// Returns `TableError::Dimensions` if `values` is not `genes x samples`,
    /// `TableError::DuplicateId` if either axis repeats an identifier, or
    /// `TableError::NonFiniteValue` for NaN or infinite cells.
    pub fn new(
        genes: Vec<String>,
        samples: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self, TableError> {
        let (rows, cols) = values.dim();
        if rows != genes.len() || cols != samples.len() {
            return Err(TableError::Dimensions {
                expected_rows: genes.len(),
                expected_cols: samples.len(),
                rows,
                cols,
            });
        }
        if let Some(id) = first_duplicate(&genes) {
            return Err(TableError::DuplicateId {
                axis: "gene",
                id: id.to_string(),
            });
        }
        if let Some(id) = first_duplicate(&samples) {
            return Err(TableError::DuplicateId {
                axis: "sample",
                id: id.to_string(),
            });
        }
        if let Some(((row, col), _)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(TableError::NonFiniteValue {
                gene: genes[row].clone(),
                sample: samples[col].clone(),
            });
        }

        Ok(Self {
            genes,
            samples,
            values,
        })
    }

    #[must_use]
    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    #[must_use]
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    #[must_use]
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    #[must_use]
    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Map of gene identifier to row index
    #[must_use]
    pub fn gene_index(&self) -> HashMap<&str, usize> {
        self.genes
            .iter()
            .enumerate()
            .map(|(i, g)| (g.as_str(), i))
            .collect()
    }

    /// Replace the gene identifiers, keeping values and row order.
    ///
    /// Used to key genes by a row-metadata column (e.g. gene symbol) instead of row ids.
    ///
    /// # Errors
    ///
    /// Returns `TableError::Dimensions` if the key count differs from the row count,
    /// or `TableError::DuplicateId` if the new keys are not unique.
    pub fn rekey_genes(self, keys: Vec<String>) -> Result<Self, TableError> {
        Self::new(keys, self.samples, self.values)
    }

    /// New table holding the given rows, in the given order.
    ///
    /// Callers pass indices obtained from this table, so they are in bounds and
    /// unique, and the result keeps the identifier invariants.
    pub(crate) fn select_genes(&self, rows: &[usize]) -> Self {
        Self {
            genes: rows.iter().map(|&i| self.genes[i].clone()).collect(),
            samples: self.samples.clone(),
            values: self.values.select(Axis(0), rows),
        }
    }
}
