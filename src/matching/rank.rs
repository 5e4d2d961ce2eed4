use std::collections::HashMap;

use ndarray::ArrayView1;
use tracing::warn;

use crate::matching::correlation::CorrelationMatrix;

/// The reference sample most correlated with a query sample
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch {
    pub reference_id: String,
    pub correlation: f64,
}

/// Best-correlated reference for every query sample, in matrix row order.
///
/// A query whose correlations are all undefined has no best match.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatchAssignment {
    entries: Vec<(String, Option<BestMatch>)>,
    index: HashMap<String, usize>,
}

impl BestMatchAssignment {
    /// Pick the maximum-correlation reference for each row of `matrix`.
    ///
    /// Ties go to the reference appearing first in the matrix's column order,
    /// and an undefined (`NaN`) cell is never chosen over a defined one.
    #[must_use]
    pub fn from_matrix(matrix: &CorrelationMatrix) -> Self {
        let mut entries = Vec::with_capacity(matrix.n_queries());
        let mut index = HashMap::with_capacity(matrix.n_queries());

        for (i, query_id) in matrix.query_ids().iter().enumerate() {
            let row = matrix.row(i);
            let best = best_index(row).map(|j| BestMatch {
                reference_id: matrix.reference_ids()[j].clone(),
                correlation: row[j],
            });
            if best.is_none() {
                warn!(sample = %query_id, "No defined correlation for sample");
            }
            index.insert(query_id.clone(), entries.len());
            entries.push((query_id.clone(), best));
        }

        Self { entries, index }
    }

    /// Best match for a query sample.
    ///
    /// `None` if the sample is unknown; `Some(None)` if it has no defined correlation.
    #[must_use]
    pub fn get(&self, query_id: &str) -> Option<Option<&BestMatch>> {
        self.index
            .get(query_id)
            .map(|&i| self.entries[i].1.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&BestMatch>)> {
        self.entries
            .iter()
            .map(|(id, best)| (id.as_str(), best.as_ref()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Column of the first maximum among defined values, or `None` if none are defined
fn best_index(row: ArrayView1<'_, f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (j, &value) in row.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((j, value)),
        }
    }
    best.map(|(j, _)| j)
}
