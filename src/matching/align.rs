use tracing::debug;

use crate::core::table::ExpressionTable;
use crate::matching::error::MatchError;

/// Query and reference tables restricted to their shared genes.
///
/// Both tables carry the same gene identifiers in ascending lexicographic
/// order. The order depends only on the set of shared genes, never on the row
/// order of either input.
#[derive(Debug, Clone)]
pub struct AlignedPair {
    query: ExpressionTable,
    reference: ExpressionTable,

    /// Query genes absent from the reference
    pub query_only: usize,

    /// Reference genes absent from the query
    pub reference_only: usize,
}

impl AlignedPair {
    /// Intersect the gene sets of `query` and `reference` and reorder both tables to it.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::EmptyIntersection` if the tables share no genes.
    pub fn align(query: &ExpressionTable, reference: &ExpressionTable) -> Result<Self, MatchError> {
        let reference_index = reference.gene_index();

        let mut shared: Vec<(&str, usize, usize)> = query
            .genes()
            .iter()
            .enumerate()
            .filter_map(|(q, gene)| {
                reference_index
                    .get(gene.as_str())
                    .map(|&r| (gene.as_str(), q, r))
            })
            .collect();

        if shared.is_empty() {
            return Err(MatchError::EmptyIntersection {
                query_genes: query.n_genes(),
                reference_genes: reference.n_genes(),
            });
        }

        // Gene ids are unique per table, so the sort key is unique too.
        shared.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let query_rows: Vec<usize> = shared.iter().map(|&(_, q, _)| q).collect();
        let reference_rows: Vec<usize> = shared.iter().map(|&(_, _, r)| r).collect();

        let aligned = Self {
            query: query.select_genes(&query_rows),
            reference: reference.select_genes(&reference_rows),
            query_only: query.n_genes() - shared.len(),
            reference_only: reference.n_genes() - shared.len(),
        };

        debug!(
            shared = aligned.n_genes(),
            query_only = aligned.query_only,
            reference_only = aligned.reference_only,
            first = %aligned.query.genes()[0],
            "Aligned gene axes"
        );

        Ok(aligned)
    }

    #[must_use]
    pub fn query(&self) -> &ExpressionTable {
        &self.query
    }

    #[must_use]
    pub fn reference(&self) -> &ExpressionTable {
        &self.reference
    }

    /// Number of shared genes
    #[must_use]
    pub fn n_genes(&self) -> usize {
        self.query.n_genes()
    }

    /// The shared gene identifiers, sorted
    #[must_use]
    pub fn genes(&self) -> &[String] {
        self.query.genes()
    }
}
