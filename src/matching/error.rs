use thiserror::Error;

use crate::core::table::TableError;
use crate::matching::report::MismatchReport;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error(
        "No gene identifiers shared between query ({query_genes} genes) and reference ({reference_genes} genes)"
    )]
    EmptyIntersection {
        query_genes: usize,
        reference_genes: usize,
    },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("{0}")]
    IdentityMismatch(Box<MismatchReport>),
}
