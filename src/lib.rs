//! # cell-line-auth
//!
//! A library for authenticating cell line identities from RNA expression data.
//!
//! Cell lines get mislabelled, swapped, and cross-contaminated. When a plate of
//! samples comes back from sequencing, each sample's declared identity (for example
//! a DepMap id) should be confirmed against what its expression profile actually
//! looks like.
//!
//! `cell-line-auth` does this by correlating every query sample against a reference
//! panel of known cell line profiles and checking that the best-correlated reference
//! is the declared one.
//!
//! ## Features
//!
//! - **Gene alignment**: Restricts both matrices to their shared genes in a fixed order
//! - **Pearson correlation**: Vectorized query-by-reference correlation matrix
//! - **Best-match ranking**: Deterministic, first column wins ties
//! - **Identity validation**: Keyed join against declared identities, exact comparison
//! - **Mismatch reporting**: A full report is always written; any mismatch fails the run
//!
//! ## Example
//!
//! ```rust,no_run
//! use cell_line_auth::{check_for_mismatches, PipelineConfig};
//! use cell_line_auth::matching::pipeline::{authenticate, correlate, query_table};
//! use cell_line_auth::output::{write_correlation_matrix, write_match_report};
//! use cell_line_auth::parsing::gct::parse_gct_file;
//! use std::path::Path;
//!
//! let query = parse_gct_file(Path::new("plate.gct")).unwrap();
//! let reference = parse_gct_file(Path::new("depmap.gct")).unwrap();
//! let config = PipelineConfig::default();
//! let metadata = query.col_metadata.clone();
//!
//! let query = query_table(query, &config).unwrap();
//! let matrix = correlate(&query, &reference.table).unwrap();
//! let table = authenticate(&matrix, metadata, &config).unwrap();
//!
//! let out = Path::new("cell_line_auth");
//! write_correlation_matrix(out, "PLATE01", &matrix).unwrap();
//! write_match_report(out, "PLATE01", &table).unwrap();
//!
//! if let Err(e) = check_for_mismatches(&table).into_result() {
//!     eprintln!("{e}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Expression tables, sample metadata, and match verdicts
//! - [`matching`]: Alignment, correlation, ranking, validation, and reporting
//! - [`parsing`]: Parsers for GCT matrices, correlation files, and sample sheets
//! - [`output`]: Writers for the correlation and match report artifacts
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod matching;
pub mod output;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::metadata::{IdentityMetadata, SampleMetadata};
pub use core::table::{ExpressionTable, TableError};
pub use core::types::*;
pub use matching::pipeline::PipelineConfig;
pub use matching::{
    check_for_mismatches, AlignedPair, AuthenticationOutcome, BestMatch, BestMatchAssignment,
    CorrelationMatrix, MatchError, MatchResultRow, MatchResultTable, MismatchReport,
};
