//! Correlation-based identity matching.
//!
//! The pipeline is strictly linear and each stage returns a new immutable value:
//!
//! 1. [`AlignedPair::align`]: restrict query and reference to their shared genes,
//!    sorted by identifier
//! 2. [`CorrelationMatrix::compute`]: Pearson correlation of every query sample
//!    against every reference sample
//! 3. [`BestMatchAssignment::from_matrix`]: highest-correlated reference per query
//!    sample, first column wins ties
//! 4. [`MatchResultTable::validate`]: keyed join against declared identities
//! 5. [`check_for_mismatches`]: pass, or a [`MismatchReport`] listing every failure
//!
//! Any failure halts the run. An undefined correlation (a sample with constant
//! expression) is the exception: it is recorded as `NaN` in the matrix and as
//! [`MatchVerdict::Undefined`](crate::core::types::MatchVerdict::Undefined) in the
//! report, and only that sample is affected.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cell_line_auth::matching::pipeline::{authenticate, correlate, PipelineConfig};
//! use cell_line_auth::matching::report::check_for_mismatches;
//! use cell_line_auth::parsing::gct::parse_gct_file;
//! use std::path::Path;
//!
//! let query = parse_gct_file(Path::new("query.gct")).unwrap();
//! let reference = parse_gct_file(Path::new("reference.gct")).unwrap();
//!
//! let matrix = correlate(&query.table, &reference.table).unwrap();
//! let table = authenticate(&matrix, query.col_metadata, &PipelineConfig::default()).unwrap();
//!
//! // Persist `table` here, then:
//! check_for_mismatches(&table).into_result().unwrap();
//! ```

pub mod align;
pub mod correlation;
pub mod error;
pub mod pipeline;
pub mod rank;
pub mod report;
pub mod validate;

pub use align::AlignedPair;
pub use correlation::CorrelationMatrix;
pub use error::MatchError;
pub use rank::{BestMatch, BestMatchAssignment};
pub use report::{check_for_mismatches, AuthenticationOutcome, MismatchReport};
pub use validate::{MatchResultRow, MatchResultTable};
