//! Core data types for expression-based sample authentication.
//!
//! - [`ExpressionTable`](table::ExpressionTable): gene-by-sample expression matrix
//! - [`SampleMetadata`](metadata::SampleMetadata): ordered, keyed annotation table
//! - [`IdentityMetadata`](metadata::IdentityMetadata): declared identity per query sample
//! - [`MatchVerdict`](types::MatchVerdict): per-sample authentication outcome
//!
//! Tables are validated on construction: identifiers are unique on both axes and
//! expression values are finite. Missing-value handling happens upstream.

pub mod metadata;
pub mod table;
pub mod types;
