//! Persistence of correlation matrices and match reports.
//!
//! Both artifacts are tab-separated text laid out the way pandas `to_csv`
//! writes a labelled data frame, so files stay byte-compatible with existing
//! downstream readers:
//!
//! | Artifact | File name |
//! |----------|-----------|
//! | Correlation matrix | `{experiment_id}_cell_line_authentication_corr_r{rows}x{cols}.txt` |
//! | Match report | `{experiment_id}_cell_line_authentication_compared_depmap_r{rows}x{cols}.txt` |
//!
//! Writing the same inputs twice produces byte-identical files.

pub mod format;
pub mod writer;

pub use writer::{write_correlation_matrix, write_match_report, OutputError};
