//! Parsers for expression matrices, correlation matrices, and sample metadata.
//!
//! - **GCT 1.2 / 1.3** ([`gct`]): expression values plus row and column metadata,
//!   optionally gzip compressed
//! - **Correlation matrices** ([`tsv`]): tab-separated files written by the
//!   `correlate` command, for re-running matching without recomputing
//! - **Sample metadata** ([`tsv`]): tab- or comma-separated tables keyed by
//!   sample id, supplying declared identities
//!
//! ## Example
//!
//! ```rust,no_run
//! use cell_line_auth::parsing::gct::parse_gct_file;
//! use std::path::Path;
//!
//! let data = parse_gct_file(Path::new("query.gct.gz")).unwrap();
//! let table = data.keyed_by("gene_symbol").unwrap();
//! println!("{} genes x {} samples", table.n_genes(), table.n_samples());
//! ```

pub mod gct;
pub mod tsv;
