//! Command-line interface for cell-line-auth.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **correlate**: Correlate query samples against a reference panel
//! - **authenticate**: Match a precomputed correlation matrix against declared identities
//! - **run**: Correlate, write the report, and fail on any mismatch
//!
//! ## Usage
//!
//! ```text
//! # Full authentication of a plate
//! cell-line-auth run --query-expr plate.gct.gz --ref-expr depmap.gct.gz --experiment-id PLATE01
//!
//! # Correlate only
//! cell-line-auth correlate --query-expr plate.gct --ref-expr depmap.gct --experiment-id PLATE01
//!
//! # Re-check identities from an existing correlation file
//! cell-line-auth authenticate --query-expr plate.gct \
//!     --corr cell_line_auth/PLATE01_cell_line_authentication_corr_r86x1406.txt \
//!     --experiment-id PLATE01 --sample-metadata samples.tsv
//!
//! # JSON summary for scripting
//! cell-line-auth run ... --format json
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::core::metadata::SampleMetadata;
use crate::matching::pipeline::DEFAULT_IDENTITY_COLUMN;
use crate::parsing::gct::{parse_gct_file, GctData};
use crate::parsing::tsv::parse_sample_metadata_file;

pub mod authenticate;
pub mod correlate;
pub mod run;

/// Default directory for written artifacts
pub const DEFAULT_OUTPUT_DIR: &str = "./cell_line_auth/";

#[derive(Parser)]
#[command(name = "cell-line-auth")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Authenticate cell line identities from RNA expression")]
#[command(
    long_about = "cell-line-auth checks that each sample in an RNA-seq experiment is the cell line it claims to be.\n\nEvery query sample is correlated against a reference panel of cell line expression profiles:\n- The best-correlated reference is taken as the sample's observed identity\n- Observed and declared identities are compared sample by sample\n- A full report is always written, and any mismatch fails the run"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Correlate query samples against reference cell lines
    Correlate(correlate::CorrelateArgs),

    /// Compare best-correlated references to declared identities
    Authenticate(authenticate::AuthenticateArgs),

    /// Correlate and authenticate in one pass
    Run(run::RunArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Read a GCT file with a helpful error context
pub(crate) fn load_gct(path: &Path) -> anyhow::Result<GctData> {
    parse_gct_file(path)
        .with_context(|| format!("Failed to read expression matrix {}", path.display()))
}

/// Sample metadata from a sample sheet if given, else the query's column metadata.
pub(crate) fn load_sample_metadata(
    col_metadata: SampleMetadata,
    sample_metadata: Option<&Path>,
) -> anyhow::Result<SampleMetadata> {
    Ok(match sample_metadata {
        Some(path) => {
            let delimiter = match path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase)
                .as_deref()
            {
                Some("csv") => ',',
                _ => '\t',
            };
            parse_sample_metadata_file(path, delimiter)
                .with_context(|| format!("Failed to read sample metadata {}", path.display()))?
        }
        None => col_metadata,
    })
}

/// Arguments shared by commands that check declared identities
#[derive(clap::Args, Debug, Clone)]
pub struct IdentityArgs {
    /// Sample metadata column holding each sample's declared identity
    #[arg(long, default_value = DEFAULT_IDENTITY_COLUMN)]
    pub identity_column: String,

    /// Sample sheet (TSV, or CSV by extension) keyed by sample id; overrides
    /// the query matrix's column metadata
    #[arg(long)]
    pub sample_metadata: Option<PathBuf>,
}
