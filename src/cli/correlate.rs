use std::path::{Path, PathBuf};

use clap::Args;

use crate::cli::{load_gct, OutputFormat, DEFAULT_OUTPUT_DIR};
use crate::core::table::ExpressionTable;
use crate::matching::correlation::CorrelationMatrix;
use crate::matching::pipeline::{self, PipelineConfig, DEFAULT_ROW_METADATA_FOR_MATCHING};
use crate::output::writer::write_correlation_matrix;
use crate::utils::validation::validate_experiment_id;

#[derive(Args)]
pub struct CorrelateArgs {
    /// Query expression matrix (GCT, optionally gzipped)
    #[arg(long)]
    pub query_expr: PathBuf,

    /// Reference panel expression matrix (GCT, optionally gzipped)
    #[arg(long)]
    pub ref_expr: PathBuf,

    /// Experiment id used as the prefix of output file names
    #[arg(long)]
    pub experiment_id: String,

    /// Directory for output files
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Query row-metadata column used as the gene key ("rid" for row ids)
    #[arg(long, default_value = DEFAULT_ROW_METADATA_FOR_MATCHING)]
    pub row_metadata_for_matching: String,
}

pub fn run(args: CorrelateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    validate_experiment_id(&args.experiment_id)?;

    let config = PipelineConfig {
        row_metadata_for_matching: args.row_metadata_for_matching.clone(),
        ..PipelineConfig::default()
    };
    let query = pipeline::query_table(load_gct(&args.query_expr)?, &config)?;
    let reference = load_gct(&args.ref_expr)?.table;
    if verbose {
        print_dimensions(&query, &reference);
    }

    let (matrix, path) =
        correlate_and_write(&query, &reference, &args.output_dir, &args.experiment_id)?;

    match format {
        OutputFormat::Text => print_text_correlation(&matrix, &path),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&correlation_json(&matrix, &path))?);
        }
        OutputFormat::Tsv => print_tsv_correlation(&matrix, &path),
    }

    Ok(())
}

/// Correlate on shared genes and write the correlation file.
pub(crate) fn correlate_and_write(
    query: &ExpressionTable,
    reference: &ExpressionTable,
    output_dir: &Path,
    experiment_id: &str,
) -> anyhow::Result<(CorrelationMatrix, PathBuf)> {
    let matrix = pipeline::correlate(query, reference)?;
    let path = write_correlation_matrix(output_dir, experiment_id, &matrix)?;
    Ok((matrix, path))
}

pub(crate) fn print_dimensions(query: &ExpressionTable, reference: &ExpressionTable) {
    eprintln!(
        "Query: {} genes x {} samples",
        query.n_genes(),
        query.n_samples()
    );
    eprintln!(
        "Reference: {} genes x {} samples",
        reference.n_genes(),
        reference.n_samples()
    );
}

pub(crate) fn print_text_correlation(matrix: &CorrelationMatrix, path: &Path) {
    let (rows, cols) = matrix.shape();
    println!("Correlation Matrix");
    println!("{}", "=".repeat(60));
    println!("  Query samples: {rows}");
    println!("  Reference samples: {cols}");
    println!("  Undefined correlations: {}", matrix.undefined_count());
    println!("  Written to: {}", path.display());
}

pub(crate) fn correlation_json(matrix: &CorrelationMatrix, path: &Path) -> serde_json::Value {
    serde_json::json!({
        "path": path.display().to_string(),
        "query_samples": matrix.n_queries(),
        "reference_samples": matrix.n_references(),
        "undefined_correlations": matrix.undefined_count(),
    })
}

fn print_tsv_correlation(matrix: &CorrelationMatrix, path: &Path) {
    println!("query_samples\treference_samples\tundefined_correlations\tpath");
    println!(
        "{}\t{}\t{}\t{}",
        matrix.n_queries(),
        matrix.n_references(),
        matrix.undefined_count(),
        path.display()
    );
}
