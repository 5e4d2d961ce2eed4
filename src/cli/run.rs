use std::path::PathBuf;

use clap::Args;

use crate::cli::authenticate::{authenticate_and_write, outcome_json, print_text_outcome};
use crate::cli::correlate::{
    correlate_and_write, correlation_json, print_dimensions, print_text_correlation,
};
use crate::cli::{load_gct, IdentityArgs, OutputFormat, DEFAULT_OUTPUT_DIR};
use crate::matching::pipeline::{self, PipelineConfig, DEFAULT_ROW_METADATA_FOR_MATCHING};
use crate::matching::report::check_for_mismatches;
use crate::utils::validation::validate_experiment_id;

#[derive(Args)]
pub struct RunArgs {
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

    #[command(flatten)]
    pub identity: IdentityArgs,
}

pub fn run(args: RunArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    validate_experiment_id(&args.experiment_id)?;

    let config = PipelineConfig {
        identity_column: args.identity.identity_column.clone(),
        row_metadata_for_matching: args.row_metadata_for_matching.clone(),
        ..PipelineConfig::default()
    };

    let query = load_gct(&args.query_expr)?;
    let col_metadata = query.col_metadata.clone();
    let query = pipeline::query_table(query, &config)?;
    let reference = load_gct(&args.ref_expr)?.table;
    if verbose {
        print_dimensions(&query, &reference);
    }

    // Both artifacts are written before any mismatch is reported.
    let (matrix, corr_path) =
        correlate_and_write(&query, &reference, &args.output_dir, &args.experiment_id)?;
    let (table, report_path) = authenticate_and_write(
        &matrix,
        col_metadata,
        args.identity.sample_metadata.as_deref(),
        &config,
        &args.output_dir,
        &args.experiment_id,
    )?;
    let outcome = check_for_mismatches(&table);

    match format {
        OutputFormat::Text => {
            print_text_correlation(&matrix, &corr_path);
            println!();
            print_text_outcome(&table, &outcome, &report_path);
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "experiment_id": args.experiment_id,
                "correlation": correlation_json(&matrix, &corr_path),
                "authentication": outcome_json(&table, &outcome, &report_path),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("samples\tmatched\tmismatched\tundefined_correlations\tcorrelation_path\treport_path");
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                table.rows().len(),
                table.matched().count(),
                table.mismatched().count(),
                matrix.undefined_count(),
                corr_path.display(),
                report_path.display()
            );
        }
    }

    outcome.into_result()?;
    Ok(())
}
