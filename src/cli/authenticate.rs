use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::cli::{load_gct, load_sample_metadata, IdentityArgs, OutputFormat, DEFAULT_OUTPUT_DIR};
use crate::core::metadata::SampleMetadata;
use crate::matching::correlation::CorrelationMatrix;
use crate::matching::pipeline::{self, PipelineConfig};
use crate::matching::report::{check_for_mismatches, AuthenticationOutcome};
use crate::matching::validate::{MatchResultRow, MatchResultTable};
use crate::output::writer::write_match_report;
use crate::parsing::tsv::parse_correlation_file;
use crate::utils::validation::validate_experiment_id;

#[derive(Args)]
pub struct AuthenticateArgs {
    /// Query expression matrix (GCT, optionally gzipped) the correlations were computed from
    #[arg(long)]
    pub query_expr: PathBuf,

    /// Correlation matrix written by `correlate`
    #[arg(long)]
    pub corr: PathBuf,

    /// Experiment id used as the prefix of output file names
    #[arg(long)]
    pub experiment_id: String,

    /// Directory for output files
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub identity: IdentityArgs,
}

pub fn run(args: AuthenticateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    validate_experiment_id(&args.experiment_id)?;

    let query = load_gct(&args.query_expr)?;
    let matrix = parse_correlation_file(&args.corr)
        .with_context(|| format!("Failed to read correlation matrix {}", args.corr.display()))?;
    pipeline::check_query_rows(&matrix, query.table.samples())?;

    if verbose {
        eprintln!(
            "Correlation matrix: {} query x {} reference samples",
            matrix.n_queries(),
            matrix.n_references()
        );
    }

    let config = PipelineConfig {
        identity_column: args.identity.identity_column.clone(),
        ..PipelineConfig::default()
    };
    let (table, path) = authenticate_and_write(
        &matrix,
        query.col_metadata,
        args.identity.sample_metadata.as_deref(),
        &config,
        &args.output_dir,
        &args.experiment_id,
    )?;

    let outcome = check_for_mismatches(&table);
    match format {
        OutputFormat::Text => print_text_outcome(&table, &outcome, &path),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome_json(&table, &outcome, &path))?);
        }
        OutputFormat::Tsv => print_tsv_outcome(&table, &path),
    }

    outcome.into_result()?;
    Ok(())
}

/// Rank, validate against declared identities, and write the full match report.
pub(crate) fn authenticate_and_write(
    matrix: &CorrelationMatrix,
    col_metadata: SampleMetadata,
    sample_metadata: Option<&Path>,
    config: &PipelineConfig,
    output_dir: &Path,
    experiment_id: &str,
) -> anyhow::Result<(MatchResultTable, PathBuf)> {
    let metadata = load_sample_metadata(col_metadata, sample_metadata)?;
    let table = pipeline::authenticate(matrix, metadata, config)?;
    let path = write_match_report(output_dir, experiment_id, &table)?;
    Ok((table, path))
}

pub(crate) fn print_text_outcome(
    table: &MatchResultTable,
    outcome: &AuthenticationOutcome,
    path: &Path,
) {
    println!("Authentication Results");
    println!("{}", "=".repeat(60));
    println!("  Samples: {}", table.rows().len());
    println!("  Matched: {}", table.matched().count());
    println!("  Mismatched: {}", table.mismatched().count());
    println!("  Report written to: {}", path.display());

    match outcome {
        AuthenticationOutcome::Pass { .. } => println!("\nPASS"),
        AuthenticationOutcome::Mismatch(report) => {
            println!("\nFAIL: {} of {} sample(s) mismatched", report.len(), report.total);
        }
    }
}

pub(crate) fn outcome_json(
    table: &MatchResultTable,
    outcome: &AuthenticationOutcome,
    path: &Path,
) -> serde_json::Value {
    let mismatches: &[MatchResultRow] = match outcome {
        AuthenticationOutcome::Pass { .. } => &[],
        AuthenticationOutcome::Mismatch(report) => report.rows(),
    };
    serde_json::json!({
        "path": path.display().to_string(),
        "samples": table.rows().len(),
        "matched": table.matched().count(),
        "passed": outcome.is_pass(),
        "mismatches": mismatches,
    })
}

pub(crate) fn print_tsv_outcome(table: &MatchResultTable, path: &Path) {
    println!("samples\tmatched\tmismatched\tpath");
    println!(
        "{}\t{}\t{}\t{}",
        table.rows().len(),
        table.matched().count(),
        table.mismatched().count(),
        path.display()
    );
}
