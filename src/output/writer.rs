use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::matching::correlation::CorrelationMatrix;
use crate::matching::validate::MatchResultTable;
use crate::output::format::{format_bool, format_float, quote_field};
use crate::utils::validation::{validate_experiment_id, ValidationError};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

const ARTIFACT_STEM: &str = "cell_line_authentication";

/// File name of a correlation matrix artifact
///
/// # Errors
///
/// Returns `OutputError::Validation` if the experiment id is not a safe file-name prefix.
pub fn correlation_file_name(
    experiment_id: &str,
    rows: usize,
    cols: usize,
) -> Result<String, OutputError> {
    let id = validate_experiment_id(experiment_id)?;
    Ok(format!("{id}_{ARTIFACT_STEM}_corr_r{rows}x{cols}.txt"))
}

/// File name of a match report artifact
///
/// # Errors
///
/// Returns `OutputError::Validation` if the experiment id is not a safe file-name prefix.
pub fn match_report_file_name(
    experiment_id: &str,
    rows: usize,
    cols: usize,
) -> Result<String, OutputError> {
    let id = validate_experiment_id(experiment_id)?;
    Ok(format!("{id}_{ARTIFACT_STEM}_compared_depmap_r{rows}x{cols}.txt"))
}

/// Render a correlation matrix: unlabeled index header, reference ids across,
/// one row per query sample.
#[must_use]
pub fn correlation_matrix_to_tsv(matrix: &CorrelationMatrix) -> String {
    let mut out = String::new();
    for id in matrix.reference_ids() {
        out.push('\t');
        out.push_str(&quote_field(id));
    }
    out.push('\n');

    for (query_id, row) in matrix.query_ids().iter().zip(matrix.values().rows()) {
        out.push_str(&quote_field(query_id));
        for &value in row {
            out.push('\t');
            out.push_str(&format_float(value));
        }
        out.push('\n');
    }
    out
}

/// Render a match report: sample id, pass-through metadata, best match, match flag.
///
/// A sample without a defined best match has an empty best-match field.
#[must_use]
pub fn match_report_to_tsv(table: &MatchResultTable) -> String {
    let mut out = quote_field(table.index_name());
    for column in table.columns() {
        out.push('\t');
        out.push_str(&quote_field(column));
    }
    out.push('\n');

    for row in table.rows() {
        out.push_str(&quote_field(&row.sample_id));
        for value in &row.metadata {
            out.push('\t');
            out.push_str(&quote_field(value));
        }
        out.push('\t');
        out.push_str(&quote_field(row.best_match.as_deref().unwrap_or_default()));
        out.push('\t');
        out.push_str(format_bool(row.is_match()));
        out.push('\n');
    }
    out
}

/// Write the correlation matrix into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns `OutputError::Validation` for an unsafe experiment id or
/// `OutputError::Io` if the directory or file cannot be written.
pub fn write_correlation_matrix(
    dir: &Path,
    experiment_id: &str,
    matrix: &CorrelationMatrix,
) -> Result<PathBuf, OutputError> {
    let (rows, cols) = matrix.shape();
    let path = dir.join(correlation_file_name(experiment_id, rows, cols)?);
    write_text(&path, &correlation_matrix_to_tsv(matrix))?;
    debug!(path = %path.display(), rows, cols, "Wrote correlation matrix");
    Ok(path)
}

/// Write the full match report into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns `OutputError::Validation` for an unsafe experiment id or
/// `OutputError::Io` if the directory or file cannot be written.
pub fn write_match_report(
    dir: &Path,
    experiment_id: &str,
    table: &MatchResultTable,
) -> Result<PathBuf, OutputError> {
    let (rows, cols) = table.shape();
    let path = dir.join(match_report_file_name(experiment_id, rows, cols)?);
    write_text(&path, &match_report_to_tsv(table))?;
    debug!(path = %path.display(), rows, cols, "Wrote match report");
    Ok(path)
}

fn write_text(path: &Path, text: &str) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::{IdentityMetadata, SampleMetadata};
    use crate::matching::pipeline::PipelineConfig;
    use crate::matching::rank::BestMatchAssignment;
    use ndarray::array;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn example_matrix() -> CorrelationMatrix {
        CorrelationMatrix::from_parts(
            ids(&["a", "b"]),
            ids(&["c", "d", "e"]),
            array![[-1.0, 1.0, 1.0], [1.0, -1.0, -1.0]],
        )
        .unwrap()
    }

    fn example_report() -> MatchResultTable {
        let matrix = CorrelationMatrix::from_parts(
            ids(&["S1", "S2", "S3"]),
            ids(&["ACH-1", "ACH-2"]),
            array![[0.9, 0.1], [0.9, 0.2], [f64::NAN, f64::NAN]],
        )
        .unwrap();
        let mut metadata = SampleMetadata::new("cid", ids(&["bio_context_id", "DepMap_ID"]));
        metadata.push_row("S1", ids(&["ctx1", "ACH-1"])).unwrap();
        metadata.push_row("S2", ids(&["ctx2", "ACH-2"])).unwrap();
        metadata.push_row("S3", ids(&["ctx3", "ACH-3"])).unwrap();
        let identity = IdentityMetadata::new(metadata, "DepMap_ID").unwrap();
        MatchResultTable::validate(
            &BestMatchAssignment::from_matrix(&matrix),
            &identity,
            &PipelineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            correlation_file_name("test_exp_id", 86, 1406).unwrap(),
            "test_exp_id_cell_line_authentication_corr_r86x1406.txt"
        );
        assert_eq!(
            match_report_file_name("test_experiment_id", 86, 35).unwrap(),
            "test_experiment_id_cell_line_authentication_compared_depmap_r86x35.txt"
        );
        assert!(correlation_file_name("../escape", 1, 1).is_err());
    }

    #[test]
    fn test_correlation_matrix_to_tsv() {
        assert_eq!(
            correlation_matrix_to_tsv(&example_matrix()),
            "\tc\td\te\na\t-1.0\t1.0\t1.0\nb\t1.0\t-1.0\t-1.0\n"
        );
    }

    #[test]
    fn test_match_report_to_tsv() {
        assert_eq!(
            match_report_to_tsv(&example_report()),
            "cid\tbio_context_id\tDepMap_ID\ttop_corr_depmap_ID\tcell_line_match\n\
             S1\tctx1\tACH-1\tACH-1\tTrue\n\
             S2\tctx2\tACH-2\tACH-1\tFalse\n\
             S3\tctx3\tACH-3\t\tFalse\n"
        );
    }

    #[test]
    fn test_write_creates_directory_and_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("cell_line_auth");

        let corr_path = write_correlation_matrix(&out_dir, "exp", &example_matrix()).unwrap();
        assert_eq!(
            corr_path.file_name().unwrap(),
            "exp_cell_line_authentication_corr_r2x3.txt"
        );
        let round_trip =
            crate::parsing::tsv::parse_correlation_file(&corr_path).unwrap();
        assert_eq!(round_trip, example_matrix());

        let report_path = write_match_report(&out_dir, "exp", &example_report()).unwrap();
        assert_eq!(
            report_path.file_name().unwrap(),
            "exp_cell_line_authentication_compared_depmap_r3x4.txt"
        );
        assert!(report_path.is_file());
    }

    #[test]
    fn test_write_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_match_report(dir.path(), "exp", &example_report()).unwrap();
        let first_bytes = std::fs::read(&first).unwrap();
        let second = write_match_report(dir.path(), "exp", &example_report()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first_bytes, std::fs::read(&second).unwrap());
    }

    #[test]
    fn test_quoted_ids_read_back_verbatim() {
        let matrix = CorrelationMatrix::from_parts(
            ids(&["S\"1", "S\t2"]),
            ids(&["ACH \"x\"", "ACH-2"]),
            array![[0.5, -0.25], [0.125, 1.0]],
        )
        .unwrap();

        let text = correlation_matrix_to_tsv(&matrix);
        assert!(text.starts_with("\t\"ACH \"\"x\"\"\"\tACH-2\n\"S\"\"1\"\t"));
        assert_eq!(
            crate::parsing::tsv::parse_correlation_text(&text).unwrap(),
            matrix
        );
    }
}
