use tracing::info;

use crate::core::metadata::{IdentityMetadata, SampleMetadata};
use crate::core::table::ExpressionTable;
use crate::matching::align::AlignedPair;
use crate::matching::correlation::CorrelationMatrix;
use crate::matching::error::MatchError;
use crate::matching::rank::BestMatchAssignment;
use crate::matching::validate::MatchResultTable;
use crate::parsing::gct::{GctData, ParseError};

/// Column holding each query sample's declared identity
pub const DEFAULT_IDENTITY_COLUMN: &str = "DepMap_ID";

/// Report column holding the best-correlated reference
pub const DEFAULT_BEST_MATCH_COLUMN: &str = "top_corr_depmap_ID";

/// Report column holding the match flag
pub const DEFAULT_MATCH_COLUMN: &str = "cell_line_match";

/// Query row-metadata column used as the gene key for alignment
pub const DEFAULT_ROW_METADATA_FOR_MATCHING: &str = "gene_symbol";

/// Column names used by the matching pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub identity_column: String,
    pub best_match_column: String,
    pub match_column: String,
    pub row_metadata_for_matching: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            identity_column: DEFAULT_IDENTITY_COLUMN.to_string(),
            best_match_column: DEFAULT_BEST_MATCH_COLUMN.to_string(),
            match_column: DEFAULT_MATCH_COLUMN.to_string(),
            row_metadata_for_matching: DEFAULT_ROW_METADATA_FOR_MATCHING.to_string(),
        }
    }
}

/// The query expression table with genes keyed by `config.row_metadata_for_matching`.
///
/// # Errors
///
/// Returns `ParseError::Table` if the column does not exist or its values are
/// not unique.
pub fn query_table(
    query: GctData,
    config: &PipelineConfig,
) -> Result<ExpressionTable, ParseError> {
    query.keyed_by(&config.row_metadata_for_matching)
}

/// Align two tables on their shared genes and correlate every sample pair.
///
/// # Errors
///
/// Returns `MatchError::EmptyIntersection` if the tables share no genes.
pub fn correlate(
    query: &ExpressionTable,
    reference: &ExpressionTable,
) -> Result<CorrelationMatrix, MatchError> {
    let pair = AlignedPair::align(query, reference)?;
    info!(
        genes = pair.n_genes(),
        query_samples = query.n_samples(),
        reference_samples = reference.n_samples(),
        "Correlating on shared genes"
    );
    Ok(CorrelationMatrix::compute(&pair))
}

/// Select each query sample's best reference and compare it to the identity
/// declared in `config.identity_column` of `metadata`.
///
/// # Errors
///
/// Returns `MatchError::Table` if the identity column is missing, or
/// `MatchError::ShapeMismatch` if the matrix rows and the metadata do not
/// cover the same samples.
pub fn authenticate(
    matrix: &CorrelationMatrix,
    metadata: SampleMetadata,
    config: &PipelineConfig,
) -> Result<MatchResultTable, MatchError> {
    let identity = IdentityMetadata::new(metadata, &config.identity_column)?;
    if matrix.n_queries() != identity.len() {
        return Err(MatchError::ShapeMismatch(format!(
            "correlation matrix has {} query rows but identity metadata has {} samples",
            matrix.n_queries(),
            identity.len()
        )));
    }
    let assignment = BestMatchAssignment::from_matrix(matrix);
    MatchResultTable::validate(&assignment, &identity, config)
}

/// Check that a precomputed matrix has one row per expected query sample.
///
/// # Errors
///
/// Returns `MatchError::ShapeMismatch` if counts differ or a sample is missing.
pub fn check_query_rows(matrix: &CorrelationMatrix, samples: &[String]) -> Result<(), MatchError> {
    if matrix.n_queries() != samples.len() {
        return Err(MatchError::ShapeMismatch(format!(
            "correlation matrix has {} rows, expected {} query samples",
            matrix.n_queries(),
            samples.len()
        )));
    }
    let rows: std::collections::HashSet<&str> =
        matrix.query_ids().iter().map(String::as_str).collect();
    if let Some(missing) = samples.iter().find(|s| !rows.contains(s.as_str())) {
        return Err(MatchError::ShapeMismatch(format!(
            "query sample '{missing}' has no row in the correlation matrix"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::TableError;
    use crate::core::types::MatchVerdict;
    use crate::parsing::gct::parse_gct_text;
    use crate::matching::report::{check_for_mismatches, AuthenticationOutcome};
    use ndarray::array;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn identity(pairs: &[(&str, &str)]) -> SampleMetadata {
        let mut metadata = SampleMetadata::new("cid", ids(&["DepMap_ID"]));
        for (sample, declared) in pairs {
            metadata.push_row(*sample, vec![(*declared).to_string()]).unwrap();
        }
        metadata
    }

    fn reference() -> ExpressionTable {
        ExpressionTable::new(
            ids(&["g1", "g2", "g3", "g4"]),
            ids(&["ACH-1", "ACH-2", "ACH-3"]),
            array![
                [1.0, 8.0, 2.0],
                [2.0, 6.0, 9.0],
                [3.0, 4.0, 1.0],
                [4.0, 2.0, 7.0]
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end_pass() {
        // Noisy copies of ACH-1 and ACH-3 with genes in a different order
        let query = ExpressionTable::new(
            ids(&["g4", "g3", "g2", "g1", "g9"]),
            ids(&["s1", "s2"]),
            array![
                [4.1, 7.2],
                [2.9, 0.8],
                [2.2, 9.1],
                [0.9, 2.1],
                [5.0, 5.0]
            ],
        )
        .unwrap();

        let matrix = correlate(&query, &reference()).unwrap();
        assert_eq!(matrix.shape(), (2, 3));

        let table = authenticate(
            &matrix,
            identity(&[("s1", "ACH-1"), ("s2", "ACH-3")]),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert!(table.rows().iter().all(|r| r.verdict == MatchVerdict::Match));
        assert!(check_for_mismatches(&table).is_pass());
    }

    #[test]
    fn test_end_to_end_mismatch() {
        let query = ExpressionTable::new(
            ids(&["g1", "g2", "g3", "g4"]),
            ids(&["s1"]),
            array![[8.0], [6.0], [4.0], [2.0]],
        )
        .unwrap();

        let matrix = correlate(&query, &reference()).unwrap();
        let table = authenticate(
            &matrix,
            identity(&[("s1", "ACH-1")]),
            &PipelineConfig::default(),
        )
        .unwrap();

        assert_eq!(table.rows()[0].best_match.as_deref(), Some("ACH-2"));
        match check_for_mismatches(&table) {
            AuthenticationOutcome::Mismatch(report) => assert_eq!(report.len(), 1),
            AuthenticationOutcome::Pass { .. } => panic!("expected a mismatch"),
        }
    }

    #[test]
    fn test_correlate_empty_intersection() {
        let query = ExpressionTable::new(ids(&["x"]), ids(&["s1"]), array![[1.0]]).unwrap();
        assert!(matches!(
            correlate(&query, &reference()),
            Err(MatchError::EmptyIntersection { .. })
        ));
    }

    #[test]
    fn test_authenticate_count_mismatch() {
        let matrix =
            CorrelationMatrix::from_parts(ids(&["s1"]), ids(&["ACH-1"]), array![[0.5]]).unwrap();
        let err = authenticate(
            &matrix,
            identity(&[("s1", "ACH-1"), ("s2", "ACH-2")]),
            &PipelineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MatchError::ShapeMismatch(_)));
    }

    #[test]
    fn test_authenticate_uses_configured_columns() {
        let matrix = CorrelationMatrix::from_parts(
            ids(&["s1", "s2"]),
            ids(&["ACH-1", "ACH-2"]),
            array![[0.9, 0.1], [0.2, 0.8]],
        )
        .unwrap();
        let mut metadata = SampleMetadata::new("cid", ids(&["DepMap_ID", "arxs_id"]));
        metadata.push_row("s1", ids(&["ACH-2", "ACH-1"])).unwrap();
        metadata.push_row("s2", ids(&["ACH-1", "ACH-2"])).unwrap();

        let config = PipelineConfig {
            identity_column: "arxs_id".to_string(),
            best_match_column: "observed".to_string(),
            ..PipelineConfig::default()
        };
        let table = authenticate(&matrix, metadata.clone(), &config).unwrap();
        assert!(check_for_mismatches(&table).is_pass());
        assert!(table.columns().contains(&"observed"));

        // The same metadata fails under the default identity column
        let table = authenticate(&matrix, metadata, &PipelineConfig::default()).unwrap();
        assert_eq!(table.mismatched().count(), 2);
    }

    #[test]
    fn test_authenticate_missing_identity_column() {
        let matrix =
            CorrelationMatrix::from_parts(ids(&["s1"]), ids(&["ACH-1"]), array![[0.5]]).unwrap();
        let config = PipelineConfig {
            identity_column: "arxs_id".to_string(),
            ..PipelineConfig::default()
        };
        let err = authenticate(&matrix, identity(&[("s1", "ACH-1")]), &config).unwrap_err();
        assert!(matches!(
            err,
            MatchError::Table(TableError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_query_table_uses_configured_gene_key() {
        let gct = "#1.3\n2\t1\t2\t0\nid\tgene_symbol\tentrez\tS1\ng1\tTP53\t7157\t1\ng2\tMYC\t4609\t2\n";

        let table = query_table(parse_gct_text(gct).unwrap(), &PipelineConfig::default()).unwrap();
        assert_eq!(table.genes(), ["TP53", "MYC"]);

        let config = PipelineConfig {
            row_metadata_for_matching: "entrez".to_string(),
            ..PipelineConfig::default()
        };
        let table = query_table(parse_gct_text(gct).unwrap(), &config).unwrap();
        assert_eq!(table.genes(), ["7157", "4609"]);
    }

    #[test]
    fn test_check_query_rows() {
        let matrix = CorrelationMatrix::from_parts(
            ids(&["s1", "s2"]),
            ids(&["ACH-1"]),
            array![[0.5], [0.1]],
        )
        .unwrap();
        assert!(check_query_rows(&matrix, &ids(&["s2", "s1"])).is_ok());
        assert!(check_query_rows(&matrix, &ids(&["s1"])).is_err());
        assert!(check_query_rows(&matrix, &ids(&["s1", "s3"])).is_err());
    }
}
