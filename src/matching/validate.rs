use serde::Serialize;
use tracing::debug;

use crate::core::metadata::IdentityMetadata;
use crate::core::types::MatchVerdict;
use crate::matching::error::MatchError;
use crate::matching::pipeline::PipelineConfig;
use crate::matching::rank::BestMatchAssignment;

/// Authentication result for one query sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResultRow {
    pub sample_id: String,

    /// Pass-through metadata values, aligned with `MatchResultTable::metadata_columns`
    pub metadata: Vec<String>,

    pub declared_identity: String,

    /// Best-correlated reference, `None` when every correlation was undefined
    pub best_match: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<f64>,

    pub verdict: MatchVerdict,
}

impl MatchResultRow {
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.verdict.is_match()
    }
}

/// One [`MatchResultRow`] per query sample, in metadata order.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResultTable {
    index_name: String,
    metadata_columns: Vec<String>,
    identity_column: String,
    best_match_column: String,
    match_column: String,
    rows: Vec<MatchResultRow>,
}

impl MatchResultTable {
    /// Join best matches to declared identities and compare them.
    ///
    /// The join is keyed on sample id. Identities are compared by exact string
    /// equality; the reference sample id is its own identity label.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::ShapeMismatch` if a sample has a best match but no
    /// metadata, or metadata but no best match.
    pub fn validate(
        assignment: &BestMatchAssignment,
        identity: &IdentityMetadata,
        config: &PipelineConfig,
    ) -> Result<Self, MatchError> {
        let metadata = identity.metadata();

        let unannotated: Vec<&str> = assignment
            .iter()
            .map(|(id, _)| id)
            .filter(|id| metadata.row(id).is_none())
            .collect();
        if !unannotated.is_empty() {
            return Err(MatchError::ShapeMismatch(format!(
                "{} query sample(s) have no identity metadata: {}",
                unannotated.len(),
                preview(&unannotated)
            )));
        }

        let mut rows = Vec::with_capacity(metadata.len());
        let mut missing = Vec::new();

        for (sample_id, values) in metadata.iter() {
            let Some(best) = assignment.get(sample_id) else {
                missing.push(sample_id);
                continue;
            };
            let declared = identity.declared(sample_id).unwrap_or_default().to_string();

            let verdict = match best {
                None => MatchVerdict::Undefined,
                Some(b) if b.reference_id == declared => MatchVerdict::Match,
                Some(_) => MatchVerdict::Mismatch,
            };

            rows.push(MatchResultRow {
                sample_id: sample_id.to_string(),
                metadata: values.to_vec(),
                declared_identity: declared,
                best_match: best.map(|b| b.reference_id.clone()),
                correlation: best.map(|b| b.correlation),
                verdict,
            });
        }

        if !missing.is_empty() {
            return Err(MatchError::ShapeMismatch(format!(
                "{} annotated sample(s) are missing from the correlation matrix: {}",
                missing.len(),
                preview(&missing)
            )));
        }

        debug!(
            samples = rows.len(),
            matched = rows.iter().filter(|r| r.is_match()).count(),
            "Validated declared identities"
        );

        Ok(Self {
            index_name: metadata.index_name().to_string(),
            metadata_columns: metadata.columns().to_vec(),
            identity_column: identity.identity_column().to_string(),
            best_match_column: config.best_match_column.clone(),
            match_column: config.match_column.clone(),
            rows,
        })
    }

    #[must_use]
    pub fn rows(&self) -> &[MatchResultRow] {
        &self.rows
    }

    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    #[must_use]
    pub fn metadata_columns(&self) -> &[String] {
        &self.metadata_columns
    }

    #[must_use]
    pub fn identity_column(&self) -> &str {
        &self.identity_column
    }

    #[must_use]
    pub fn best_match_column(&self) -> &str {
        &self.best_match_column
    }

    #[must_use]
    pub fn match_column(&self) -> &str {
        &self.match_column
    }

    /// Data column headers: metadata columns, best-match column, match flag
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.metadata_columns
            .iter()
            .map(String::as_str)
            .chain([self.best_match_column.as_str(), self.match_column.as_str()])
            .collect()
    }

    /// `(rows, data columns)`, not counting the sample id column
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.metadata_columns.len() + 2)
    }

    pub fn matched(&self) -> impl Iterator<Item = &MatchResultRow> {
        self.rows.iter().filter(|r| r.is_match())
    }

    pub fn mismatched(&self) -> impl Iterator<Item = &MatchResultRow> {
        self.rows.iter().filter(|r| !r.is_match())
    }

    /// Copy of this table's layout holding only `rows`
    pub(crate) fn with_rows(&self, rows: Vec<MatchResultRow>) -> Self {
        Self {
            index_name: self.index_name.clone(),
            metadata_columns: self.metadata_columns.clone(),
            identity_column: self.identity_column.clone(),
            best_match_column: self.best_match_column.clone(),
            match_column: self.match_column.clone(),
            rows,
        }
    }
}

/// First few ids for error messages
fn preview(ids: &[&str]) -> String {
    const MAX_SHOWN: usize = 5;
    let mut shown: Vec<&str> = ids.iter().copied().take(MAX_SHOWN).collect();
    if ids.len() > MAX_SHOWN {
        shown.push("...");
    }
    shown.join(", ")
}
