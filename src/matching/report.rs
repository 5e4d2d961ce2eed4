//! Partition a match result table into passing and failing samples.
//!
//! Checking never writes files. Callers persist the full match report first,
//! then turn a [`AuthenticationOutcome::Mismatch`] into a fatal error with
//! [`AuthenticationOutcome::into_result`].

use std::fmt;

use tracing::{info, warn};

use crate::core::types::MatchVerdict;
use crate::matching::error::MatchError;
use crate::matching::validate::{MatchResultRow, MatchResultTable};

/// Every sample whose best-correlated reference differs from its declared identity
#[derive(Debug, Clone, PartialEq)]
pub struct MismatchReport {
    /// The mismatched subset, with every metadata column
    pub table: MatchResultTable,

    /// Number of samples checked
    pub total: usize,
}

impl MismatchReport {
    #[must_use]
    pub fn rows(&self) -> &[MatchResultRow] {
        self.table.rows()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.rows().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.rows().is_empty()
    }

    /// Mismatches caused by undefined correlations rather than a wrong identity
    #[must_use]
    pub fn undefined_count(&self) -> usize {
        self.rows()
            .iter()
            .filter(|r| r.verdict == MatchVerdict::Undefined)
            .count()
    }
}

impl fmt::Display for MismatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} of {} sample(s) do not match their declared identity:",
            self.len(),
            self.total
        )?;

        let headers = [
            self.table.index_name(),
            self.table.identity_column(),
            self.table.best_match_column(),
            self.table.match_column(),
        ];
        let cells: Vec<[String; 4]> = self
            .rows()
            .iter()
            .map(|r| {
                [
                    r.sample_id.clone(),
                    r.declared_identity.clone(),
                    r.best_match.clone().unwrap_or_else(|| "<undefined>".to_string()),
                    if r.is_match() { "True" } else { "False" }.to_string(),
                ]
            })
            .collect();

        let mut widths = headers.map(str::len);
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.len());
            }
        }

        write_row(f, &headers, &widths)?;
        for row in &cells {
            let row: Vec<&str> = row.iter().map(String::as_str).collect();
            write_row(f, &row, &widths)?;
        }
        Ok(())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[&str], widths: &[usize]) -> fmt::Result {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect();
    writeln!(f, "  {}", line.join("  ").trim_end())
}

/// Result of checking a match result table
#[derive(Debug, Clone, PartialEq)]
pub enum AuthenticationOutcome {
    /// Every sample matched its declared identity
    Pass { matched: usize },
    /// At least one sample did not
    Mismatch(MismatchReport),
}

impl AuthenticationOutcome {
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    /// Treat any mismatch as fatal.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::IdentityMismatch` carrying the full report.
    pub fn into_result(self) -> Result<usize, MatchError> {
        match self {
            Self::Pass { matched } => Ok(matched),
            Self::Mismatch(report) => Err(MatchError::IdentityMismatch(Box::new(report))),
        }
    }
}

/// Split `table` into matched and mismatched samples.
#[must_use]
pub fn check_for_mismatches(table: &MatchResultTable) -> AuthenticationOutcome {
    let mismatched: Vec<MatchResultRow> = table.mismatched().cloned().collect();
    let total = table.rows().len();

    if mismatched.is_empty() {
        info!(samples = total, "All samples match their declared identity");
        return AuthenticationOutcome::Pass { matched: total };
    }

    for row in &mismatched {
        warn!(
            sample = %row.sample_id,
            declared = %row.declared_identity,
            best_match = row.best_match.as_deref().unwrap_or(""),
            verdict = %row.verdict,
            "Declared identity not confirmed"
        );
    }

    AuthenticationOutcome::Mismatch(MismatchReport {
        table: table.with_rows(mismatched),
        total,
    })
}
