//! Centralized validation and helper functions.

/// Maximum number of genes (rows) accepted from a single matrix file
pub const MAX_GENES: usize = 1_000_000;

/// Maximum number of samples (columns) accepted from a single matrix file
pub const MAX_SAMPLES: usize = 100_000;

/// Maximum number of row or column metadata fields in a GCT header
pub const MAX_METADATA_FIELDS: usize = 10_000;

/// Maximum number of expression values (genes x samples) in a single matrix file
pub const MAX_CELLS: usize = 200_000_000;

/// Maximum length of an experiment id, leaving room for the artifact suffix
pub const MAX_EXPERIMENT_ID_LENGTH: usize = 200;

/// Check a declared or observed row/column count against its limit.
///
/// Returns an error message if `count` exceeds `max`, None if it is acceptable.
#[must_use]
pub fn check_dimension_limit(what: &str, count: usize, max: usize) -> Option<String> {
    if count > max {
        Some(format!("Too many {what}: {count} exceeds maximum of {max}"))
    } else {
        None
    }
}

/// Check the cell count `rows * cols` against [`MAX_CELLS`].
///
/// Returns an error message if the product overflows or exceeds the limit.
#[must_use]
pub fn check_cell_limit(rows: usize, cols: usize) -> Option<String> {
    match rows.checked_mul(cols) {
        Some(cells) if cells <= MAX_CELLS => None,
        _ => Some(format!(
            "Too many values: {rows} x {cols} exceeds maximum of {MAX_CELLS}"
        )),
    }
}

/// Experiment id validation errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Empty experiment id")]
    EmptyExperimentId,
    #[error("Experiment id too long: exceeds {MAX_EXPERIMENT_ID_LENGTH} characters")]
    ExperimentIdTooLong,
    #[error("Invalid experiment id '{0}': contains path separators or control characters")]
    InvalidExperimentId(String),
}

/// Validate an experiment id for use as an output file-name prefix.
///
/// The id is used verbatim, so unlike an upload filename it is rejected rather
/// than sanitized:
/// - must not be empty or whitespace
/// - must not exceed the length limit
/// - must not contain `/`, `\`, `..`, NUL or other control characters
///
/// # Errors
///
/// Returns `ValidationError::EmptyExperimentId`, `ValidationError::ExperimentIdTooLong`,
/// or `ValidationError::InvalidExperimentId`.
pub fn validate_experiment_id(id: &str) -> Result<&str, ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::EmptyExperimentId);
    }

    if id.len() > MAX_EXPERIMENT_ID_LENGTH {
        return Err(ValidationError::ExperimentIdTooLong);
    }

    if id.contains("..") || id.contains('/') || id.contains('\\') {
        return Err(ValidationError::InvalidExperimentId(id.to_string()));
    }

    if id.chars().any(char::is_control) {
        return Err(ValidationError::InvalidExperimentId(id.escape_default().to_string()));
    }

    Ok(id)
}
