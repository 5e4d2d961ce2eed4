use std::path::Path;

use csv::{Position, ReaderBuilder, StringRecord};
use ndarray::Array2;

use crate::core::metadata::SampleMetadata;
use crate::matching::correlation::CorrelationMatrix;
use crate::parsing::gct::ParseError;
use crate::utils::validation::{check_dimension_limit, MAX_SAMPLES};

/// Parse a correlation matrix previously written as tab-separated text.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_correlation_file(path: &Path) -> Result<CorrelationMatrix, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_correlation_text(&content)
}

/// Parse correlation matrix text.
///
/// The header row holds an (ignored, usually empty) index label followed by
/// reference sample ids. Each following row is a query sample id and one value
/// per reference. Empty or `nan` cells are undefined correlations.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the header is missing, a row has the
/// wrong number of fields, or a value is not numeric; `ParseError::Table` for
/// duplicate ids or out-of-range values.
pub fn parse_correlation_text(text: &str) -> Result<CorrelationMatrix, ParseError> {
    let mut records = read_records(text, b'\t', None);

    let (_, header) = records
        .next()
        .transpose()?
        .ok_or_else(|| ParseError::InvalidFormat("Empty correlation file".to_string()))?;
    let reference_ids: Vec<String> = header.iter().skip(1).map(str::to_string).collect();
    if reference_ids.is_empty() {
        return Err(ParseError::InvalidFormat(
            "Correlation header has no reference columns".to_string(),
        ));
    }
    if let Some(msg) = check_dimension_limit("reference samples", reference_ids.len(), MAX_SAMPLES)
    {
        return Err(ParseError::TooLarge(msg));
    }

    let mut query_ids = Vec::new();
    let mut values = Vec::new();
    for record in records {
        let (line_num, record) = record?;
        let mut fields = record.iter();
        let id = fields.next().unwrap_or_default();
        let row: Vec<f64> = fields
            .map(|f| parse_correlation(f, line_num))
            .collect::<Result<_, _>>()?;
        if row.len() != reference_ids.len() {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has {} values, expected {}",
                row.len(),
                reference_ids.len()
            )));
        }
        if let Some(msg) = check_dimension_limit("query samples", query_ids.len() + 1, MAX_SAMPLES)
        {
            return Err(ParseError::TooLarge(msg));
        }
        query_ids.push(id.to_string());
        values.extend(row);
    }

    let values = Array2::from_shape_vec((query_ids.len(), reference_ids.len()), values)
        .map_err(|e| ParseError::InvalidFormat(e.to_string()))?;
    Ok(CorrelationMatrix::from_parts(query_ids, reference_ids, values)?)
}

/// Delimited records with their 1-based line numbers, skipping blank lines.
///
/// Quoted fields are unquoted, so values written with embedded delimiters,
/// quotes, or line breaks read back verbatim.
fn read_records(
    text: &str,
    delimiter: u8,
    comment: Option<u8>,
) -> impl Iterator<Item = Result<(usize, StringRecord), ParseError>> + '_ {
    ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .comment(comment)
        .from_reader(text.as_bytes())
        .into_records()
        .map(|record| {
            let record = record.map_err(|e| ParseError::InvalidFormat(e.to_string()))?;
            let line_num = record.position().map_or(0, Position::line);
            Ok((usize::try_from(line_num).unwrap_or(usize::MAX), record))
        })
        .filter(|record| {
            !matches!(record, Ok((_, r)) if r.iter().all(|field| field.trim().is_empty()))
        })
}

fn parse_correlation(field: &str, line_num: usize) -> Result<f64, ParseError> {
    let field = field.trim();
    if field.is_empty() || field.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    field.parse().map_err(|_| {
        ParseError::InvalidFormat(format!("Invalid correlation on line {line_num}: '{field}'"))
    })
}

/// Parse a sample metadata table: header row, then one row per sample with the
/// sample id in the first column.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_sample_metadata_file(
    path: &Path,
    delimiter: char,
) -> Result<SampleMetadata, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_sample_metadata_text(&content, delimiter)
}

/// Parse sample metadata text; quoted values are unquoted, others kept verbatim.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if there is no header or no rows,
/// or `ParseError::Table` for duplicate sample ids or ragged rows.
pub fn parse_sample_metadata_text(
    text: &str,
    delimiter: char,
) -> Result<SampleMetadata, ParseError> {
    let delimiter = u8::try_from(delimiter).map_err(|_| {
        ParseError::InvalidFormat(format!("Unsupported delimiter '{delimiter}'"))
    })?;
    let mut records = read_records(text, delimiter, Some(b'#'));

    let (_, header) = records
        .next()
        .transpose()?
        .ok_or_else(|| ParseError::InvalidFormat("Empty sample metadata file".to_string()))?;
    let mut columns: Vec<String> = header.iter().map(str::to_string).collect();
    let index_name = columns.remove(0);

    let mut metadata = SampleMetadata::new(index_name, columns);
    for record in records {
        let (_, record) = record?;
        let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
        let id = fields.remove(0);
        metadata.push_row(id, fields)?;
    }

    if metadata.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No samples found in metadata file".to_string(),
        ));
    }
    Ok(metadata)
}
