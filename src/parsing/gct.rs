//! Parser for GCT expression matrices.
//!
//! Supports the two text versions:
//!
//! ```text
//! #1.2
//! <rows>  <cols>
//! Name    Description  <cid>...
//! <rid>   <desc>       <value>...
//!
//! #1.3
//! <rows>  <cols>  <row meta count>  <col meta count>
//! id      <row meta names>...  <cid>...
//! <col meta name>  <filler>...  <col meta values>...   (x col meta count)
//! <rid>   <row meta values>...  <value>...
//! ```
//!
//! Files ending in `.gz` or `.bgz` are decompressed on the fly.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use ndarray::Array2;
use thiserror::Error;
use tracing::debug;

use crate::core::metadata::SampleMetadata;
use crate::core::table::{ExpressionTable, TableError};
use crate::utils::validation::{
    check_cell_limit, check_dimension_limit, MAX_GENES, MAX_METADATA_FIELDS, MAX_SAMPLES,
};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("{0}")]
    TooLarge(String),
}

/// Index name given to row metadata (genes)
pub const ROW_INDEX_NAME: &str = "rid";

/// Index name given to column metadata (samples)
pub const COL_INDEX_NAME: &str = "cid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GctVersion {
    V1_2,
    V1_3,
}

/// Contents of a GCT file
#[derive(Debug, Clone)]
pub struct GctData {
    pub version: GctVersion,

    /// Expression values, genes keyed by row id
    pub table: ExpressionTable,

    /// Row (gene) annotations keyed by row id
    pub row_metadata: SampleMetadata,

    /// Column (sample) annotations keyed by column id
    pub col_metadata: SampleMetadata,
}

impl GctData {
    /// The expression table with genes keyed by a row-metadata column.
    ///
    /// `"rid"` keeps the row ids.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Table` if the column does not exist or its values
    /// are not unique.
    pub fn keyed_by(self, row_metadata_column: &str) -> Result<ExpressionTable, ParseError> {
        if row_metadata_column == ROW_INDEX_NAME {
            return Ok(self.table);
        }
        let keys = self.row_metadata.column_values(row_metadata_column)?;
        Ok(self.table.rekey_genes(keys)?)
    }
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Parse a GCT file, optionally gzip compressed
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::InvalidFormat`
/// for malformed content, `ParseError::Table` for duplicate ids or missing values,
/// or `ParseError::TooLarge` if the declared dimensions exceed the limits.
pub fn parse_gct_file(path: &Path) -> Result<GctData, ParseError> {
    let file = File::open(path)?;
    let data = if is_gzipped(path) {
        parse_gct_reader(BufReader::new(MultiGzDecoder::new(file)))?
    } else {
        parse_gct_reader(BufReader::new(file))?
    };

    debug!(
        path = %path.display(),
        genes = data.table.n_genes(),
        samples = data.table.n_samples(),
        "Loaded expression matrix"
    );
    Ok(data)
}

/// Parse GCT content from a string
///
/// # Errors
///
/// See [`parse_gct_file`].
pub fn parse_gct_text(text: &str) -> Result<GctData, ParseError> {
    parse_gct_reader(text.as_bytes())
}

/// Parse GCT content from any buffered reader
///
/// # Errors
///
/// See [`parse_gct_file`].
pub fn parse_gct_reader<R: BufRead>(reader: R) -> Result<GctData, ParseError> {
    let mut lines = reader.lines().enumerate();
    let mut next_line = |what: &str| -> Result<(usize, String), ParseError> {
        match lines.next() {
            // Line numbers in errors are 1-based for user friendliness
            Some((i, line)) => Ok((i + 1, line?.trim_end_matches('\r').to_string())),
            None => Err(ParseError::InvalidFormat(format!(
                "Unexpected end of file, expected {what}"
            ))),
        }
    };

    let (_, version_line) = next_line("version line")?;
    let version = match version_line.trim() {
        "#1.2" => GctVersion::V1_2,
        "#1.3" => GctVersion::V1_3,
        other => {
            return Err(ParseError::InvalidFormat(format!(
                "Unsupported GCT version line '{other}'"
            )))
        }
    };

    let (line_num, dims_line) = next_line("dimensions line")?;
    let dims = parse_dimensions(&dims_line, line_num)?;
    let (n_rows, n_cols, n_row_meta, n_col_meta) = match (version, dims.as_slice()) {
        (GctVersion::V1_2, [rows, cols]) => (*rows, *cols, 1, 0),
        (GctVersion::V1_3, [rows, cols, row_meta, col_meta]) => {
            (*rows, *cols, *row_meta, *col_meta)
        }
        _ => {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num}: wrong number of dimensions for {version:?}"
            )))
        }
    };

    // Declared counts are bounded before they size any buffer or index
    if let Some(msg) = check_dimension_limit("genes", n_rows, MAX_GENES)
        .or_else(|| check_dimension_limit("samples", n_cols, MAX_SAMPLES))
        .or_else(|| {
            check_dimension_limit("row metadata fields", n_row_meta, MAX_METADATA_FIELDS)
        })
        .or_else(|| {
            check_dimension_limit("column metadata fields", n_col_meta, MAX_METADATA_FIELDS)
        })
        .or_else(|| check_cell_limit(n_rows, n_cols))
    {
        return Err(ParseError::TooLarge(msg));
    }

    let n_fields = 1 + n_row_meta + n_cols;

    let (line_num, header_line) = next_line("header line")?;
    let header = split_fields(&header_line, n_fields, line_num)?;
    let row_meta_names: Vec<String> = header[1..=n_row_meta].to_vec();
    let col_ids: Vec<String> = header[1 + n_row_meta..].to_vec();

    // Buffers grow with the lines actually read, not with the declared counts
    let mut col_meta_names = Vec::new();
    let mut col_meta_values: Vec<Vec<String>> = vec![Vec::new(); col_ids.len()];
    for _ in 0..n_col_meta {
        let (line_num, line) = next_line("column metadata line")?;
        let fields = split_fields(&line, n_fields, line_num)?;
        col_meta_names.push(fields[0].clone());
        for (j, value) in fields[1 + n_row_meta..].iter().enumerate() {
            col_meta_values[j].push(value.clone());
        }
    }

    let mut row_metadata = SampleMetadata::new(ROW_INDEX_NAME, row_meta_names);
    let mut genes = Vec::new();
    let mut values = Vec::new();
    for _ in 0..n_rows {
        let (line_num, line) = next_line("data line")?;
        let mut fields = split_fields(&line, n_fields, line_num)?;
        for field in &fields[1 + n_row_meta..] {
            values.push(parse_value(field, line_num)?);
        }
        fields.truncate(1 + n_row_meta);
        let rid = fields.remove(0);
        row_metadata.push_row(rid.clone(), fields)?;
        genes.push(rid);
    }

    for (i, line) in lines {
        if !line?.trim().is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "Line {}: more data lines than the declared {n_rows}",
                i + 1
            )));
        }
    }

    let mut col_metadata = SampleMetadata::new(COL_INDEX_NAME, col_meta_names);
    for (cid, meta) in col_ids.iter().zip(col_meta_values) {
        col_metadata.push_row(cid.clone(), meta)?;
    }

    let values = Array2::from_shape_vec((n_rows, n_cols), values)
        .map_err(|e| ParseError::InvalidFormat(e.to_string()))?;
    let table = ExpressionTable::new(genes, col_ids, values)?;

    Ok(GctData {
        version,
        table,
        row_metadata,
        col_metadata,
    })
}

fn parse_dimensions(line: &str, line_num: usize) -> Result<Vec<usize>, ParseError> {
    line.split('\t')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| {
                ParseError::InvalidFormat(format!("Line {line_num}: invalid dimension '{s}'"))
            })
        })
        .collect()
}

fn split_fields(line: &str, expected: usize, line_num: usize) -> Result<Vec<String>, ParseError> {
    let fields: Vec<String> = line.split('\t').map(str::to_string).collect();
    if fields.len() != expected {
        return Err(ParseError::InvalidFormat(format!(
            "Line {line_num} has {} fields, expected {expected}",
            fields.len()
        )));
    }
    Ok(fields)
}

/// Parse an expression value. Missing-value markers become `NaN` so the
/// table constructor can report which gene and sample they belong to.
fn parse_value(field: &str, line_num: usize) -> Result<f64, ParseError> {
    let field = field.trim();
    if field.is_empty() || field.eq_ignore_ascii_case("na") || field.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    field.parse().map_err(|_| {
        ParseError::InvalidFormat(format!("Line {line_num}: invalid value '{field}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GCT_1_3: &str = "#1.3
3\t2\t1\t2
id\tgene_symbol\tS1\tS2
DepMap_ID\t-666\tACH-000001\tACH-000002
cell_line\t-666\tA549\tHELA
ENSG01\tTP53\t1.5\t2.0
ENSG02\tMYC\t3.25\t-1.0
ENSG03\tKRAS\t0\t4e-2
";

    #[test]
    fn test_parse_gct_1_3() {
        let data = parse_gct_text(GCT_1_3).unwrap();
        assert_eq!(data.version, GctVersion::V1_3);
        assert_eq!(data.table.genes(), ["ENSG01", "ENSG02", "ENSG03"]);
        assert_eq!(data.table.samples(), ["S1", "S2"]);
        assert!((data.table.values()[[1, 0]] - 3.25).abs() < f64::EPSILON);
        assert!((data.table.values()[[2, 1]] - 0.04).abs() < f64::EPSILON);

        assert_eq!(data.row_metadata.index_name(), "rid");
        assert_eq!(data.row_metadata.row("ENSG02").unwrap(), ["MYC"]);

        assert_eq!(data.col_metadata.index_name(), "cid");
        assert_eq!(data.col_metadata.columns(), ["DepMap_ID", "cell_line"]);
        assert_eq!(data.col_metadata.row("S2").unwrap(), ["ACH-000002", "HELA"]);
    }

    #[test]
    fn test_parse_gct_1_2() {
        let gct = "#1.2\n2\t3\nName\tDescription\ta\tb\tc\ng1\tfirst\t1\t2\t3\ng2\tsecond\t4\t5\t6\n";
        let data = parse_gct_text(gct).unwrap();
        assert_eq!(data.version, GctVersion::V1_2);
        assert_eq!(data.table.n_genes(), 2);
        assert_eq!(data.table.n_samples(), 3);
        assert_eq!(data.row_metadata.columns(), ["Description"]);
        assert!(data.col_metadata.columns().is_empty());
        assert_eq!(data.col_metadata.ids(), ["a", "b", "c"]);
    }

    #[test]
    fn test_keyed_by_row_metadata() {
        let table = parse_gct_text(GCT_1_3).unwrap().keyed_by("gene_symbol").unwrap();
        assert_eq!(table.genes(), ["TP53", "MYC", "KRAS"]);

        let table = parse_gct_text(GCT_1_3).unwrap().keyed_by("rid").unwrap();
        assert_eq!(table.genes(), ["ENSG01", "ENSG02", "ENSG03"]);
    }

    #[test]
    fn test_keyed_by_missing_column() {
        let err = parse_gct_text(GCT_1_3).unwrap().keyed_by("symbol").unwrap_err();
        assert!(matches!(err, ParseError::Table(TableError::MissingColumn { .. })));
    }

    #[test]
    fn test_keyed_by_duplicate_symbols() {
        let gct = "#1.3\n2\t1\t1\t0\nid\tgene_symbol\tS1\ng1\tTP53\t1\ng2\tTP53\t2\n";
        let err = parse_gct_text(gct).unwrap().keyed_by("gene_symbol").unwrap_err();
        assert!(matches!(err, ParseError::Table(TableError::DuplicateId { .. })));
    }

    #[test]
    fn test_missing_value_rejected() {
        let gct = "#1.2\n1\t2\nName\tDescription\ta\tb\ng1\tx\t1\tNA\n";
        let err = parse_gct_text(gct).unwrap_err();
        assert!(err.to_string().contains("'g1'"));
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(parse_gct_text("#1.4\n1\t1\n").is_err());
        assert!(parse_gct_text("#1.2\n1\n").is_err());
        // Too few fields on data line
        assert!(parse_gct_text("#1.2\n1\t2\nName\tDescription\ta\tb\ng1\tx\t1\n").is_err());
        // Fewer rows than declared
        assert!(parse_gct_text("#1.2\n2\t1\nName\tDescription\ta\ng1\tx\t1\n").is_err());
        // More rows than declared
        assert!(parse_gct_text("#1.2\n1\t1\nName\tDescription\ta\ng1\tx\t1\ng2\tx\t2\n").is_err());
        // Non-numeric value
        assert!(parse_gct_text("#1.2\n1\t1\nName\tDescription\ta\ng1\tx\thigh\n").is_err());
        // Duplicate sample ids
        assert!(parse_gct_text("#1.2\n1\t2\nName\tDescription\ta\ta\ng1\tx\t1\t2\n").is_err());
    }

    #[test]
    fn test_too_large() {
        let gct = format!("#1.2\n{}\t1\n", MAX_GENES + 1);
        assert!(matches!(
            parse_gct_text(&gct),
            Err(ParseError::TooLarge(_))
        ));
    }

    #[test]
    fn test_oversized_metadata_counts() {
        // Column metadata count far beyond any allocation
        let gct = "#1.3\n1\t1\t0\t4611686018427387904\nid\tS1\n";
        assert!(matches!(parse_gct_text(gct), Err(ParseError::TooLarge(_))));

        // Row metadata count that would overflow the field count
        let gct = "#1.3\n1\t1\t18446744073709551615\t0\nid\tS1\n";
        assert!(matches!(parse_gct_text(gct), Err(ParseError::TooLarge(_))));

        let gct = format!("#1.3\n1\t1\t{}\t0\n", MAX_METADATA_FIELDS + 1);
        assert!(matches!(parse_gct_text(&gct), Err(ParseError::TooLarge(_))));
    }

    #[test]
    fn test_declared_cells_over_limit() {
        // Each dimension is within its own limit but the product is not
        let gct = format!(
            "#1.2\n{MAX_GENES}\t{MAX_SAMPLES}\nName\tDescription\tS1\n"
        );
        let err = parse_gct_text(&gct).unwrap_err();
        assert!(matches!(err, ParseError::TooLarge(_)));
        assert!(err.to_string().contains("Too many values"));
    }

    #[test]
    fn test_truncated_file_with_large_declared_counts() {
        // Declared counts within limits but few lines present: a format error, no big allocation
        let gct = "#1.3\n100000\t2\t1\t1000\nid\tgene_symbol\tS1\tS2\n";
        assert!(matches!(parse_gct_text(gct), Err(ParseError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_gzipped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("query.gct.gz");
        let mut encoder = flate2::write::GzEncoder::new(
            File::create(&path).unwrap(),
            flate2::Compression::default(),
        );
        encoder.write_all(GCT_1_3.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let data = parse_gct_file(&path).unwrap();
        assert_eq!(data.table.n_genes(), 3);
    }

    #[test]
    fn test_crlf_line_endings() {
        let gct = GCT_1_3.replace('\n', "\r\n");
        let data = parse_gct_text(&gct).unwrap();
        assert_eq!(data.table.samples(), ["S1", "S2"]);
    }
}
