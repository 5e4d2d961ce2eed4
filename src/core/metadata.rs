use std::collections::HashMap;

use crate::core::table::TableError;

/// Tabular annotations keyed by identifier (sample or gene).
///
/// Column order and row order are preserved exactly as loaded, because the
/// match report echoes them back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMetadata {
    index_name: String,
    columns: Vec<String>,
    ids: Vec<String>,
    rows: Vec<Vec<String>>,
    id_to_row: HashMap<String, usize>,
}

impl SampleMetadata {
    #[must_use]
    pub fn new(index_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            index_name: index_name.into(),
            columns,
            ids: Vec::new(),
            rows: Vec::new(),
            id_to_row: HashMap::new(),
        }
    }

    /// Append a row.
    ///
    /// # Errors
    ///
    /// Returns `TableError::DuplicateId` if `id` was already added, or
    /// `TableError::RowLength` if `values` does not have one entry per column.
    pub fn push_row(&mut self, id: impl Into<String>, values: Vec<String>) -> Result<(), TableError> {
        let id = id.into();
        if values.len() != self.columns.len() {
            return Err(TableError::RowLength {
                id,
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        if self.id_to_row.contains_key(&id) {
            return Err(TableError::DuplicateId { axis: "metadata", id });
        }
        self.id_to_row.insert(id.clone(), self.rows.len());
        self.ids.push(id);
        self.rows.push(values);
        Ok(())
    }

    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of the row for `id`, in column order
    #[must_use]
    pub fn row(&self, id: &str) -> Option<&[String]> {
        self.id_to_row.get(id).map(|&i| self.rows[i].as_slice())
    }

    /// Iterate rows as `(id, values)` in load order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.ids
            .iter()
            .map(String::as_str)
            .zip(self.rows.iter().map(Vec::as_slice))
    }

    /// Values of one column, in row order.
    ///
    /// # Errors
    ///
    /// Returns `TableError::MissingColumn` if no column has that name.
    pub fn column_values(&self, name: &str) -> Result<Vec<String>, TableError> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| row[idx].clone()).collect())
    }

    fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn {
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }
}

/// Declared identity of each query sample, alongside its pass-through metadata.
#[derive(Debug, Clone)]
pub struct IdentityMetadata {
    metadata: SampleMetadata,
    identity_column: usize,
}

impl IdentityMetadata {
    /// Use `identity_column` of `metadata` as the declared identity.
    ///
    /// # Errors
    ///
    /// Returns `TableError::MissingColumn` if the column does not exist.
    pub fn new(metadata: SampleMetadata, identity_column: &str) -> Result<Self, TableError> {
        let identity_column = metadata.require_column(identity_column)?;
        Ok(Self {
            metadata,
            identity_column,
        })
    }

    #[must_use]
    pub fn metadata(&self) -> &SampleMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn identity_column(&self) -> &str {
        &self.metadata.columns[self.identity_column]
    }

    /// Declared identity for a sample
    #[must_use]
    pub fn declared(&self, sample_id: &str) -> Option<&str> {
        self.metadata
            .row(sample_id)
            .map(|row| row[self.identity_column].as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    fn sample_metadata() -> SampleMetadata {
        let mut metadata = SampleMetadata::new("cid", strings(&["a", "DepMap_ID"]));
        metadata.push_row("S1", strings(&["1234", "ACH-000001"])).unwrap();
        metadata.push_row("S2", strings(&["5678", "ACH-000002"])).unwrap();
        metadata
    }

    #[test]
    fn test_push_and_lookup() {
        let metadata = sample_metadata();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.row("S2").unwrap()[0], "5678");
        assert!(metadata.row("S3").is_none());
        assert_eq!(metadata.column_values("a").unwrap(), strings(&["1234", "5678"]));
    }

    #[test]
    fn test_push_rejects_duplicate() {
        let mut metadata = sample_metadata();
        let err = metadata.push_row("S1", strings(&["0", "x"])).unwrap_err();
        assert!(matches!(err, TableError::DuplicateId { .. }));
    }

    #[test]
    fn test_push_rejects_short_row() {
        let mut metadata = sample_metadata();
        let err = metadata.push_row("S3", strings(&["0"])).unwrap_err();
        assert!(matches!(err, TableError::RowLength { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_identity_metadata() {
        let identity = IdentityMetadata::new(sample_metadata(), "DepMap_ID").unwrap();
        assert_eq!(identity.identity_column(), "DepMap_ID");
        assert_eq!(identity.declared("S1"), Some("ACH-000001"));
        assert_eq!(identity.declared("missing"), None);
    }

    #[test]
    fn test_identity_metadata_missing_column() {
        let err = IdentityMetadata::new(sample_metadata(), "cell_line").unwrap_err();
        assert!(err.to_string().contains("cell_line"));
        assert!(err.to_string().contains("DepMap_ID"));
    }
}
