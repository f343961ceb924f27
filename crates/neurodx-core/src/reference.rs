//! Reference table loading.
//!
//! The table is a CSV file with a header row. Columns are expected to match
//! the biomarker fields plus a label column, but the schema is not enforced:
//! records keep whatever columns the header names, in file order.

use std::path::Path;

use tracing::debug;

use crate::error::{DiagnoseError, DiagnoseResult};

/// One row of the reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    fields: Vec<(String, String)>,
}

impl ReferenceRecord {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Column values in header order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Read and parse the reference table at `path`.
pub async fn load_reference_data(path: &Path) -> DiagnoseResult<Vec<ReferenceRecord>> {
    let path_str = path.display().to_string();
    debug!(path = %path_str, "loading reference data");

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DiagnoseError::data_unavailable(&path_str, e.to_string()))?;

    parse_reference_data(&bytes)
        .map_err(|reason| DiagnoseError::data_unavailable(path_str, reason))
}

/// Parse CSV bytes into records. Blank lines are skipped; a row whose field
/// count differs from the header is an error, as is a table with no rows.
pub fn parse_reference_data(bytes: &[u8]) -> Result<Vec<ReferenceRecord>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| format!("invalid header row: {}", e))?
        .clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| format!("invalid record: {}", e))?;
        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        records.push(ReferenceRecord::new(fields));
    }

    if records.is_empty() {
        return Err("reference table has no records".to_string());
    }

    debug!(records = records.len(), columns = headers.len(), "parsed reference data");
    Ok(records)
}
