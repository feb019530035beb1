//! Chart payload parsing: CSV text into typed rows.

use csv::{ReaderBuilder, Trim};
use tracing::{debug, trace};

use crate::core::Row;
use crate::error::{ChartError, ChartResult};

/// Parsed payload: header columns plus rows in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Row>,
    skipped_records: usize,
}

impl DataTable {
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|name| name == column)
    }

    /// Records dropped because the lexer rejected them.
    #[must_use]
    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }
}

/// Parses CSV payload text with a header row.
///
/// Records the lexer rejects are skipped; a missing or unreadable header is a
/// `Decode` error for the whole entry.
pub fn parse_rows(entry: &str, text: &str) -> ChartResult<DataTable> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| ChartError::Decode {
            entry: entry.to_owned(),
            reason: format!("unreadable header: {e}"),
        })?
        .iter()
        .map(str::to_owned)
        .collect();

    let mut table = DataTable {
        columns,
        rows: Vec::new(),
        skipped_records: 0,
    };
    for (index, record) in reader.records().enumerate() {
        match record {
            Ok(record) => {
                let row = Row::from_raw(table.columns.iter().zip(record.iter()));
                table.rows.push(row);
            }
            Err(err) => {
                trace!(entry, record = index, error = %err, "skipping malformed record");
                table.skipped_records += 1;
            }
        }
    }

    debug!(
        entry,
        columns = table.columns.len(),
        rows = table.rows.len(),
        skipped = table.skipped_records,
        "parsed payload"
    );
    Ok(table)
}
