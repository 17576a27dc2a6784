//! Parsing and inspection of user-uploaded CSV files.

use super::provider::{DataError, FetchOutcome, RawTable, RawValue};
use serde::Serialize;
use tracing::{debug, warn};

/// Text cells read as missing, compared case-insensitively.
const NA_MARKERS: [&str; 5] = ["na", "n/a", "nan", "null", "none"];

/// Missing cells in one column of an uploaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub count: usize,
}

/// The uploaded file as read, before validation: a preview of its first
/// rows and the missing cells per column.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReport {
    pub headers: Vec<String>,
    pub preview: Vec<Vec<RawValue>>,
    /// One entry per header, in header order.
    pub missing: Vec<MissingCount>,
}

impl UploadReport {
    pub fn has_missing(&self) -> bool {
        self.missing.iter().any(|m| m.count > 0)
    }
}

/// Parse an uploaded byte stream into a raw table.
///
/// Anything that is not a rectangular, comma-separated table with a header
/// row (bad UTF-8, ragged rows, a single column, no data rows) is reported as
/// [`FetchOutcome::ParseFailure`]; the parser's error never escapes.
pub fn read_upload(bytes: &[u8]) -> FetchOutcome<RawTable> {
    match parse_table(bytes) {
        Ok(table) => {
            debug!(
                columns = table.headers.len(),
                rows = table.rows.len(),
                "parsed uploaded file"
            );
            FetchOutcome::Ok(table)
        }
        Err(e) => {
            warn!(error = %e, "uploaded file rejected");
            FetchOutcome::ParseFailure {
                reason: e.to_string(),
            }
        }
    }
}

/// Count missing cells per column. Blank cells, NaN and the usual NA
/// spellings are missing.
pub fn missing_counts(table: &RawTable) -> Vec<MissingCount> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(i, column)| MissingCount {
            column: column.clone(),
            count: table
                .rows
                .iter()
                .filter(|row| row.get(i).map_or(true, is_missing))
                .count(),
        })
        .collect()
}

fn is_missing(value: &RawValue) -> bool {
    match value {
        RawValue::Missing => true,
        RawValue::Number(n) => n.is_nan(),
        RawValue::Text(s) => {
            let s = s.trim();
            NA_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m))
        }
    }
}

/// Preview and missing-cell report for a parsed upload.
pub fn inspect_upload(table: &RawTable, preview_rows: usize) -> UploadReport {
    let report = UploadReport {
        headers: table.headers.clone(),
        preview: table.rows.iter().take(preview_rows).cloned().collect(),
        missing: missing_counts(table),
    };
    debug!(
        columns = report.headers.len(),
        with_gaps = report.missing.iter().filter(|m| m.count > 0).count(),
        "inspected uploaded file"
    );
    report
}

fn parse_table(bytes: &[u8]) -> Result<RawTable, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.len() < 2 {
        return Err(DataError::MalformedCsv(format!(
            "expected a comma-separated table, found {} column(s)",
            headers.len()
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(RawValue::from).collect());
    }

    if rows.is_empty() {
        return Err(DataError::MalformedCsv("file has no data rows".into()));
    }

    Ok(RawTable { headers, rows })
}
