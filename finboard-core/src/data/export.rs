//! CSV export of validated datasets, and re-import of exported series.
//!
//! Export always works on the unrounded validated data. Floats are written
//! in their shortest round-trip form, so parsing an export and validating
//! it reproduces the record exactly.

use super::provider::{DataError, DataSource, RawBar, RawSeries, RawValue};
use crate::domain::{Period, TabularRecord, TimeSeriesRecord, TIPS_COLUMNS};
use chrono::NaiveDate;
use thiserror::Error;

/// Column header of an exported price series; the date index comes first.
pub const SERIES_HEADER: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV writer: {0}")]
    Flush(String),
}

/// Serialize a price series to UTF-8 CSV bytes, date first.
pub fn series_to_csv(record: &TimeSeriesRecord) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(SERIES_HEADER)?;
    for bar in record.bars() {
        wtr.write_record([
            bar.date.format("%Y-%m-%d").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    wtr.into_inner().map_err(|e| ExportError::Flush(e.to_string()))
}

/// Serialize a tips table to UTF-8 CSV bytes, without an index column.
pub fn table_to_csv(record: &TabularRecord) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(TIPS_COLUMNS)?;
    for row in record.rows() {
        wtr.write_record([
            row.total_bill.to_string(),
            row.tip.to_string(),
            row.size.to_string(),
            row.day.clone(),
            row.time.clone(),
        ])?;
    }
    wtr.into_inner().map_err(|e| ExportError::Flush(e.to_string()))
}

/// Parse a price-series CSV (as written by [`series_to_csv`]) into raw rows.
///
/// Columns are located by name, case-insensitively. Dates may carry a time
/// suffix (`2024-01-02 00:00:00`); only the day is kept. Cells are left
/// uncoerced for the validator.
pub fn parse_series_csv(symbol: &str, bytes: &[u8]) -> Result<RawSeries, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let mut idx = [0usize; 6];
    for (slot, name) in idx.iter_mut().zip(SERIES_HEADER) {
        *slot = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| DataError::MalformedCsv(format!("missing column '{name}'")))?;
    }
    let [date_i, open_i, high_i, low_i, close_i, volume_i] = idx;

    let mut bars = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |i: usize| RawValue::from(record.get(i).unwrap_or(""));
        bars.push(RawBar {
            date: record.get(date_i).and_then(parse_date),
            open: cell(open_i),
            high: cell(high_i),
            low: cell(low_i),
            close: cell(close_i),
            volume: cell(volume_i),
        });
    }

    Ok(RawSeries {
        symbol: symbol.to_string(),
        bars,
        source: DataSource::CsvImport,
    })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok()
}

/// Download file name for an exported series, e.g. `aapl_data_1y.csv`.
pub fn series_file_name(ticker: &str, period: Period) -> String {
    format!("{}_data_{}.csv", ticker.to_lowercase(), period.token())
}

/// Download file name for the tips table.
pub fn table_file_name() -> &'static str {
    "tips_data.csv"
}
