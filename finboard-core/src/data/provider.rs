//! Data provider trait, raw (pre-validation) shapes and error types.
//!
//! The DataProvider trait abstracts over equity sources (Yahoo Finance, the
//! offline stub, test mocks) so the pipeline can swap them freely.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A cell as delivered by a source, before numeric coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Missing,
}

impl RawValue {
    /// Coerce to a finite number. Unparseable text, NaN and infinities
    /// count as missing.
    pub fn to_f64(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(v) => *v,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Missing => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<Option<f64>> for RawValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawValue::Missing, RawValue::Number)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            RawValue::Missing
        } else {
            RawValue::Text(value.to_string())
        }
    }
}

/// Raw daily OHLCV row from a provider or a parsed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: Option<NaiveDate>,
    pub open: RawValue,
    pub high: RawValue,
    pub low: RawValue,
    pub close: RawValue,
    pub volume: RawValue,
}

impl RawBar {
    /// A fully numeric row.
    pub fn numeric(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            date: Some(date),
            open: RawValue::Number(open),
            high: RawValue::Number(high),
            low: RawValue::Number(low),
            close: RawValue::Number(close),
            volume: RawValue::Number(volume as f64),
        }
    }
}

/// Raw price history for one identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    pub symbol: String,
    pub bars: Vec<RawBar>,
    pub source: DataSource,
}

/// Raw tabular data: header row plus uncoerced cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    /// Index of a column by case-insensitive header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }
}

/// Why a provider could not deliver a series.
///
/// The `Display` text ends up in fallback notices.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider is offline")]
    Offline,

    #[error("malformed CSV: {0}")]
    MalformedCsv(String),

    #[error("data error: {0}")]
    Other(String),
}

impl From<csv::Error> for DataError {
    fn from(e: csv::Error) -> Self {
        DataError::MalformedCsv(e.to_string())
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    Upload,
    CsvImport,
    Synthetic,
}

/// Outcome of an acquisition attempt.
///
/// Callers branch on the tag; none of the failure variants is an error in
/// the `Result` sense because each has a defined recovery.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Ok(T),
    /// Source unreachable, empty or malformed response.
    Unavailable { reason: String },
    /// User-supplied content is not usable tabular data.
    ParseFailure { reason: String },
}

impl<T> FetchOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, FetchOutcome::Ok(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            FetchOutcome::Ok(v) => Some(v),
            _ => None,
        }
    }
}

/// Trait for equity data providers.
///
/// Implementations handle the specifics of fetching data from a particular
/// source. They report failures through [`DataError`]; folding those into a
/// [`FetchOutcome`] is the caller's job.
pub trait DataProvider {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV rows for a symbol over a date range.
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawSeries, DataError>;

    /// Check if the provider can be asked at all.
    fn is_available(&self) -> bool;
}

/// Provider used when network access is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineProvider;

impl DataProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    fn fetch(
        &self,
        _symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<RawSeries, DataError> {
        Err(DataError::Offline)
    }

    fn is_available(&self) -> bool {
        false
    }
}
