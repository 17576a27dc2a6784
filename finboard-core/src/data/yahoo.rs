//! Live daily prices from Yahoo Finance's v8 chart endpoint.
//!
//! Transient failures (rate limiting, 5xx, connect and timeout errors) are
//! retried with exponential backoff; everything else fails fast. There is no
//! official API behind this endpoint, so a shape change surfaces as
//! [`DataError::ResponseFormatChanged`] and the pipeline falls back to
//! synthetic data.

use super::provider::{DataError, DataProvider, DataSource, RawBar, RawSeries, RawValue};
use crate::config::ProviderConfig;
use chrono::{DateTime, NaiveDate};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const CHART_ENDPOINT: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) finboard/0.1";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct Envelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartSeries>>,
    error: Option<ChartFault>,
}

#[derive(Debug, Deserialize)]
struct ChartFault {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartSeries {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteColumns>,
}

/// Column-oriented OHLCV; `null` entries are kept as `None`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteColumns {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

impl QuoteColumns {
    /// The five cells of row `i`, or `None` when every one is null.
    fn row(&self, i: usize) -> Option<[Option<f64>; 5]> {
        let cell = |col: &[Option<f64>]| col.get(i).copied().flatten();
        let cells = [
            cell(&self.open),
            cell(&self.high),
            cell(&self.low),
            cell(&self.close),
            cell(&self.volume),
        ];
        cells.iter().any(Option::is_some).then_some(cells)
    }
}

/// What one HTTP attempt produced.
enum Attempt {
    Done(Result<RawSeries, DataError>),
    Retry(DataError),
}

/// Yahoo Finance provider over a blocking HTTP client.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    max_retries: u32,
    backoff: Duration,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(500),
        })
    }

    /// Chart URL covering `start` through the whole of `end` (UTC days).
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let epoch = |d: NaiveDate| {
            d.and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp())
                .unwrap_or_default()
        };
        let period1 = epoch(start);
        let period2 = epoch(end.succ_opt().unwrap_or(end));
        format!("{CHART_ENDPOINT}/{symbol}?period1={period1}&period2={period2}&interval=1d")
    }

    /// Turn a decoded chart payload into raw rows.
    ///
    /// Rows where every cell is null (market holidays) are skipped; partial
    /// nulls become [`RawValue::Missing`] for the validator to judge.
    fn to_series(symbol: &str, envelope: Envelope) -> Result<RawSeries, DataError> {
        let Chart { result, error } = envelope.chart;
        let Some(series) = result.and_then(|r| r.into_iter().next()) else {
            return Err(match error {
                Some(fault) if fault.code == "Not Found" => DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                },
                Some(fault) => DataError::ResponseFormatChanged(format!(
                    "{}: {}",
                    fault.code, fault.description
                )),
                None => DataError::ResponseFormatChanged("chart has no result".into()),
            });
        };

        let quote = series
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("chart has no quote block".into()))?;

        // No trades in the window: timestamps are omitted entirely.
        let timestamps = series.timestamp.unwrap_or_default();

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let Some([open, high, low, close, volume]) = quote.row(i) else {
                continue;
            };
            let date = DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| DataError::ResponseFormatChanged(format!("bad timestamp {ts}")))?;
            bars.push(RawBar {
                date: Some(date),
                open: RawValue::from(open),
                high: RawValue::from(high),
                low: RawValue::from(low),
                close: RawValue::from(close),
                volume: RawValue::from(volume),
            });
        }

        Ok(RawSeries {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::YahooFinance,
        })
    }

    fn attempt(&self, symbol: &str, url: &str) -> Attempt {
        let resp = match self.client.get(url).send() {
            Ok(resp) => resp,
            Err(e) if e.is_connect() || e.is_timeout() => {
                return Attempt::Retry(DataError::NetworkUnreachable(e.to_string()))
            }
            Err(e) => return Attempt::Done(Err(DataError::NetworkUnreachable(e.to_string()))),
        };

        match resp.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                warn!(symbol, retry_after_secs, "chart request rate limited");
                Attempt::Retry(DataError::RateLimited { retry_after_secs })
            }
            StatusCode::NOT_FOUND => Attempt::Done(Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })),
            status if status.is_server_error() => {
                Attempt::Retry(DataError::Other(format!("HTTP {status} for {symbol}")))
            }
            status if !status.is_success() => {
                Attempt::Done(Err(DataError::Other(format!("HTTP {status} for {symbol}"))))
            }
            _ => Attempt::Done(
                resp.json::<Envelope>()
                    .map_err(|e| {
                        DataError::ResponseFormatChanged(format!("undecodable chart body: {e}"))
                    })
                    .and_then(|envelope| Self::to_series(symbol, envelope)),
            ),
        }
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawSeries, DataError> {
        let url = Self::chart_url(symbol, start, end);
        let mut delay = self.backoff;
        let mut attempt_no = 0;
        loop {
            match self.attempt(symbol, &url) {
                Attempt::Done(result) => return result,
                Attempt::Retry(err) if attempt_no >= self.max_retries => return Err(err),
                Attempt::Retry(err) => {
                    attempt_no += 1;
                    debug!(symbol, attempt_no, ?delay, error = %err, "retrying chart request");
                    std::thread::sleep(delay);
                    delay *= 2;
                }
            }
        }
    }

    fn is_available(&self) -> bool {
        true
    }
}
