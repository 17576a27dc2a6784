//! PriceBar: one validated day of an equity's history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar after validation.
///
/// Every price is finite; `volume` is a whole share count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Basic OHLC sanity check: high >= close >= low, prices positive.
    ///
    /// Not enforced by the validator (providers occasionally report bars that
    /// fail it); used by tests and by callers that want to flag odd rows.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Validated, date-ordered price history for one identifier.
///
/// Only the validator builds these, so `bars` is non-empty and dates are
/// strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRecord {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl TimeSeriesRecord {
    pub(crate) fn new(symbol: String, bars: Vec<PriceBar>) -> Self {
        debug_assert!(!bars.is_empty());
        debug_assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
        Self { symbol, bars }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// The last `n` bars (all of them when `n >= len`).
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close * 0.995,
            high: close * 1.015,
            low: close * 0.985,
            close,
            volume: 50_000,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar(2, 103.0).is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar(2, 103.0);
        bar.high = 97.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn tail_clamps_to_length() {
        let record = TimeSeriesRecord::new(
            "AAPL".into(),
            vec![sample_bar(2, 100.0), sample_bar(3, 101.0), sample_bar(4, 102.0)],
        );
        assert_eq!(record.tail(2).len(), 2);
        assert_eq!(record.tail(2)[0].close, 101.0);
        assert_eq!(record.tail(10).len(), 3);
        assert_eq!(record.first_date(), NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(record.last_date(), NaiveDate::from_ymd_opt(2024, 1, 4));
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar(2, 103.0);
        let json = serde_json::to_string(&bar).unwrap();
        let deser: PriceBar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
