//! Summary metrics and descriptive statistics.
//!
//! Every function here is pure: a validated record in, plain values out.
//! Records are borrowed, never modified.

use crate::domain::{PriceBar, TabularRecord, TimeSeriesRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Headline numbers for the equity page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    /// Last close.
    pub latest_value: f64,
    /// Close before the last one; equal to `latest_value` for a single row.
    pub previous_value: f64,
    pub absolute_change: f64,
    /// Change relative to `previous_value`, in percent.
    pub percent_change: f64,
    /// Highest High.
    pub max: f64,
    /// Lowest Low.
    pub min: f64,
    /// Mean close.
    pub mean: f64,
    pub count: usize,
}

/// Headline numbers for the tips page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TipsMetrics {
    pub count: usize,
    pub mean_total_bill: f64,
    pub mean_tip: f64,
    pub mean_size: f64,
}

/// One column of a descriptive-statistics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; undefined for fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// One histogram bucket, `[lower, upper)` except the last which is closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Bucket count used for the bill-amount histogram.
pub const BILL_HISTOGRAM_BINS: usize = 15;

/// Numeric column of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl SeriesColumn {
    pub const ALL: [SeriesColumn; 5] = [
        SeriesColumn::Open,
        SeriesColumn::High,
        SeriesColumn::Low,
        SeriesColumn::Close,
        SeriesColumn::Volume,
    ];

    /// Column header as it appears in exports.
    pub fn header(self) -> &'static str {
        match self {
            SeriesColumn::Open => "Open",
            SeriesColumn::High => "High",
            SeriesColumn::Low => "Low",
            SeriesColumn::Close => "Close",
            SeriesColumn::Volume => "Volume",
        }
    }

    pub fn value(self, bar: &PriceBar) -> f64 {
        match self {
            SeriesColumn::Open => bar.open,
            SeriesColumn::High => bar.high,
            SeriesColumn::Low => bar.low,
            SeriesColumn::Close => bar.close,
            SeriesColumn::Volume => bar.volume as f64,
        }
    }
}

impl fmt::Display for SeriesColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Headline metrics for a price series.
///
/// With a single row there is no previous close: the latest value stands in
/// for it, so both changes are exactly zero.
pub fn summarize(record: &TimeSeriesRecord) -> SummaryMetrics {
    let bars = record.bars();
    let (latest, previous) = match bars {
        [.., prev, last] => (last.close, prev.close),
        [only] => (only.close, only.close),
        [] => (0.0, 0.0),
    };

    let absolute_change = latest - previous;
    let percent_change = if previous != 0.0 {
        absolute_change / previous * 100.0
    } else {
        0.0
    };

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    SummaryMetrics {
        latest_value: latest,
        previous_value: previous,
        absolute_change,
        percent_change,
        max: bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
        min: bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
        mean: mean_f64(&closes),
        count: bars.len(),
    }
}

/// Descriptive statistics for the requested columns, in request order.
pub fn describe_series(record: &TimeSeriesRecord, columns: &[SeriesColumn]) -> Vec<ColumnStats> {
    columns
        .iter()
        .map(|&col| {
            let values: Vec<f64> = record.bars().iter().map(|b| col.value(b)).collect();
            describe(col.header(), &values)
        })
        .collect()
}

pub fn summarize_tips(record: &TabularRecord) -> TipsMetrics {
    let rows = record.rows();
    let bills: Vec<f64> = rows.iter().map(|r| r.total_bill).collect();
    let tips: Vec<f64> = rows.iter().map(|r| r.tip).collect();
    let sizes: Vec<f64> = rows.iter().map(|r| f64::from(r.size)).collect();
    TipsMetrics {
        count: rows.len(),
        mean_total_bill: mean_f64(&bills),
        mean_tip: mean_f64(&tips),
        mean_size: mean_f64(&sizes),
    }
}

/// Statistics for the numeric tips columns: total_bill, tip, size.
pub fn describe_tips(record: &TabularRecord) -> Vec<ColumnStats> {
    let rows = record.rows();
    let bills: Vec<f64> = rows.iter().map(|r| r.total_bill).collect();
    let tips: Vec<f64> = rows.iter().map(|r| r.tip).collect();
    let sizes: Vec<f64> = rows.iter().map(|r| f64::from(r.size)).collect();
    vec![
        describe("total_bill", &bills),
        describe("tip", &tips),
        describe("size", &sizes),
    ]
}

/// Distribution of bill amounts across [`BILL_HISTOGRAM_BINS`] buckets.
pub fn bill_histogram(record: &TabularRecord) -> Vec<HistogramBin> {
    let bills: Vec<f64> = record.rows().iter().map(|r| r.total_bill).collect();
    histogram(&bills, BILL_HISTOGRAM_BINS)
}

/// Equal-width histogram over the value range.
///
/// A degenerate range (all values equal) is widened by 0.5 on each side.
/// Empty input or zero bins yields no buckets.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

// ─── Helpers ────────────────────────────────────────────────────────

fn describe(column: &str, values: &[f64]) -> ColumnStats {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    ColumnStats {
        column: column.to_string(),
        count: values.len(),
        mean: mean_f64(values),
        std: (values.len() >= 2).then(|| std_dev(values)),
        min: sorted.first().copied().unwrap_or(f64::NAN),
        p25: quantile(&sorted, 0.25),
        p50: quantile(&sorted, 0.50),
        p75: quantile(&sorted, 0.75),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

/// Linear-interpolated quantile of already sorted values.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{DataSource, RawBar, RawSeries, RawTable, RawValue};
    use crate::data::validate::{validate_series, validate_table};
    use crate::domain::TIPS_COLUMNS;
    use chrono::NaiveDate;

    fn record(closes: &[f64]) -> TimeSeriesRecord {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                RawBar::numeric(
                    start + chrono::Duration::days(i as i64),
                    c - 0.5,
                    c + 1.0,
                    c - 1.0,
                    c,
                    1_000 * (i as u64 + 1),
                )
            })
            .collect();
        validate_series(RawSeries {
            symbol: "AAPL".into(),
            bars,
            source: DataSource::Synthetic,
        })
        .unwrap()
    }

    fn tips(rows: &[(f64, f64, u32)]) -> TabularRecord {
        validate_table(RawTable {
            headers: TIPS_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|&(bill, tip, size)| {
                    vec![
                        RawValue::Number(bill),
                        RawValue::Number(tip),
                        RawValue::Number(f64::from(size)),
                        RawValue::Text("Sun".into()),
                        RawValue::Text("Dinner".into()),
                    ]
                })
                .collect(),
        })
        .unwrap()
    }

    #[test]
    fn summarize_two_rows() {
        let m = summarize(&record(&[100.0, 110.0]));
        assert_eq!(m.latest_value, 110.0);
        assert_eq!(m.previous_value, 100.0);
        assert_eq!(m.absolute_change, 10.0);
        assert!((m.percent_change - 10.0).abs() < 1e-12);
        assert_eq!(m.max, 111.0);
        assert_eq!(m.min, 99.0);
        assert_eq!(m.mean, 105.0);
        assert_eq!(m.count, 2);
    }

    #[test]
    fn summarize_single_row_has_zero_change() {
        let m = summarize(&record(&[150.25]));
        assert_eq!(m.latest_value, 150.25);
        assert_eq!(m.previous_value, 150.25);
        assert_eq!(m.absolute_change, 0.0);
        assert_eq!(m.percent_change, 0.0);
        assert_eq!(m.count, 1);
    }

    #[test]
    fn summarize_negative_change() {
        let m = summarize(&record(&[120.0, 130.0, 117.0]));
        assert_eq!(m.absolute_change, -13.0);
        assert!((m.percent_change + 10.0).abs() < 1e-12);
    }

    #[test]
    fn describe_series_respects_requested_columns() {
        let stats = describe_series(
            &record(&[1.0, 2.0, 3.0, 4.0]),
            &[SeriesColumn::Close, SeriesColumn::Volume],
        );
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].column, "Close");
        assert_eq!(stats[0].count, 4);
        assert_eq!(stats[0].mean, 2.5);
        assert_eq!(stats[0].min, 1.0);
        assert_eq!(stats[0].p25, 1.75);
        assert_eq!(stats[0].p50, 2.5);
        assert_eq!(stats[0].p75, 3.25);
        assert_eq!(stats[0].max, 4.0);
        let std = stats[0].std.unwrap();
        assert!((std - 1.290_994_448_735_805_6).abs() < 1e-12);
        assert_eq!(stats[1].column, "Volume");
        assert_eq!(stats[1].max, 4_000.0);
    }

    #[test]
    fn std_undefined_for_single_value() {
        let stats = describe_series(&record(&[5.0]), &[SeriesColumn::Close]);
        assert_eq!(stats[0].std, None);
        assert_eq!(stats[0].p25, 5.0);
        assert_eq!(stats[0].p75, 5.0);
    }

    #[test]
    fn quantile_interpolates() {
        let sorted = [10.0, 20.0, 30.0];
        assert_eq!(quantile(&sorted, 0.0), 10.0);
        assert_eq!(quantile(&sorted, 0.25), 15.0);
        assert_eq!(quantile(&sorted, 1.0), 30.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn tips_means() {
        let m = summarize_tips(&tips(&[(10.0, 1.0, 2), (30.0, 5.0, 4)]));
        assert_eq!(m.count, 2);
        assert_eq!(m.mean_total_bill, 20.0);
        assert_eq!(m.mean_tip, 3.0);
        assert_eq!(m.mean_size, 3.0);
    }

    #[test]
    fn describe_tips_covers_numeric_columns() {
        let stats = describe_tips(&tips(&[(10.0, 1.0, 2), (30.0, 5.0, 4)]));
        let names: Vec<&str> = stats.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(names, ["total_bill", "tip", "size"]);
        assert_eq!(stats[2].max, 4.0);
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = histogram(&values, 15);
        assert_eq!(bins.len(), 15);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[14].upper, 99.0);
        // The maximum lands in the last, closed bucket.
        assert!(bins[14].count >= 1);
    }

    #[test]
    fn histogram_degenerate_range() {
        let bins = histogram(&[3.0, 3.0], 2);
        assert_eq!(bins[0].lower, 2.5);
        assert_eq!(bins[1].upper, 3.5);
        assert_eq!(bins[1].count, 2);
        assert!(histogram(&[], 15).is_empty());
    }

    #[test]
    fn series_column_names() {
        assert_eq!(SeriesColumn::Volume.to_string(), "Volume");
        assert_eq!(SeriesColumn::ALL.len(), 5);
    }
}
