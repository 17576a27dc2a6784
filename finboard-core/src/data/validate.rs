//! Numeric coercion and row filtering.
//!
//! Turns raw series and tables into validated records. Cells that fail
//! coercion become missing; rows with a missing required cell are dropped.
//! An empty result is reported as [`ValidationError::NoUsableData`] so the
//! caller can show a dedicated empty state.

use super::provider::{RawBar, RawSeries, RawTable, RawValue};
use crate::domain::{PriceBar, TabularRecord, TimeSeriesRecord, TipRecord, TIPS_COLUMNS};
use thiserror::Error;
use tracing::debug;

static MISSING: RawValue = RawValue::Missing;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no usable rows after validation ({dropped} dropped)")]
    NoUsableData { dropped: usize },

    #[error("required column missing: {0}")]
    MissingColumn(String),
}

/// Validate a raw price series.
///
/// Every OHLCV field is required. Volume must also be a non-negative whole
/// number. Rows whose date does not strictly follow the previous kept row
/// are dropped, so the result is strictly date-ordered; surviving rows keep
/// their original order.
pub fn validate_series(raw: RawSeries) -> Result<TimeSeriesRecord, ValidationError> {
    let total = raw.bars.len();
    let mut bars: Vec<PriceBar> = Vec::with_capacity(total);
    let mut out_of_order = 0usize;

    for row in &raw.bars {
        let Some(bar) = coerce_bar(row) else {
            continue;
        };
        if bars.last().is_some_and(|prev| prev.date >= bar.date) {
            out_of_order += 1;
            continue;
        }
        bars.push(bar);
    }

    let dropped = total - bars.len();
    debug!(
        symbol = %raw.symbol,
        kept = bars.len(),
        dropped,
        out_of_order,
        "validated price series"
    );

    if bars.is_empty() {
        return Err(ValidationError::NoUsableData { dropped });
    }
    Ok(TimeSeriesRecord::new(raw.symbol, bars))
}

fn coerce_bar(row: &RawBar) -> Option<PriceBar> {
    Some(PriceBar {
        date: row.date?,
        open: row.open.to_f64()?,
        high: row.high.to_f64()?,
        low: row.low.to_f64()?,
        close: row.close.to_f64()?,
        volume: whole_number(&row.volume, 0)?,
    })
}

/// Coerce to a whole number no smaller than `min`.
fn whole_number(value: &RawValue, min: u64) -> Option<u64> {
    let v = value.to_f64()?;
    if v.fract() != 0.0 || v < min as f64 || v > u64::MAX as f64 {
        return None;
    }
    Some(v as u64)
}

fn label(value: &RawValue) -> Option<String> {
    match value {
        RawValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        RawValue::Number(n) if n.is_finite() => Some(n.to_string()),
        _ => None,
    }
}

/// Validate a raw tips table.
///
/// All five [`TIPS_COLUMNS`] must be present (matched case-insensitively,
/// in any order). `total_bill` must be a positive number, `tip` numeric,
/// `size` a whole number of at least one, `day` and `time` non-blank.
pub fn validate_table(raw: RawTable) -> Result<TabularRecord, ValidationError> {
    let mut idx = [0usize; 5];
    for (slot, name) in idx.iter_mut().zip(TIPS_COLUMNS) {
        *slot = raw
            .column(name)
            .ok_or_else(|| ValidationError::MissingColumn(name.to_string()))?;
    }
    let [bill_i, tip_i, size_i, day_i, time_i] = idx;

    let total = raw.rows.len();
    let rows: Vec<TipRecord> = raw
        .rows
        .iter()
        .filter_map(|row| {
            let cell = |i: usize| row.get(i).unwrap_or(&MISSING);
            Some(TipRecord {
                total_bill: cell(bill_i).to_f64().filter(|&v| v > 0.0)?,
                tip: cell(tip_i).to_f64()?,
                size: u32::try_from(whole_number(cell(size_i), 1)?).ok()?,
                day: label(cell(day_i))?,
                time: label(cell(time_i))?,
            })
        })
        .collect();

    let dropped = total - rows.len();
    debug!(kept = rows.len(), dropped, "validated tips table");

    if rows.is_empty() {
        return Err(ValidationError::NoUsableData { dropped });
    }
    Ok(TabularRecord::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::DataSource;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn series(bars: Vec<RawBar>) -> RawSeries {
        RawSeries {
            symbol: "AAPL".into(),
            bars,
            source: DataSource::YahooFinance,
        }
    }

    fn text_row(cells: &[&str]) -> Vec<RawValue> {
        cells.iter().map(|c| RawValue::from(*c)).collect()
    }

    fn tips_table(rows: Vec<Vec<RawValue>>) -> RawTable {
        RawTable {
            headers: TIPS_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn drops_rows_with_missing_or_unparseable_cells() {
        let mut bad_text = RawBar::numeric(date(3), 1.0, 2.0, 0.5, 1.5, 100);
        bad_text.close = RawValue::Text("oops".into());
        let mut missing = RawBar::numeric(date(4), 1.0, 2.0, 0.5, 1.5, 100);
        missing.volume = RawValue::Missing;

        let raw = series(vec![
            RawBar::numeric(date(2), 1.0, 2.0, 0.5, 1.5, 100),
            bad_text,
            missing,
            RawBar::numeric(date(5), 1.1, 2.1, 0.6, 1.6, 200),
        ]);

        let record = validate_series(raw).unwrap();
        let dates: Vec<NaiveDate> = record.bars().iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date(2), date(5)]);
    }

    #[test]
    fn text_numbers_are_coerced() {
        let raw = series(vec![RawBar {
            date: Some(date(2)),
            open: RawValue::Text("184.5".into()),
            high: RawValue::Text(" 186 ".into()),
            low: RawValue::Number(183.0),
            close: RawValue::Text("185.25".into()),
            volume: RawValue::Text("1200.0".into()),
        }]);
        let record = validate_series(raw).unwrap();
        let bar = record.bars()[0];
        assert_eq!(bar.open, 184.5);
        assert_eq!(bar.high, 186.0);
        assert_eq!(bar.volume, 1200);
    }

    #[test]
    fn fractional_or_negative_volume_is_invalid() {
        let mut frac = RawBar::numeric(date(2), 1.0, 2.0, 0.5, 1.5, 0);
        frac.volume = RawValue::Number(10.5);
        let mut neg = RawBar::numeric(date(3), 1.0, 2.0, 0.5, 1.5, 0);
        neg.volume = RawValue::Number(-1.0);
        let err = validate_series(series(vec![frac, neg])).unwrap_err();
        assert_eq!(err, ValidationError::NoUsableData { dropped: 2 });
    }

    #[test]
    fn duplicate_and_backwards_dates_are_dropped() {
        let raw = series(vec![
            RawBar::numeric(date(2), 1.0, 2.0, 0.5, 1.5, 1),
            RawBar::numeric(date(2), 9.0, 9.0, 9.0, 9.0, 9),
            RawBar::numeric(date(1), 9.0, 9.0, 9.0, 9.0, 9),
            RawBar::numeric(date(3), 1.0, 2.0, 0.5, 1.5, 1),
        ]);
        let record = validate_series(raw).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.bars()[0].close, 1.5);
        assert_eq!(record.bars()[1].date, date(3));
    }

    #[test]
    fn empty_series_is_no_usable_data() {
        assert_eq!(
            validate_series(series(vec![])).unwrap_err(),
            ValidationError::NoUsableData { dropped: 0 }
        );
    }

    #[test]
    fn undated_rows_are_dropped() {
        let mut undated = RawBar::numeric(date(2), 1.0, 2.0, 0.5, 1.5, 1);
        undated.date = None;
        assert!(validate_series(series(vec![undated])).is_err());
    }

    #[test]
    fn table_columns_found_in_any_order_and_case() {
        let raw = RawTable {
            headers: vec![
                "Day".into(),
                "TIP".into(),
                "time".into(),
                "size".into(),
                "total_bill".into(),
            ],
            rows: vec![text_row(&["Sat", "3.5", "Dinner", "2", "20.25"])],
        };
        let record = validate_table(raw).unwrap();
        let row = &record.rows()[0];
        assert_eq!(row.total_bill, 20.25);
        assert_eq!(row.tip, 3.5);
        assert_eq!(row.size, 2);
        assert_eq!(row.day, "Sat");
        assert_eq!(row.time, "Dinner");
    }

    #[test]
    fn table_missing_column_is_reported() {
        let raw = RawTable {
            headers: vec!["total_bill".into(), "tip".into()],
            rows: vec![text_row(&["10", "1"])],
        };
        assert_eq!(
            validate_table(raw).unwrap_err(),
            ValidationError::MissingColumn("size".into())
        );
    }

    #[test]
    fn table_drops_invalid_rows_and_keeps_order() {
        let raw = tips_table(vec![
            text_row(&["16.99", "1.01", "2", "Sun", "Dinner"]),
            text_row(&["10.34", "abc", "3", "Sun", "Dinner"]),
            text_row(&["21.01", "3.5", "0", "Sun", "Dinner"]),
            text_row(&["23.68", "3.31", "2.5", "Sun", "Dinner"]),
            text_row(&["24.59", "3.61", "4", "", "Dinner"]),
            text_row(&["25.29", "4.71", "4"]),
            text_row(&["8.77", "2", "2", "Sun", "Lunch"]),
        ]);
        let record = validate_table(raw).unwrap();
        let bills: Vec<f64> = record.rows().iter().map(|r| r.total_bill).collect();
        assert_eq!(bills, vec![16.99, 8.77]);
    }

    #[test]
    fn table_drops_zero_and_negative_bills() {
        let raw = tips_table(vec![
            text_row(&["-5", "1.5", "2", "Sun", "Dinner"]),
            text_row(&["0", "2", "2", "Sun", "Dinner"]),
            text_row(&["12.5", "2", "2", "Sat", "Lunch"]),
        ]);
        let record = validate_table(raw).unwrap();
        let bills: Vec<f64> = record.rows().iter().map(|r| r.total_bill).collect();
        assert_eq!(bills, vec![12.5]);

        let only_bad = tips_table(vec![
            text_row(&["-5", "1.5", "2", "Sun", "Dinner"]),
            text_row(&["0", "2", "2", "Sun", "Dinner"]),
        ]);
        assert_eq!(
            validate_table(only_bad).unwrap_err(),
            ValidationError::NoUsableData { dropped: 2 }
        );
    }

    #[test]
    fn table_with_all_text_tips_is_no_usable_data() {
        let raw = tips_table(vec![
            text_row(&["16.99", "low", "2", "Sun", "Dinner"]),
            text_row(&["10.34", "high", "3", "Sun", "Dinner"]),
        ]);
        assert_eq!(
            validate_table(raw).unwrap_err(),
            ValidationError::NoUsableData { dropped: 2 }
        );
    }
}
