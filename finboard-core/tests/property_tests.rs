//! Property tests for generator, validator and metric invariants.
//!
//! Uses proptest to verify:
//! 1. Determinism: the same seed reproduces the same series
//! 2. Floor: every synthetic close stays at or above the floor
//! 3. Band: every synthetic row has high >= close >= low
//! 4. Tips: every synthetic tip is at least 1.0
//! 5. Validation: zero survivors is NoUsableData, otherwise order is kept
//! 6. Export: series CSV round-trips through parse and validate

use chrono::{Duration, NaiveDate};
use finboard_core::data::{
    parse_series_csv, series_to_csv, validate_series, validate_table, DataSource, RawBar,
    RawSeries, RawValue, SyntheticSeries, SyntheticTips, ValidationError,
};
use finboard_core::domain::Locale;
use finboard_core::metrics::summarize;
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_end() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|d| NaiveDate::from_ymd_opt(2015, 1, 1).unwrap() + Duration::days(d))
}

fn arb_series_gen() -> impl Strategy<Value = SyntheticSeries> {
    (any::<u64>(), 1usize..400, 100.0..500.0_f64, 0.1..20.0_f64).prop_map(
        |(seed, window_days, base_price, step_std_dev)| SyntheticSeries {
            seed,
            window_days,
            base_price,
            step_std_dev,
            ..SyntheticSeries::default()
        },
    )
}

fn arb_locale() -> impl Strategy<Value = Locale> {
    prop_oneof![Just(Locale::En), Just(Locale::Ru)]
}

/// A cell that is valid, missing, or unparseable text.
fn arb_cell() -> impl Strategy<Value = RawValue> {
    prop_oneof![
        6 => (1.0..1000.0_f64).prop_map(RawValue::Number),
        1 => Just(RawValue::Missing),
        1 => Just(RawValue::Text("n/a".into())),
    ]
}

fn arb_raw_rows() -> impl Strategy<Value = Vec<(RawValue, RawValue)>> {
    prop::collection::vec((arb_cell(), arb_cell()), 0..40)
}

fn raw_series(rows: &[(RawValue, RawValue)]) -> RawSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let bars = rows
        .iter()
        .enumerate()
        .map(|(i, (close, volume))| RawBar {
            date: Some(start + Duration::days(i as i64)),
            open: RawValue::Number(1.0),
            high: RawValue::Number(1.0),
            low: RawValue::Number(1.0),
            close: close.clone(),
            volume: match volume {
                RawValue::Number(v) => RawValue::Number(v.floor()),
                other => other.clone(),
            },
        })
        .collect();
    RawSeries {
        symbol: "TEST".into(),
        bars,
        source: DataSource::Upload,
    }
}

// ── 1-3. Synthetic series ────────────────────────────────────────────

proptest! {
    /// Same seed and end date give the same rows.
    #[test]
    fn synthetic_series_is_deterministic(gen in arb_series_gen(), end in arb_end()) {
        prop_assert_eq!(gen.generate("X", end), gen.generate("X", end));
    }

    /// The random walk never drops below the floor.
    #[test]
    fn synthetic_close_respects_floor(gen in arb_series_gen(), end in arb_end()) {
        let record = validate_series(gen.generate("X", end)).unwrap();
        for bar in record.bars() {
            prop_assert!(bar.close >= gen.floor, "close {} below floor", bar.close);
        }
    }

    /// High and low bracket the close; dates are consecutive and end at `end`.
    #[test]
    fn synthetic_rows_are_well_formed(gen in arb_series_gen(), end in arb_end()) {
        let record = validate_series(gen.generate("X", end)).unwrap();
        prop_assert_eq!(record.len(), gen.window_days);
        prop_assert_eq!(record.last_date(), Some(end));
        for bar in record.bars() {
            prop_assert!(bar.high >= bar.close);
            prop_assert!(bar.close >= bar.low);
            prop_assert!(bar.is_sane());
            prop_assert!((2_000_000..8_000_000).contains(&bar.volume));
        }
        for pair in record.bars().windows(2) {
            prop_assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }
}

// ── 4. Synthetic tips ────────────────────────────────────────────────

proptest! {
    #[test]
    fn synthetic_tips_are_at_least_one(
        seed in any::<u64>(),
        rows in 1usize..300,
        locale in arb_locale(),
    ) {
        let record = validate_table(SyntheticTips { rows, seed, locale }.generate()).unwrap();
        prop_assert_eq!(record.len(), rows);
        for row in record.rows() {
            prop_assert!(row.tip >= 1.0);
            prop_assert!((10.0..=50.0).contains(&row.total_bill));
            prop_assert!((1..6).contains(&row.size));
            prop_assert!(locale.day_labels().contains(&row.day.as_str()));
        }
    }
}

// ── 5. Validator ─────────────────────────────────────────────────────

proptest! {
    /// Survivors are exactly the fully numeric rows, in input order.
    #[test]
    fn validator_keeps_valid_rows_in_order(rows in arb_raw_rows()) {
        let expected: Vec<f64> = rows
            .iter()
            .filter(|(c, v)| c.to_f64().is_some() && v.to_f64().is_some())
            .filter_map(|(c, _)| c.to_f64())
            .collect();

        match validate_series(raw_series(&rows)) {
            Ok(record) => {
                prop_assert!(!record.is_empty());
                let closes: Vec<f64> = record.bars().iter().map(|b| b.close).collect();
                prop_assert_eq!(closes, expected);
            }
            Err(ValidationError::NoUsableData { dropped }) => {
                prop_assert!(expected.is_empty());
                prop_assert_eq!(dropped, rows.len());
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }
}

// ── 6. Export round-trip and metrics ─────────────────────────────────

proptest! {
    #[test]
    fn exported_series_round_trips(gen in arb_series_gen(), end in arb_end()) {
        let record = validate_series(gen.generate("X", end)).unwrap();
        let csv = series_to_csv(&record).unwrap();
        let reparsed = validate_series(parse_series_csv("X", &csv).unwrap()).unwrap();
        prop_assert_eq!(reparsed, record);
    }

    /// The last close and its change agree with the record.
    #[test]
    fn summary_matches_last_two_closes(gen in arb_series_gen(), end in arb_end()) {
        let record = validate_series(gen.generate("X", end)).unwrap();
        let m = summarize(&record);
        let bars = record.bars();
        prop_assert_eq!(m.latest_value, bars[bars.len() - 1].close);
        if bars.len() == 1 {
            prop_assert_eq!(m.absolute_change, 0.0);
            prop_assert_eq!(m.percent_change, 0.0);
        } else {
            prop_assert_eq!(m.previous_value, bars[bars.len() - 2].close);
        }
        prop_assert!(m.min <= m.mean && m.mean <= m.max);
    }
}
