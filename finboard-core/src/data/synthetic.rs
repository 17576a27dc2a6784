//! Deterministic synthetic datasets used when real data is unavailable.
//!
//! Both generators are pure functions of their parameters: the same seed
//! (and end date, for the price series) reproduces the same rows bit for bit.
//! Output is raw data and goes through the validator like any other source.

use super::provider::{DataSource, RawBar, RawSeries, RawTable, RawValue};
use crate::domain::{Locale, TIPS_COLUMNS};
use crate::rng::{normal, round_to, seeded};
use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Open/high/low as fixed multiples of the close.
pub const OPEN_FACTOR: f64 = 0.995;
pub const HIGH_FACTOR: f64 = 1.015;
pub const LOW_FACTOR: f64 = 0.985;

/// Daily volume range, half-open.
pub const VOLUME_RANGE: std::ops::Range<u64> = 2_000_000..8_000_000;

/// Random-walk price series generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSeries {
    pub base_price: f64,
    pub window_days: usize,
    pub seed: u64,
    /// Lower bound on the running price.
    pub floor: f64,
    /// Standard deviation of the daily step.
    pub step_std_dev: f64,
}

impl Default for SyntheticSeries {
    fn default() -> Self {
        Self {
            base_price: 170.0,
            window_days: 60,
            seed: 42,
            floor: 100.0,
            step_std_dev: 1.5,
        }
    }
}

impl SyntheticSeries {
    /// Generate `window_days` consecutive calendar days ending at `end`.
    ///
    /// All price steps are drawn before any volume so the closes depend only
    /// on the seed and the window length.
    pub fn generate(&self, symbol: &str, end: NaiveDate) -> RawSeries {
        let mut rng = seeded(self.seed);
        let n = self.window_days;

        let mut closes = Vec::with_capacity(n);
        let mut current = self.base_price;
        for _ in 0..n {
            let step = normal(&mut rng, 0.0, self.step_std_dev);
            current = (current + step).max(self.floor);
            closes.push(current);
        }

        let volumes: Vec<u64> = (0..n).map(|_| rng.gen_range(VOLUME_RANGE)).collect();

        let first = end - Duration::days(n.saturating_sub(1) as i64);
        let bars = closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, volume))| {
                RawBar::numeric(
                    first + Duration::days(i as i64),
                    close * OPEN_FACTOR,
                    close * HIGH_FACTOR,
                    close * LOW_FACTOR,
                    close,
                    volume,
                )
            })
            .collect();

        RawSeries {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        }
    }
}

/// Demo restaurant-bill generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticTips {
    pub rows: usize,
    pub seed: u64,
    pub locale: Locale,
}

impl Default for SyntheticTips {
    fn default() -> Self {
        Self {
            rows: 100,
            seed: 42,
            locale: Locale::En,
        }
    }
}

impl SyntheticTips {
    pub const BILL_RANGE: (f64, f64) = (10.0, 50.0);
    pub const TIP_RANGE: (f64, f64) = (1.0, 10.0);
    pub const TIP_FLOOR: f64 = 1.0;

    /// Generate the demo table. Columns are drawn one after another in
    /// [`TIPS_COLUMNS`] order.
    pub fn generate(&self) -> RawTable {
        let mut rng = seeded(self.seed);
        let n = self.rows;
        let (bill_lo, bill_hi) = Self::BILL_RANGE;
        let (tip_lo, tip_hi) = Self::TIP_RANGE;

        let bills: Vec<f64> = (0..n)
            .map(|_| round_to(rng.gen_range(bill_lo..=bill_hi), 2))
            .collect();
        let tips: Vec<f64> = (0..n)
            .map(|_| round_to(rng.gen_range(tip_lo..=tip_hi), 2).max(Self::TIP_FLOOR))
            .collect();
        let sizes: Vec<u32> = (0..n).map(|_| rng.gen_range(1..6)).collect();

        let day_labels = self.locale.day_labels();
        let meal_labels = self.locale.meal_labels();
        let days: Vec<&str> = (0..n)
            .map(|_| day_labels[rng.gen_range(0..day_labels.len())])
            .collect();
        let times: Vec<&str> = (0..n)
            .map(|_| meal_labels[rng.gen_range(0..meal_labels.len())])
            .collect();

        let rows = (0..n)
            .map(|i| {
                vec![
                    RawValue::Number(bills[i]),
                    RawValue::Number(tips[i]),
                    RawValue::Number(f64::from(sizes[i])),
                    RawValue::Text(days[i].to_string()),
                    RawValue::Text(times[i].to_string()),
                ]
            })
            .collect();

        RawTable {
            headers: TIPS_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn closes(series: &RawSeries) -> Vec<f64> {
        series
            .bars
            .iter()
            .map(|b| b.close.to_f64().unwrap())
            .collect()
    }

    #[test]
    fn series_has_window_days_ending_at_end() {
        let series = SyntheticSeries::default().generate("AAPL", end());
        assert_eq!(series.bars.len(), 60);
        assert_eq!(series.source, DataSource::Synthetic);
        assert_eq!(series.bars.last().unwrap().date, Some(end()));
        assert_eq!(
            series.bars[0].date,
            NaiveDate::from_ymd_opt(2024, 5, 2)
        );
    }

    #[test]
    fn series_is_deterministic() {
        let gen = SyntheticSeries::default();
        assert_eq!(gen.generate("AAPL", end()), gen.generate("AAPL", end()));
    }

    #[test]
    fn series_seed_changes_output() {
        let a = SyntheticSeries::default().generate("AAPL", end());
        let b = SyntheticSeries {
            seed: 7,
            ..SyntheticSeries::default()
        }
        .generate("AAPL", end());
        assert_ne!(closes(&a), closes(&b));
    }

    #[test]
    fn floor_holds_even_with_huge_steps() {
        let gen = SyntheticSeries {
            base_price: 101.0,
            step_std_dev: 50.0,
            window_days: 500,
            ..SyntheticSeries::default()
        };
        let series = gen.generate("AAPL", end());
        assert!(closes(&series).iter().all(|&c| c >= 100.0));
    }

    #[test]
    fn ohlc_offsets_and_volume_range() {
        let series = SyntheticSeries::default().generate("AAPL", end());
        for bar in &series.bars {
            let close = bar.close.to_f64().unwrap();
            assert_eq!(bar.open.to_f64().unwrap(), close * OPEN_FACTOR);
            assert_eq!(bar.high.to_f64().unwrap(), close * HIGH_FACTOR);
            assert_eq!(bar.low.to_f64().unwrap(), close * LOW_FACTOR);
            let volume = bar.volume.to_f64().unwrap() as u64;
            assert!(VOLUME_RANGE.contains(&volume));
        }
    }

    #[test]
    fn zero_window_is_empty() {
        let gen = SyntheticSeries {
            window_days: 0,
            ..SyntheticSeries::default()
        };
        assert!(gen.generate("AAPL", end()).bars.is_empty());
    }

    #[test]
    fn tips_shape_and_ranges() {
        let table = SyntheticTips::default().generate();
        assert_eq!(table.headers, TIPS_COLUMNS);
        assert_eq!(table.rows.len(), 100);
        for row in &table.rows {
            let bill = row[0].to_f64().unwrap();
            let tip = row[1].to_f64().unwrap();
            let size = row[2].to_f64().unwrap();
            assert!((10.0..=50.0).contains(&bill));
            assert!(tip >= 1.0 && tip <= 10.0);
            assert!((1.0..6.0).contains(&size) && size.fract() == 0.0);
            assert!(matches!(&row[3], RawValue::Text(d) if Locale::En.day_labels().contains(&d.as_str())));
            assert!(matches!(&row[4], RawValue::Text(t) if Locale::En.meal_labels().contains(&t.as_str())));
        }
    }

    #[test]
    fn tips_use_locale_labels() {
        let table = SyntheticTips {
            locale: Locale::Ru,
            ..SyntheticTips::default()
        }
        .generate();
        for row in &table.rows {
            assert!(matches!(&row[4], RawValue::Text(t) if t == "Обед" || t == "Ужин"));
        }
    }

    #[test]
    fn tips_are_deterministic() {
        let gen = SyntheticTips::default();
        assert_eq!(gen.generate(), gen.generate());
    }
}
