//! Live acquisition of an equity's history.

use super::provider::{DataProvider, FetchOutcome, RawSeries};
use crate::domain::Period;
use chrono::NaiveDate;
use tracing::{info, warn};

/// Ask `provider` for `ticker` over `period` ending at `today`.
///
/// Every provider error and an empty response fold into
/// [`FetchOutcome::Unavailable`], so callers only ever branch on the tag.
/// Blocks for as long as the provider does.
pub fn fetch_series(
    provider: &dyn DataProvider,
    ticker: &str,
    period: Period,
    today: NaiveDate,
) -> FetchOutcome<RawSeries> {
    if !provider.is_available() {
        return FetchOutcome::Unavailable {
            reason: format!("{} provider is not available", provider.name()),
        };
    }

    let start = period.start_from(today);
    match provider.fetch(ticker, start, today) {
        Ok(series) if series.bars.is_empty() => {
            warn!(ticker, provider = provider.name(), "provider returned no rows");
            FetchOutcome::Unavailable {
                reason: format!("{} returned no rows for {ticker}", provider.name()),
            }
        }
        Ok(series) => {
            info!(
                ticker,
                provider = provider.name(),
                rows = series.bars.len(),
                %start,
                end = %today,
                "fetched live series"
            );
            FetchOutcome::Ok(series)
        }
        Err(e) => {
            warn!(ticker, provider = provider.name(), error = %e, "live fetch failed");
            FetchOutcome::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}
