//! One dashboard interaction: acquire, validate, compute, present.
//!
//! Fallback policy:
//! 1. Equity page: ask the live provider. If it is unavailable (error or
//!    empty response), emit a notice and generate the synthetic series.
//! 2. Tips page: parse and validate the upload, if any. An unusable upload
//!    (unparseable, or no valid rows) yields a notice and the demo table.
//!    No upload yields the demo table directly.
//! 3. Whatever dataset was chosen is validated. If nothing survives, the
//!    page shows the empty state and the cycle stops there.
//!
//! Errors past that point (computation, rendering, export) are caught in
//! [`Dashboard::handle`] and shown as an error state; the dashboard stays
//! usable for the next interaction.

use crate::config::DashboardConfig;
use crate::data::{
    fetch_series, inspect_upload, read_upload, validate_series, validate_table, DataProvider,
    DataSource, FetchOutcome, UploadReport, ValidationError,
};
use crate::domain::{Page, Period, SessionContext, TabularRecord, UploadedFile};
use crate::metrics::{
    bill_histogram, describe_series, describe_tips, summarize, summarize_tips, ColumnStats,
};
use crate::presentation::{
    EquityView, HomeView, Notice, PresentationAdapter, RenderError, TipsView,
};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("metric '{metric}' is not finite")]
    NonFinite { metric: String },
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A page was drawn. `source` is `None` for the home page.
    Rendered { source: Option<DataSource> },
    /// No usable dataset; the empty state was drawn.
    Empty,
    /// An error state was drawn.
    Failed { message: String },
}

/// The dashboard: configuration plus the live equity source.
pub struct Dashboard {
    config: DashboardConfig,
    provider: Box<dyn DataProvider>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, provider: Box<dyn DataProvider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Run one full cycle for `session`, with `today` as the end of every
    /// date window.
    ///
    /// Never panics on bad data and never returns an error: every failure
    /// ends in a notice, the empty state or the error state.
    pub fn handle(
        &self,
        session: &SessionContext,
        today: NaiveDate,
        out: &mut dyn PresentationAdapter,
    ) -> CycleOutcome {
        let result = match session.page {
            Page::Home => self.home_cycle(session, out),
            Page::Equity => self.equity_cycle(session, today, out),
            Page::Tips => self.tips_cycle(session, out),
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(page = ?session.page, error = %e, "dashboard cycle failed");
                let message = e.to_string();
                if let Err(render_err) = out.render_error(&message) {
                    error!(error = %render_err, "failed to render error state");
                }
                CycleOutcome::Failed { message }
            }
        }
    }

    fn ticker<'a>(&'a self, session: &'a SessionContext) -> &'a str {
        let ticker = session.ticker.trim();
        if ticker.is_empty() {
            &self.config.ticker
        } else {
            ticker
        }
    }

    fn home_cycle(
        &self,
        session: &SessionContext,
        out: &mut dyn PresentationAdapter,
    ) -> Result<CycleOutcome, PipelineError> {
        out.render_home(&HomeView {
            ticker: self.ticker(session),
            locale: self.config.locale,
            periods: &Period::ALL,
        })?;
        Ok(CycleOutcome::Rendered { source: None })
    }

    fn equity_cycle(
        &self,
        session: &SessionContext,
        today: NaiveDate,
        out: &mut dyn PresentationAdapter,
    ) -> Result<CycleOutcome, PipelineError> {
        let ticker = self.ticker(session);

        let raw = match fetch_series(self.provider.as_ref(), ticker, session.period, today) {
            FetchOutcome::Ok(raw) => raw,
            FetchOutcome::Unavailable { reason } | FetchOutcome::ParseFailure { reason } => {
                warn!(ticker, %reason, "live data unavailable, using synthetic series");
                out.notice(&Notice::SyntheticFallback { reason })?;
                self.config.synthetic_series().generate(ticker, today)
            }
        };

        let source = raw.source;
        let record = match validate_series(raw) {
            Ok(record) => record,
            Err(e) => return self.empty(Page::Equity, &e, out),
        };
        info!(ticker, ?source, rows = record.len(), "equity dataset ready");

        let summary = summarize(&record);
        ensure_finite("latest value", summary.latest_value)?;
        ensure_finite("percent change", summary.percent_change)?;
        ensure_finite("mean", summary.mean)?;
        let stats = describe_series(&record, &self.config.metrics_requested);
        check_stats(&stats)?;

        out.render_equity(&EquityView {
            ticker,
            period: session.period,
            source,
            record: &record,
            summary,
            stats,
            tail_rows: self.config.tail_rows,
        })?;
        Ok(CycleOutcome::Rendered {
            source: Some(source),
        })
    }

    fn tips_cycle(
        &self,
        session: &SessionContext,
        out: &mut dyn PresentationAdapter,
    ) -> Result<CycleOutcome, PipelineError> {
        let (loaded, report) = match &session.uploaded {
            Some(file) => {
                let (outcome, report) = load_upload(file, self.config.tail_rows);
                (Some((file, outcome)), report)
            }
            None => (None, None),
        };

        let accepted = match loaded {
            Some((file, outcome)) => match outcome {
                FetchOutcome::Ok(record) => {
                    info!(name = %file.name, rows = record.len(), "using uploaded tips file");
                    out.notice(&Notice::UploadAccepted {
                        name: file.name.clone(),
                    })?;
                    Some((record, file.name.as_str()))
                }
                FetchOutcome::ParseFailure { reason } | FetchOutcome::Unavailable { reason } => {
                    warn!(name = %file.name, %reason, "upload rejected, using demo tips");
                    out.notice(&Notice::UploadRejected {
                        name: file.name.clone(),
                        reason,
                    })?;
                    None
                }
            },
            None => {
                debug!("no upload, using demo tips");
                out.notice(&Notice::DemoData)?;
                None
            }
        };

        let (record, source, upload_name) = match accepted {
            Some((record, name)) => (record, DataSource::Upload, Some(name)),
            None => match validate_table(self.config.synthetic_tips().generate()) {
                Ok(record) => (record, DataSource::Synthetic, None),
                Err(e) => return self.empty(Page::Tips, &e, out),
            },
        };

        let summary = summarize_tips(&record);
        ensure_finite("mean total_bill", summary.mean_total_bill)?;
        ensure_finite("mean tip", summary.mean_tip)?;
        let stats = describe_tips(&record);
        check_stats(&stats)?;

        out.render_tips(&TipsView {
            source,
            upload_name,
            upload_report: report.as_ref(),
            record: &record,
            summary,
            stats,
            bill_histogram: bill_histogram(&record),
            head_rows: self.config.tail_rows,
        })?;
        Ok(CycleOutcome::Rendered {
            source: Some(source),
        })
    }

    fn empty(
        &self,
        page: Page,
        cause: &ValidationError,
        out: &mut dyn PresentationAdapter,
    ) -> Result<CycleOutcome, PipelineError> {
        warn!(?page, error = %cause, "no usable data");
        out.render_empty(page, &cause.to_string())?;
        Ok(CycleOutcome::Empty)
    }
}

/// Parse, inspect and validate an upload. Both kinds of failure count as a
/// parse failure: the file is not usable tips data either way. The report
/// exists whenever the bytes parsed as CSV.
fn load_upload(
    file: &UploadedFile,
    preview_rows: usize,
) -> (FetchOutcome<TabularRecord>, Option<UploadReport>) {
    let table = match read_upload(&file.bytes) {
        FetchOutcome::Ok(table) => table,
        FetchOutcome::ParseFailure { reason } | FetchOutcome::Unavailable { reason } => {
            return (FetchOutcome::ParseFailure { reason }, None);
        }
    };
    let report = inspect_upload(&table, preview_rows);
    let outcome = match validate_table(table) {
        Ok(record) => FetchOutcome::Ok(record),
        Err(e) => FetchOutcome::ParseFailure {
            reason: e.to_string(),
        },
    };
    (outcome, Some(report))
}

fn ensure_finite(metric: &str, value: f64) -> Result<(), PipelineError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PipelineError::NonFinite {
            metric: metric.to_string(),
        })
    }
}

fn check_stats(stats: &[ColumnStats]) -> Result<(), PipelineError> {
    for s in stats {
        ensure_finite(&format!("{} mean", s.column), s.mean)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_with_bad_rows_only_is_parse_failure() {
        let file = UploadedFile {
            name: "tips.csv".into(),
            bytes: b"total_bill,tip,size,day,time\n10,x,2,Sun,Dinner\n".to_vec(),
        };
        let (outcome, report) = load_upload(&file, 10);
        assert!(matches!(
            outcome,
            FetchOutcome::ParseFailure { reason } if reason.contains("no usable rows")
        ));
        // The file still parsed, so its gaps are reported.
        assert!(report.is_some_and(|r| !r.has_missing()));
    }

    #[test]
    fn upload_missing_column_is_parse_failure() {
        let file = UploadedFile {
            name: "other.csv".into(),
            bytes: b"a,b\n1,2\n".to_vec(),
        };
        let (outcome, report) = load_upload(&file, 10);
        assert!(matches!(
            outcome,
            FetchOutcome::ParseFailure { reason } if reason.contains("total_bill")
        ));
        assert_eq!(report.map(|r| r.headers), Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn good_upload_is_ok() {
        let file = UploadedFile {
            name: "tips.csv".into(),
            bytes: b"total_bill,tip,size,day,time\n10,1.5,2,Sun,Dinner\n".to_vec(),
        };
        assert_eq!(load_upload(&file, 10).0.ok().map(|r| r.len()), Some(1));
    }

    #[test]
    fn unparseable_upload_has_no_report() {
        let file = UploadedFile {
            name: "notes.txt".into(),
            bytes: b"just one column\n".to_vec(),
        };
        let (outcome, report) = load_upload(&file, 10);
        assert!(!outcome.is_ok());
        assert!(report.is_none());
    }

    #[test]
    fn report_preview_is_capped() {
        let mut bytes = b"total_bill,tip,size,day,time\n".to_vec();
        for _ in 0..15 {
            bytes.extend_from_slice(b"10,,2,Sun,Dinner\n");
        }
        let file = UploadedFile {
            name: "gaps.csv".into(),
            bytes,
        };
        let (_, report) = load_upload(&file, 10);
        let report = report.unwrap();
        assert_eq!(report.preview.len(), 10);
        assert_eq!(report.missing[1].count, 15);
    }

    #[test]
    fn non_finite_metric_is_an_error() {
        assert!(ensure_finite("x", 1.0).is_ok());
        let err = ensure_finite("mean", f64::INFINITY).unwrap_err();
        assert_eq!(err.to_string(), "metric 'mean' is not finite");
    }
}
