//! The seam between the pipeline and whatever draws the pages.
//!
//! Views borrow the validated record for the duration of one render call.
//! Values in a view are unrounded; adapters round for display (2 dp) and
//! call [`EquityView::csv`] / [`TipsView::csv`] for downloads, which always
//! carry full precision.

use crate::data::{
    series_file_name, series_to_csv, table_file_name, table_to_csv, DataSource, ExportError,
    UploadReport,
};
use crate::domain::{Locale, Page, Period, PriceBar, TabularRecord, TimeSeriesRecord, TipRecord};
use crate::metrics::{ColumnStats, HistogramBin, SummaryMetrics, TipsMetrics};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("render failed: {0}")]
    Other(String),
}

/// Informational messages shown alongside a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Live data could not be fetched; a synthetic series is shown instead.
    SyntheticFallback { reason: String },
    /// The uploaded file was unusable; demo tips are shown instead.
    UploadRejected { name: String, reason: String },
    /// The uploaded file was accepted.
    UploadAccepted { name: String },
    /// No file was uploaded; demo tips are shown.
    DemoData,
}

/// Static landing page.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeView<'a> {
    pub ticker: &'a str,
    pub locale: Locale,
    pub periods: &'a [Period],
}

/// Everything the equity page shows.
#[derive(Debug, Clone)]
pub struct EquityView<'a> {
    pub ticker: &'a str,
    pub period: Period,
    pub source: DataSource,
    pub record: &'a TimeSeriesRecord,
    pub summary: SummaryMetrics,
    pub stats: Vec<ColumnStats>,
    pub tail_rows: usize,
}

impl EquityView<'_> {
    /// Most recent rows for the data preview.
    pub fn tail(&self) -> &[PriceBar] {
        self.record.tail(self.tail_rows)
    }

    /// Full-precision CSV download.
    pub fn csv(&self) -> Result<Vec<u8>, ExportError> {
        series_to_csv(self.record)
    }

    pub fn file_name(&self) -> String {
        series_file_name(self.ticker, self.period)
    }
}

/// Everything the tips page shows.
#[derive(Debug, Clone)]
pub struct TipsView<'a> {
    pub source: DataSource,
    /// Name of the uploaded file when it was accepted.
    pub upload_name: Option<&'a str>,
    /// Preview and missing cells of the uploaded file, whenever it parsed as
    /// CSV. Present even when its rows failed validation.
    pub upload_report: Option<&'a UploadReport>,
    pub record: &'a TabularRecord,
    pub summary: TipsMetrics,
    pub stats: Vec<ColumnStats>,
    pub bill_histogram: Vec<HistogramBin>,
    pub head_rows: usize,
}

impl TipsView<'_> {
    pub fn head(&self) -> &[TipRecord] {
        self.record.head(self.head_rows)
    }

    /// (total_bill, tip) pairs for a scatter plot.
    pub fn bill_tip_pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.record.rows().iter().map(|r| (r.total_bill, r.tip))
    }

    pub fn csv(&self) -> Result<Vec<u8>, ExportError> {
        table_to_csv(self.record)
    }

    pub fn file_name(&self) -> &'static str {
        table_file_name()
    }
}

/// Renders pages and notices.
///
/// Implementations own their output; the pipeline only hands over views.
/// A render error aborts the cycle and is reported through
/// [`render_error`](PresentationAdapter::render_error).
pub trait PresentationAdapter {
    fn notice(&mut self, notice: &Notice) -> Result<(), RenderError>;

    fn render_home(&mut self, view: &HomeView<'_>) -> Result<(), RenderError>;

    fn render_equity(&mut self, view: &EquityView<'_>) -> Result<(), RenderError>;

    fn render_tips(&mut self, view: &TipsView<'_>) -> Result<(), RenderError>;

    /// No dataset survived validation; nothing else is drawn for `page`.
    fn render_empty(&mut self, page: Page, reason: &str) -> Result<(), RenderError>;

    fn render_error(&mut self, message: &str) -> Result<(), RenderError>;
}
