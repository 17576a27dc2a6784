//! Plain-text presenter: draws pages to a terminal and writes CSV downloads.

use finboard_core::data::{DataSource, RawValue, UploadReport};
use finboard_core::domain::{Locale, Page, Period};
use finboard_core::metrics::{ColumnStats, HistogramBin};
use finboard_core::presentation::{EquityView, HomeView, TipsView};
use finboard_core::{Notice, PresentationAdapter, RenderError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// User-facing strings for one locale.
struct Strings {
    title: &'static str,
    equity_section: &'static str,
    equity_features: &'static [&'static str],
    periods: &'static str,
    tips_section: &'static str,
    tips_features: &'static [&'static str],
    pick_page: &'static str,
    price: &'static str,
    change: &'static str,
    high: &'static str,
    low: &'static str,
    rows: &'static str,
    recent_rows: &'static str,
    statistics: &'static str,
    close_trend: &'static str,
    volume_trend: &'static str,
    mean_bill: &'static str,
    mean_tip: &'static str,
    mean_size: &'static str,
    bill_distribution: &'static str,
    bill_vs_tip: &'static str,
    first_rows: &'static str,
    upload_preview: &'static str,
    missing_values: &'static str,
    no_missing: &'static str,
    synthetic_tag: &'static str,
    upload_tag: &'static str,
    saved_to: &'static str,
    no_data: &'static str,
    error: &'static str,
    retry_hint: &'static str,
}

const EN: Strings = Strings {
    title: "Financial analytics dashboard",
    equity_section: "Equity analysis",
    equity_features: &[
        "Live daily prices with a demo fallback",
        "Closing price and volume trends",
        "Key metrics and descriptive statistics",
        "CSV download",
    ],
    periods: "Available periods",
    tips_section: "Tips analysis",
    tips_features: &[
        "Upload your own CSV file",
        "Bill amount distribution",
        "Descriptive statistics",
        "CSV download",
    ],
    pick_page: "Pick a page: `finboard stock` or `finboard tips`.",
    price: "Price",
    change: "Change",
    high: "High",
    low: "Low",
    rows: "Rows",
    recent_rows: "Recent rows",
    statistics: "Statistics",
    close_trend: "Close",
    volume_trend: "Volume",
    mean_bill: "Mean bill",
    mean_tip: "Mean tip",
    mean_size: "Mean party size",
    bill_distribution: "Bill amount distribution",
    bill_vs_tip: "Bill vs tip",
    first_rows: "First rows",
    upload_preview: "Uploaded file preview",
    missing_values: "Missing values per column",
    no_missing: "No missing values",
    synthetic_tag: "demo data",
    upload_tag: "uploaded",
    saved_to: "Saved",
    no_data: "No data to display",
    error: "Error",
    retry_hint: "Try again or pick another period.",
};

const RU: Strings = Strings {
    title: "Финансовый аналитический центр",
    equity_section: "Анализ акций",
    equity_features: &[
        "Реальные дневные цены с резервными демо-данными",
        "Динамика цены закрытия и объемов торгов",
        "Ключевые показатели и описательная статистика",
        "Скачивание данных в CSV",
    ],
    periods: "Доступные периоды",
    tips_section: "Анализ данных Tips",
    tips_features: &[
        "Загрузка собственных CSV файлов",
        "Распределение суммы счета",
        "Описательная статистика",
        "Скачивание данных в CSV",
    ],
    pick_page: "Выберите раздел: `finboard stock` или `finboard tips`.",
    price: "Текущая цена",
    change: "Изменение",
    high: "Максимум",
    low: "Минимум",
    rows: "Записей",
    recent_rows: "Последние записи",
    statistics: "Статистика",
    close_trend: "Закрытие",
    volume_trend: "Объем",
    mean_bill: "Средний чек",
    mean_tip: "Средние чаевые",
    mean_size: "Средний размер группы",
    bill_distribution: "Распределение суммы счета",
    bill_vs_tip: "Связь суммы счета и чаевых",
    first_rows: "Первые записи",
    upload_preview: "Предпросмотр загруженного файла",
    missing_values: "Пропуски в столбцах",
    no_missing: "Нет пропусков",
    synthetic_tag: "демо-данные",
    upload_tag: "загружено",
    saved_to: "Сохранено",
    no_data: "Нет данных для отображения",
    error: "Ошибка",
    retry_hint: "Попробуйте еще раз или выберите другой период.",
};

fn strings(locale: Locale) -> &'static Strings {
    match locale {
        Locale::En => &EN,
        Locale::Ru => &RU,
    }
}

/// Display label of a period in `locale`.
pub fn period_label(locale: Locale, period: Period) -> String {
    match locale {
        Locale::En => period.to_string(),
        Locale::Ru => match period {
            Period::OneMonth => "1 месяц",
            Period::ThreeMonths => "3 месяца",
            Period::SixMonths => "6 месяцев",
            Period::OneYear => "1 год",
            Period::TwoYears => "2 года",
        }
        .to_string(),
    }
}

/// One line of text for a notice.
pub fn notice_text(locale: Locale, notice: &Notice) -> String {
    match (locale, notice) {
        (Locale::En, Notice::SyntheticFallback { reason }) => {
            format!("Could not load live data ({reason}). Showing demo data.")
        }
        (Locale::Ru, Notice::SyntheticFallback { reason }) => {
            format!("Не удалось загрузить реальные данные ({reason}). Используем демо-данные.")
        }
        (Locale::En, Notice::UploadRejected { name, reason }) => {
            format!("Could not read '{name}' ({reason}). Showing demo tips data.")
        }
        (Locale::Ru, Notice::UploadRejected { name, reason }) => {
            format!("Ошибка загрузки файла '{name}' ({reason}). Используются демо-данные.")
        }
        (Locale::En, Notice::UploadAccepted { name }) => format!("Loaded file: {name}"),
        (Locale::Ru, Notice::UploadAccepted { name }) => format!("Загружен файл: {name}"),
        (Locale::En, Notice::DemoData) => "Showing demo tips data.".to_string(),
        (Locale::Ru, Notice::DemoData) => "Используются демо-данные Tips.".to_string(),
    }
}

/// Where a download lands: `path` itself, or `path/<file_name>` when
/// `path` is an existing directory.
pub fn resolve_export_path(path: &Path, file_name: &str) -> PathBuf {
    if path.is_dir() {
        path.join(file_name)
    } else {
        path.to_path_buf()
    }
}

pub fn write_export(path: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, RenderError> {
    let target = resolve_export_path(path, file_name);
    std::fs::write(&target, bytes)?;
    info!(path = %target.display(), bytes = bytes.len(), "wrote CSV download");
    Ok(target)
}

const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One-line chart of `values`, resampled to at most `width` points.
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }
    let step = values.len().div_ceil(width);
    let points: Vec<f64> = values
        .chunks(step)
        .map(|c| c.iter().sum::<f64>() / c.len() as f64)
        .collect();
    let lo = points.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = points.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    points
        .iter()
        .map(|&v| {
            let idx = if span > 0.0 {
                ((v - lo) / span * (SPARK.len() - 1) as f64).round() as usize
            } else {
                SPARK.len() / 2
            };
            SPARK[idx.min(SPARK.len() - 1)]
        })
        .collect()
}

/// Character grid of (x, y) points, `height` rows of `width` columns, the
/// highest y on the first row. Cell marks grow with the point count.
pub fn scatter_grid(points: &[(f64, f64)], width: usize, height: usize) -> Vec<String> {
    if points.is_empty() || width == 0 || height == 0 {
        return Vec::new();
    }
    let bounds = |pick: fn(&(f64, f64)) -> f64| {
        points.iter().map(pick).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
    };
    let (x_lo, x_hi) = bounds(|p| p.0);
    let (y_lo, y_hi) = bounds(|p| p.1);
    let slot = |v: f64, lo: f64, hi: f64, cells: usize| {
        if hi > lo {
            (((v - lo) / (hi - lo)) * (cells - 1) as f64).round() as usize
        } else {
            0
        }
    };

    let mut counts = vec![vec![0usize; width]; height];
    for &(x, y) in points {
        let col = slot(x, x_lo, x_hi, width).min(width - 1);
        let row = height - 1 - slot(y, y_lo, y_hi, height).min(height - 1);
        counts[row][col] += 1;
    }
    counts
        .iter()
        .map(|line| {
            line.iter()
                .map(|&n| match n {
                    0 => ' ',
                    1 => '.',
                    2..=3 => 'o',
                    _ => '@',
                })
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

fn cell_text(value: &RawValue) -> String {
    match value {
        RawValue::Number(n) => n.to_string(),
        RawValue::Text(s) => s.trim().to_string(),
        RawValue::Missing => String::new(),
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Terminal presenter.
pub struct TextPresenter<W: Write> {
    out: W,
    locale: Locale,
    export: Option<PathBuf>,
    show_volume: bool,
}

impl<W: Write> TextPresenter<W> {
    pub fn new(out: W, locale: Locale) -> Self {
        Self {
            out,
            locale,
            export: None,
            show_volume: true,
        }
    }

    /// Write the page's CSV download to `path` after rendering.
    pub fn with_export(mut self, path: Option<PathBuf>) -> Self {
        self.export = path;
        self
    }

    pub fn with_volume(mut self, show: bool) -> Self {
        self.show_volume = show;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn s(&self) -> &'static Strings {
        strings(self.locale)
    }

    fn source_tag(&self, source: DataSource) -> &'static str {
        match source {
            DataSource::Synthetic => self.s().synthetic_tag,
            DataSource::Upload => self.s().upload_tag,
            DataSource::YahooFinance => "Yahoo Finance",
            DataSource::CsvImport => "CSV",
        }
    }

    fn stats_table(&mut self, stats: &[ColumnStats]) -> std::io::Result<()> {
        writeln!(
            self.out,
            "{:<12} {:>6} {:>12} {:>10} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for s in stats {
            writeln!(
                self.out,
                "{:<12} {:>6} {:>12.2} {:>10} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
                s.column,
                s.count,
                s.mean,
                fmt_opt(s.std),
                s.min,
                s.p25,
                s.p50,
                s.p75,
                s.max
            )?;
        }
        Ok(())
    }

    fn histogram(&mut self, bins: &[HistogramBin]) -> std::io::Result<()> {
        let peak = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        for b in bins {
            let bar = "#".repeat(b.count * 40 / peak);
            writeln!(
                self.out,
                "{:>8.2} - {:<8.2} {:>4} {bar}",
                b.lower, b.upper, b.count
            )?;
        }
        Ok(())
    }

    fn scatter(&mut self, points: &[(f64, f64)]) -> std::io::Result<()> {
        let Some(&(first_x, _)) = points.first() else {
            return Ok(());
        };
        let (x_lo, x_hi) = points
            .iter()
            .fold((first_x, first_x), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));
        for line in scatter_grid(points, 48, 12) {
            writeln!(self.out, "  |{line}")?;
        }
        writeln!(self.out, "  +{}", "-".repeat(48))?;
        writeln!(self.out, "   {x_lo:<.2}{:>width$.2}", x_hi, width = 46)?;
        Ok(())
    }

    fn upload_report(&mut self, report: &UploadReport) -> std::io::Result<()> {
        let s = self.s();
        writeln!(self.out, "{}", s.upload_preview)?;
        writeln!(self.out, "{}", report.headers.join(" | "))?;
        for row in &report.preview {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            writeln!(self.out, "{}", cells.join(" | "))?;
        }
        writeln!(self.out)?;

        if report.has_missing() {
            writeln!(self.out, "{}", s.missing_values)?;
            let peak = report.missing.iter().map(|m| m.count).max().unwrap_or(1).max(1);
            for m in report.missing.iter().filter(|m| m.count > 0) {
                let bar = "#".repeat((m.count * 30).div_ceil(peak));
                writeln!(self.out, "{:<14} {:>5} {bar}", m.column, m.count)?;
            }
        } else {
            writeln!(self.out, "{}", s.no_missing)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn export(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), RenderError> {
        if let Some(path) = &self.export {
            let target = write_export(path, file_name, bytes)?;
            let label = self.s().saved_to;
            writeln!(self.out, "{label}: {}", target.display())?;
        }
        Ok(())
    }
}

impl<W: Write> PresentationAdapter for TextPresenter<W> {
    fn notice(&mut self, notice: &Notice) -> Result<(), RenderError> {
        let marker = match notice {
            Notice::UploadAccepted { .. } => "ok",
            Notice::DemoData => "info",
            Notice::SyntheticFallback { .. } | Notice::UploadRejected { .. } => "warning",
        };
        let text = notice_text(self.locale, notice);
        writeln!(self.out, "[{marker}] {text}")?;
        Ok(())
    }

    fn render_home(&mut self, view: &HomeView<'_>) -> Result<(), RenderError> {
        let s = self.s();
        writeln!(self.out, "{}", s.title)?;
        writeln!(self.out, "{}", "=".repeat(s.title.chars().count()))?;
        writeln!(self.out)?;
        writeln!(self.out, "{} ({})", s.equity_section, view.ticker)?;
        for f in s.equity_features {
            writeln!(self.out, "  - {f}")?;
        }
        let periods: Vec<String> = view
            .periods
            .iter()
            .map(|&p| period_label(self.locale, p))
            .collect();
        writeln!(self.out, "  {}: {}", s.periods, periods.join(", "))?;
        writeln!(self.out)?;
        writeln!(self.out, "{}", s.tips_section)?;
        for f in s.tips_features {
            writeln!(self.out, "  - {f}")?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "{}", s.pick_page)?;
        Ok(())
    }

    fn render_equity(&mut self, view: &EquityView<'_>) -> Result<(), RenderError> {
        let s = self.s();
        let m = &view.summary;
        let period = period_label(self.locale, view.period);
        let tag = self.source_tag(view.source);
        writeln!(self.out, "{} - {period} ({tag})", view.ticker)?;
        if let (Some(first), Some(last)) = (view.record.first_date(), view.record.last_date()) {
            writeln!(self.out, "{first} .. {last}")?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "{:<14} ${:.2}", s.price, m.latest_value)?;
        writeln!(
            self.out,
            "{:<14} {:+.2} ({:+.2}%)",
            s.change, m.absolute_change, m.percent_change
        )?;
        writeln!(self.out, "{:<14} ${:.2}", s.high, m.max)?;
        writeln!(self.out, "{:<14} ${:.2}", s.low, m.min)?;
        writeln!(self.out, "{:<14} {}", s.rows, m.count)?;
        writeln!(self.out)?;

        let closes: Vec<f64> = view.record.bars().iter().map(|b| b.close).collect();
        writeln!(self.out, "{:<10} {}", s.close_trend, sparkline(&closes, 60))?;
        if self.show_volume {
            let volumes: Vec<f64> = view.record.bars().iter().map(|b| b.volume as f64).collect();
            writeln!(self.out, "{:<10} {}", s.volume_trend, sparkline(&volumes, 60))?;
        }
        writeln!(self.out)?;

        writeln!(self.out, "{}", s.recent_rows)?;
        writeln!(
            self.out,
            "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
            "Date", "Open", "High", "Low", "Close", "Volume"
        )?;
        for bar in view.tail() {
            writeln!(
                self.out,
                "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12}",
                bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
            )?;
        }
        writeln!(self.out)?;

        writeln!(self.out, "{}", s.statistics)?;
        self.stats_table(&view.stats)?;

        self.export(&view.file_name(), &view.csv()?)
    }

    fn render_tips(&mut self, view: &TipsView<'_>) -> Result<(), RenderError> {
        let s = self.s();
        let m = &view.summary;
        let tag = self.source_tag(view.source);
        match view.upload_name {
            Some(name) => writeln!(self.out, "Tips - {name}")?,
            None => writeln!(self.out, "Tips ({tag})")?,
        }
        writeln!(self.out)?;
        if let Some(report) = view.upload_report {
            self.upload_report(report)?;
        }
        writeln!(self.out, "{:<22} {}", s.rows, m.count)?;
        writeln!(self.out, "{:<22} ${:.2}", s.mean_bill, m.mean_total_bill)?;
        writeln!(self.out, "{:<22} ${:.2}", s.mean_tip, m.mean_tip)?;
        writeln!(self.out, "{:<22} {:.2}", s.mean_size, m.mean_size)?;
        writeln!(self.out)?;

        writeln!(self.out, "{}", s.bill_distribution)?;
        self.histogram(&view.bill_histogram)?;
        writeln!(self.out)?;

        writeln!(self.out, "{}", s.bill_vs_tip)?;
        let pairs: Vec<(f64, f64)> = view.bill_tip_pairs().collect();
        self.scatter(&pairs)?;
        writeln!(self.out)?;

        writeln!(self.out, "{}", s.first_rows)?;
        writeln!(
            self.out,
            "{:>10} {:>8} {:>5} {:<6} {:<8}",
            "total_bill", "tip", "size", "day", "time"
        )?;
        for row in view.head() {
            writeln!(
                self.out,
                "{:>10.2} {:>8.2} {:>5} {:<6} {:<8}",
                row.total_bill, row.tip, row.size, row.day, row.time
            )?;
        }
        writeln!(self.out)?;

        writeln!(self.out, "{}", s.statistics)?;
        self.stats_table(&view.stats)?;

        self.export(view.file_name(), &view.csv()?)
    }

    fn render_empty(&mut self, page: Page, reason: &str) -> Result<(), RenderError> {
        let label = self.s().no_data;
        writeln!(self.out, "[{page:?}] {label} ({reason})")?;
        Ok(())
    }

    fn render_error(&mut self, message: &str) -> Result<(), RenderError> {
        let s = self.s();
        writeln!(self.out, "{}: {message}", s.error)?;
        writeln!(self.out, "{}", s.retry_hint)?;
        Ok(())
    }
}
