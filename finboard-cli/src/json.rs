//! JSON presenter: one document per cycle, for scripting.

use crate::render::{notice_text, write_export};
use finboard_core::data::{RawValue, UploadReport};
use finboard_core::domain::{Locale, Page};
use finboard_core::presentation::{EquityView, HomeView, TipsView};
use finboard_core::{Notice, PresentationAdapter, RenderError};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Write;
use std::path::PathBuf;

fn cell_value(value: &RawValue) -> Value {
    match value {
        RawValue::Number(n) => json!(n),
        RawValue::Text(s) => json!(s.trim()),
        RawValue::Missing => Value::Null,
    }
}

fn upload_value(report: &UploadReport) -> Value {
    let preview: Vec<Vec<Value>> = report
        .preview
        .iter()
        .map(|row| row.iter().map(cell_value).collect())
        .collect();
    json!({
        "headers": report.headers,
        "preview": preview,
        "missing": report.missing,
    })
}

#[derive(Serialize)]
struct Document {
    notices: Vec<String>,
    page: Value,
}

pub struct JsonPresenter<W: Write> {
    out: W,
    locale: Locale,
    export: Option<PathBuf>,
    notices: Vec<String>,
}

impl<W: Write> JsonPresenter<W> {
    pub fn new(out: W, locale: Locale) -> Self {
        Self {
            out,
            locale,
            export: None,
            notices: Vec::new(),
        }
    }

    pub fn with_export(mut self, path: Option<PathBuf>) -> Self {
        self.export = path;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, page: Value) -> Result<(), RenderError> {
        let doc = Document {
            notices: std::mem::take(&mut self.notices),
            page,
        };
        serde_json::to_writer_pretty(&mut self.out, &doc)
            .map_err(|e| RenderError::Other(format!("JSON encoding failed: {e}")))?;
        writeln!(self.out)?;
        Ok(())
    }

    fn export(&self, file_name: &str, bytes: &[u8]) -> Result<Option<String>, RenderError> {
        match &self.export {
            Some(path) => {
                let target = write_export(path, file_name, bytes)?;
                Ok(Some(target.display().to_string()))
            }
            None => Ok(None),
        }
    }
}

impl<W: Write> PresentationAdapter for JsonPresenter<W> {
    fn notice(&mut self, notice: &Notice) -> Result<(), RenderError> {
        self.notices.push(notice_text(self.locale, notice));
        Ok(())
    }

    fn render_home(&mut self, view: &HomeView<'_>) -> Result<(), RenderError> {
        let periods: Vec<&str> = view.periods.iter().map(|p| p.token()).collect();
        self.emit(json!({
            "kind": "home",
            "ticker": view.ticker,
            "periods": periods,
        }))
    }

    fn render_equity(&mut self, view: &EquityView<'_>) -> Result<(), RenderError> {
        let exported = self.export(&view.file_name(), &view.csv()?)?;
        self.emit(json!({
            "kind": "equity",
            "ticker": view.ticker,
            "period": view.period,
            "source": view.source,
            "summary": view.summary,
            "stats": view.stats,
            "tail": view.tail(),
            "export": exported,
        }))
    }

    fn render_tips(&mut self, view: &TipsView<'_>) -> Result<(), RenderError> {
        let exported = self.export(view.file_name(), &view.csv()?)?;
        let bill_tip: Vec<[f64; 2]> = view.bill_tip_pairs().map(|(b, t)| [b, t]).collect();
        self.emit(json!({
            "kind": "tips",
            "source": view.source,
            "upload": view.upload_name,
            "upload_report": view.upload_report.map(upload_value),
            "summary": view.summary,
            "stats": view.stats,
            "bill_histogram": view.bill_histogram,
            "bill_tip": bill_tip,
            "head": view.head(),
            "export": exported,
        }))
    }

    fn render_empty(&mut self, page: Page, reason: &str) -> Result<(), RenderError> {
        self.emit(json!({ "kind": "empty", "page": page, "reason": reason }))
    }

    fn render_error(&mut self, message: &str) -> Result<(), RenderError> {
        self.emit(json!({ "kind": "error", "message": message }))
    }
}
