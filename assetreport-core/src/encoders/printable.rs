//! Print-ready HTML report encoder.
//!
//! Renders the report through an askama template with print styles (A4
//! landscape, repeated table headers) so the browser's print-to-PDF yields
//! the PDF export. Cell values are HTML-escaped by the template engine.

use super::{ReportEncoder, artifact_path, write_artifact};
use crate::error::{ReportError, Result};
use crate::export::ReportDocument;
use crate::models::ExportKind;
use askama::Template;
use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Template)]
#[template(path = "report.html")]
struct PrintableReport<'a> {
    title: &'a str,
    report_type: &'a str,
    generated_at: String,
    view_lines: &'a [String],
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    record_count: usize,
}

/// Writes the report as a standalone printable HTML page.
#[derive(Debug, Clone)]
pub struct PrintableEncoder {
    output_dir: PathBuf,
}

impl PrintableEncoder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Renders the document to HTML.
    pub fn render(&self, document: &ReportDocument) -> Result<String> {
        let report = PrintableReport {
            title: &document.title,
            report_type: document.report_type.as_deref().unwrap_or(""),
            generated_at: document
                .generated_at
                .format("%Y-%m-%d %H:%M UTC")
                .to_string(),
            view_lines: &document.view_description,
            headers: document.headers(),
            rows: document.text_rows(),
            record_count: document.record_count(),
        };

        report
            .render()
            .map_err(|e| ReportError::template("printable report", e))
    }
}

#[async_trait]
impl ReportEncoder for PrintableEncoder {
    fn kind(&self) -> ExportKind {
        ExportKind::Pdf
    }

    fn extension(&self) -> &'static str {
        "html"
    }

    async fn encode(&self, document: &ReportDocument) -> Result<PathBuf> {
        if document.cancellation.is_cancelled() {
            return Err(ReportError::Cancelled);
        }
        let html = self.render(document)?;
        let path = artifact_path(&self.output_dir, &document.filename, self.extension());
        write_artifact(path, html.into_bytes(), document.cancellation.clone()).await
    }
}
