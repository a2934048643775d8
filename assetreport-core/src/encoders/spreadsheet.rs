//! Excel-compatible CSV encoder.

use super::{ReportEncoder, artifact_path, write_artifact};
use crate::error::{ReportError, Result};
use crate::export::ReportDocument;
use crate::models::ExportKind;
use async_trait::async_trait;
use std::path::PathBuf;

/// UTF-8 byte order mark; makes Excel pick the right encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes the report as a UTF-8 CSV with a header row of column titles.
#[derive(Debug, Clone)]
pub struct SpreadsheetEncoder {
    output_dir: PathBuf,
}

impl SpreadsheetEncoder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Serializes the document to CSV bytes.
    pub fn render(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(UTF8_BOM.to_vec());

        if !document.columns.is_empty() {
            writer
                .write_record(document.headers())
                .map_err(|e| ReportError::encoder(format!("CSV header write failed: {}", e)))?;

            for (index, row) in document.text_rows().into_iter().enumerate() {
                writer.write_record(&row).map_err(|e| {
                    ReportError::encoder(format!("CSV row {} write failed: {}", index + 1, e))
                })?;
            }
        }

        writer
            .into_inner()
            .map_err(|e| ReportError::encoder(format!("CSV flush failed: {}", e.error())))
    }
}

#[async_trait]
impl ReportEncoder for SpreadsheetEncoder {
    fn kind(&self) -> ExportKind {
        ExportKind::Excel
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    async fn encode(&self, document: &ReportDocument) -> Result<PathBuf> {
        if document.cancellation.is_cancelled() {
            return Err(ReportError::Cancelled);
        }
        let bytes = self.render(document)?;
        let path = artifact_path(&self.output_dir, &document.filename, self.extension());
        write_artifact(path, bytes, document.cancellation.clone()).await
    }
}
