//! The normalized, encoder-ready form of an export.

use crate::models::{ColumnDescriptor, Record};
use crate::sentinel::display_text;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// Everything an encoder needs to serialize one report.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    /// Requested artifact name; encoders derive the file stem from it
    pub filename: String,
    pub report_type: Option<String>,
    pub columns: Vec<ColumnDescriptor>,
    /// Normalized rows keyed by column key
    pub rows: Vec<Record>,
    /// Descriptive filter/sort lines for the report header
    pub view_description: Vec<String>,
    pub placeholder: String,
    pub generated_at: DateTime<Utc>,
    /// Fires when the export is cancelled; long-running encoders should
    /// stop early and return `ReportError::Cancelled`
    pub cancellation: CancellationToken,
}

impl ReportDocument {
    /// Column titles in schema order.
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.title.clone()).collect()
    }

    /// Rows as display text in schema order.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| display_text(row.get(&column.key), &self.placeholder))
                    .collect()
            })
            .collect()
    }

    /// Number of data rows.
    pub fn record_count(&self) -> usize {
        self.rows.len()
    }
}
