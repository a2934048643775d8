//! Core data models for records, column schemas and export requests.
//!
//! Records are loosely typed JSON objects; everything derived from them
//! (columns, view state, results) is strongly typed and serializable in the
//! camelCase shape the dashboard front end exchanges.

use crate::error::ReportError;
use crate::schema::title_case;
use crate::sentinel::is_sentinel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

/// One row of sparsely populated data from an upstream API.
///
/// Key order follows the source document (`serde_json` `preserve_order`).
pub type Record = serde_json::Map<String, Value>;

/// Reserved UI list-rendering key. Never part of an inferred schema.
pub const IDENTITY_FIELD: &str = "key";

/// Value-specific render rule applied during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    /// Pass the value through unchanged
    #[default]
    Plain,
    /// Prefix with the configured currency symbol, two decimals
    Currency,
    /// Reformat ISO dates with the configured date format
    Date,
}

/// A column of the rendered or exported table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ColumnSpec")]
pub struct ColumnDescriptor {
    pub key: String,
    pub title: String,
    pub data_index: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ValueFormat>,
}

/// Lenient wire shape for caller-supplied columns.
///
/// Either `key` or `dataIndex` may be omitted (each defaults to the other),
/// and a missing or empty title is derived from the key.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnSpec {
    key: Option<String>,
    data_index: Option<String>,
    title: Option<String>,
    format: Option<ValueFormat>,
}

impl From<ColumnSpec> for ColumnDescriptor {
    fn from(spec: ColumnSpec) -> Self {
        let key = spec
            .key
            .or_else(|| spec.data_index.clone())
            .unwrap_or_default();
        let data_index = spec.data_index.unwrap_or_else(|| key.clone());
        let title = spec
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| title_case(&key));
        Self {
            key,
            title,
            data_index,
            format: spec.format,
        }
    }
}

impl ColumnDescriptor {
    /// Creates a column whose data index equals its key and whose title is
    /// derived from the key.
    pub fn from_key(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            title: title_case(&key),
            data_index: key.clone(),
            key,
            format: None,
        }
    }

    /// Builder method to pin a render rule on this column.
    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Reads this column's value from a record.
    pub fn value<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        record.get(&self.data_index)
    }

    /// True when the record holds real (non-sentinel) data for this column.
    pub fn has_data(&self, record: &Record) -> bool {
        !is_sentinel(self.value(record))
    }
}

/// Export output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Excel,
    Pdf,
}

impl ExportKind {
    /// All supported kinds.
    pub const ALL: [ExportKind; 2] = [ExportKind::Excel, ExportKind::Pdf];

    /// Upper-case label used in user notifications.
    pub fn label(&self) -> &'static str {
        match self {
            ExportKind::Excel => "EXCEL",
            ExportKind::Pdf => "PDF",
        }
    }
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportKind::Excel => write!(f, "excel"),
            ExportKind::Pdf => write!(f, "pdf"),
        }
    }
}

impl FromStr for ExportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excel" => Ok(ExportKind::Excel),
            "pdf" => Ok(ExportKind::Pdf),
            _ => Err(ReportError::unsupported_kind(s)),
        }
    }
}

/// Sort direction as sent by the table widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascend,
    Descend,
}

/// Current table sort state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

impl SortSpec {
    /// Creates an active sort on `field`.
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: Some(field.into()),
            column_key: None,
            order: Some(order),
        }
    }

    /// The field being sorted on, if the sort is active.
    pub fn active(&self) -> Option<(&str, SortOrder)> {
        let field = self.field.as_deref().or(self.column_key.as_deref())?;
        self.order.map(|order| (field, order))
    }
}

/// Filter and sort state of the table the export was triggered from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Field -> accepted values; `null` or an empty list is inactive
    #[serde(default)]
    pub filters: BTreeMap<String, Option<Vec<Value>>>,
    #[serde(default)]
    pub sorter: SortSpec,
}

impl ViewState {
    /// Builder method to add an active filter.
    pub fn with_filter(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.filters.insert(field.into(), Some(values));
        self
    }

    /// Builder method to set the sort.
    pub fn with_sorter(mut self, sorter: SortSpec) -> Self {
        self.sorter = sorter;
        self
    }

    /// Iterates filters that actually constrain rows.
    pub fn active_filters(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.filters.iter().filter_map(|(field, values)| match values {
            Some(values) if !values.is_empty() => Some((field.as_str(), values.as_slice())),
            _ => None,
        })
    }

    /// True when neither a filter nor a sort is active.
    pub fn is_empty(&self) -> bool {
        self.active_filters().next().is_none() && self.sorter.active().is_none()
    }
}

/// Immutable input bundle for one export invocation.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub records: Vec<Record>,
    /// Explicit schema; inferred from `records` when absent
    pub columns: Option<Vec<ColumnDescriptor>>,
    pub filename: String,
    pub title: String,
    pub report_type: Option<String>,
    pub view: ViewState,
}

impl ExportRequest {
    /// Creates a request over `records` with default naming.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            filename: "report".to_string(),
            title: "Report".to_string(),
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_report_type(mut self, report_type: impl Into<String>) -> Self {
        self.report_type = Some(report_type.into());
        self
    }

    pub fn with_view(mut self, view: ViewState) -> Self {
        self.view = view;
        self
    }
}

/// Uniform outcome of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Path of the artifact the encoder produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

impl ExportResult {
    /// A successful export of `record_count` rows.
    pub fn succeeded(record_count: usize, artifact: Option<PathBuf>) -> Self {
        Self {
            success: true,
            record_count: Some(record_count),
            error: None,
            artifact,
        }
    }

    /// A failed export. An empty message is replaced so that failures always
    /// carry a non-empty error string.
    pub fn failed(error: &ReportError) -> Self {
        let mut message = error.to_string();
        if message.is_empty() {
            message = "export failed".to_string();
        }
        Self {
            success: false,
            record_count: None,
            error: Some(message),
            artifact: None,
        }
    }

    /// User-facing notification text for this result.
    ///
    /// `kind` is the label of the requested format, e.g. `"EXCEL"`.
    pub fn notification(&self, kind: &str) -> String {
        if self.success {
            format!(
                "{} export completed successfully. {} records exported.",
                kind,
                self.record_count.unwrap_or(0)
            )
        } else {
            format!(
                "Failed to export {}: {}",
                kind,
                self.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
