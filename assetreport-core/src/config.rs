//! Export configuration.
//!
//! Controls where artifacts are written, how sentinel and typed values are
//! rendered, and whether the table's filter/sort state is applied to the
//! exported rows.

use crate::error::{ReportError, Result};
use crate::models::ValueFormat;
use crate::sentinel::DEFAULT_PLACEHOLDER;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Field-name pattern that selects a render rule for columns without an
/// explicit format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatPattern {
    /// Regular expression matched against the column's data index
    pub pattern: String,
    pub format: ValueFormat,
}

impl FormatPattern {
    pub fn new(pattern: impl Into<String>, format: ValueFormat) -> Self {
        Self {
            pattern: pattern.into(),
            format,
        }
    }
}

/// Export configuration shared by every export a coordinator runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory encoders write artifacts into
    pub output_dir: PathBuf,
    /// Display text substituted for sentinel values
    pub placeholder: String,
    /// Prefix for currency-formatted values
    pub currency_symbol: String,
    /// chrono strftime format for date-formatted values
    pub date_format: String,
    /// Apply filters and sort to the rows before export. When false the
    /// view state is only described in the report header.
    pub apply_view_state: bool,
    /// First matching pattern wins
    pub format_patterns: Vec<FormatPattern>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            currency_symbol: "$".to_string(),
            date_format: "%d %b %Y".to_string(),
            apply_view_state: true,
            format_patterns: vec![
                FormatPattern::new(
                    r"(?i)(^|_)(value|cost|price|amount|depreciation)$",
                    ValueFormat::Currency,
                ),
                FormatPattern::new(r"(?i)(^|_)(date|expiry)$|_at$", ValueFormat::Date),
            ],
        }
    }
}

impl ExportConfig {
    /// Creates a new export config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Builder method to set the sentinel placeholder.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Builder method to set the currency symbol.
    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    /// Builder method to set the date format.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Builder method to choose whether filters/sort reshape exported rows.
    pub fn with_apply_view_state(mut self, apply: bool) -> Self {
        self.apply_view_state = apply;
        self
    }

    /// Builder method to replace the field-name format patterns.
    pub fn with_format_patterns(mut self, patterns: Vec<FormatPattern>) -> Self {
        self.format_patterns = patterns;
        self
    }

    /// Validates the configuration.
    ///
    /// Pattern compilation is checked separately when the coordinator builds
    /// its formatter.
    pub fn validate(&self) -> Result<()> {
        if self.placeholder.is_empty() {
            return Err(ReportError::configuration("placeholder must not be empty"));
        }
        if self.date_format.trim().is_empty() {
            return Err(ReportError::configuration("date_format must not be empty"));
        }
        if chrono::format::StrftimeItems::new(&self.date_format)
            .any(|item| matches!(item, chrono::format::Item::Error))
        {
            return Err(ReportError::configuration(format!(
                "invalid date_format '{}'",
                self.date_format
            )));
        }
        Ok(())
    }
}
