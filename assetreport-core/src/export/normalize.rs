//! Normalization of records into flat export rows.
//!
//! For each record and each column in schema order the value is read by
//! data index, sentinels become the placeholder, and the column's render
//! rule is applied. Rows are never dropped or reordered here.
//!
//! Render rules only touch values they can parse (numbers for currency, ISO
//! dates for dates), so normalizing an already normalized row is a no-op.

use crate::config::ExportConfig;
use crate::error::{ReportError, Result};
use crate::models::{ColumnDescriptor, Record, ValueFormat};
use crate::sentinel::is_sentinel;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

/// Normalizes records according to an [`ExportConfig`].
#[derive(Debug, Clone)]
pub struct RowNormalizer {
    placeholder: String,
    currency_symbol: String,
    date_format: String,
    patterns: Vec<(Regex, ValueFormat)>,
}

impl RowNormalizer {
    /// Builds a normalizer, compiling the config's format patterns.
    ///
    /// # Errors
    /// Returns a configuration error if the config is invalid or a pattern
    /// fails to compile.
    pub fn new(config: &ExportConfig) -> Result<Self> {
        config.validate()?;

        let patterns = config
            .format_patterns
            .iter()
            .map(|p| {
                Regex::new(&p.pattern)
                    .map(|re| (re, p.format))
                    .map_err(|e| {
                        ReportError::configuration(format!(
                            "invalid format pattern '{}': {}",
                            p.pattern, e
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            placeholder: config.placeholder.clone(),
            currency_symbol: config.currency_symbol.clone(),
            date_format: config.date_format.clone(),
            patterns,
        })
    }

    /// The render rule in effect for a column: its explicit format, else the
    /// first matching field-name pattern, else plain.
    pub fn format_for(&self, column: &ColumnDescriptor) -> ValueFormat {
        column.format.unwrap_or_else(|| {
            self.patterns
                .iter()
                .find(|(re, _)| re.is_match(&column.data_index))
                .map_or(ValueFormat::Plain, |(_, format)| *format)
        })
    }

    /// Normalizes one record into a row keyed by column key.
    pub fn normalize_record(&self, record: &Record, columns: &[ColumnDescriptor]) -> Record {
        columns
            .iter()
            .map(|column| {
                let value = self.normalize_value(column.value(record), self.format_for(column));
                (column.key.clone(), value)
            })
            .collect()
    }

    /// Normalizes every record, preserving input order and count.
    pub fn normalize_all(&self, records: &[Record], columns: &[ColumnDescriptor]) -> Vec<Record> {
        records
            .iter()
            .map(|record| self.normalize_record(record, columns))
            .collect()
    }

    /// Normalizes a single value under a render rule.
    pub fn normalize_value(&self, value: Option<&Value>, format: ValueFormat) -> Value {
        if is_sentinel(value) {
            return Value::String(self.placeholder.clone());
        }
        let Some(value) = value else {
            return Value::String(self.placeholder.clone());
        };

        let rendered = match format {
            ValueFormat::Plain => None,
            ValueFormat::Currency => self.render_currency(value),
            ValueFormat::Date => self.render_date(value),
        };

        rendered.map_or_else(|| value.clone(), Value::String)
    }

    fn render_currency(&self, value: &Value) -> Option<String> {
        let amount = match value {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if !amount.is_finite() {
            return None;
        }
        Some(format_currency(amount, &self.currency_symbol))
    }

    fn render_date(&self, value: &Value) -> Option<String> {
        let Value::String(s) = value else {
            return None;
        };
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.format(&self.date_format).to_string());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt.format(&self.date_format).to_string());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Some(dt.format(&self.date_format).to_string());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|d| d.format(&self.date_format).to_string())
    }
}

/// Formats an amount as `<symbol><grouped integer>.<2 decimals>`, with a
/// leading minus sign for negative amounts.
fn format_currency(amount: f64, symbol: &str) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, symbol, grouped, fraction)
}
