//! Schema inference from sampled records.
//!
//! Records of the same entity rarely share a field set: optional attributes
//! are omitted, nulled, or filled with "N/A" depending on the endpoint. The
//! inferrer walks every record, remembers where each field was first seen
//! and how often it carried real data, and derives a stable column order
//! from that.

use super::canonical::ReportType;
use crate::models::{ColumnDescriptor, IDENTITY_FIELD, Record};
use crate::sentinel::is_sentinel;
use serde::Serialize;
use std::collections::HashMap;

/// A field discovered while analyzing records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferredField {
    /// Field name as it appears in records
    pub name: String,
    /// Position of first discovery (1-based)
    pub ordinal_position: u32,
    /// Number of records in which the field was present
    pub occurrence_count: u32,
    /// Number of records in which the field held a non-sentinel value
    pub populated_count: u32,
}

impl InferredField {
    /// True when at least one record carried real data for this field.
    pub fn is_populated(&self) -> bool {
        self.populated_count > 0
    }
}

/// Result of analyzing a record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InferredSchema {
    /// Number of records analyzed
    pub records_analyzed: u32,
    /// Discovered fields in first-seen order
    pub fields: Vec<InferredField>,
}

impl InferredSchema {
    /// Columns for every populated field, in first-seen order.
    pub fn to_columns(&self) -> Vec<ColumnDescriptor> {
        self.fields
            .iter()
            .filter(|field| field.is_populated())
            .map(|field| ColumnDescriptor::from_key(&field.name))
            .collect()
    }
}

/// Accumulates field statistics record by record.
#[derive(Debug)]
pub struct SchemaInferrer {
    field_info: HashMap<String, FieldStats>,
    next_position: u32,
    record_count: u32,
}

#[derive(Debug, Clone)]
struct FieldStats {
    first_seen_position: u32,
    total_occurrences: u32,
    populated_occurrences: u32,
}

impl Default for SchemaInferrer {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaInferrer {
    /// Creates a new schema inferrer.
    pub fn new() -> Self {
        Self {
            field_info: HashMap::new(),
            next_position: 1,
            record_count: 0,
        }
    }

    /// Analyzes one record. The identity field is skipped.
    pub fn analyze_record(&mut self, record: &Record) {
        self.record_count = self.record_count.saturating_add(1);

        for (key, value) in record {
            if key == IDENTITY_FIELD {
                continue;
            }

            let stats = self.field_info.entry(key.clone()).or_insert_with(|| {
                let pos = self.next_position;
                self.next_position = self.next_position.saturating_add(1);
                FieldStats {
                    first_seen_position: pos,
                    total_occurrences: 0,
                    populated_occurrences: 0,
                }
            });

            stats.total_occurrences = stats.total_occurrences.saturating_add(1);
            if !is_sentinel(Some(value)) {
                stats.populated_occurrences = stats.populated_occurrences.saturating_add(1);
            }
        }
    }

    /// Analyzes every record of a slice, top to bottom.
    pub fn analyze_all(&mut self, records: &[Record]) {
        for record in records {
            self.analyze_record(record);
        }
    }

    /// Finalizes inference into fields sorted by first-seen position.
    pub fn finalize(self) -> InferredSchema {
        let mut fields: Vec<InferredField> = self
            .field_info
            .into_iter()
            .map(|(name, stats)| InferredField {
                name,
                ordinal_position: stats.first_seen_position,
                occurrence_count: stats.total_occurrences,
                populated_count: stats.populated_occurrences,
            })
            .collect();

        fields.sort_by_key(|f| f.ordinal_position);

        InferredSchema {
            records_analyzed: self.record_count,
            fields,
        }
    }
}

/// Derives the column schema for a record set.
///
/// - Empty `records` always yield an empty schema.
/// - With `include_all_fields` and a known `report_type`, the schema is that
///   report type's canonical field list, in its fixed order.
/// - Otherwise the schema is the union of populated fields across all
///   records in first-seen order. Unknown report types fall back here.
///
/// The identity field never appears in the result. This function is total.
pub fn infer_columns(
    records: &[Record],
    include_all_fields: bool,
    report_type: Option<&str>,
) -> Vec<ColumnDescriptor> {
    if records.is_empty() {
        return Vec::new();
    }

    if include_all_fields && let Some(tag) = report_type {
        match ReportType::from_tag(tag) {
            Some(known) => {
                return known
                    .canonical_fields()
                    .iter()
                    .map(|field| ColumnDescriptor::from_key(*field))
                    .collect();
            }
            None => {
                tracing::debug!(
                    "Unknown report type '{}', inferring columns from records",
                    tag
                );
            }
        }
    }

    let mut inferrer = SchemaInferrer::new();
    inferrer.analyze_all(records);
    inferrer.finalize().to_columns()
}
