//! JSON Schema validation for export input documents.
//!
//! An input document is either a bare array of records or an object carrying
//! the records plus optional columns, title, report type and table view
//! state. Structure is checked against an embedded JSON Schema; rules the
//! schema cannot express (unique column keys, the reserved identity field)
//! are checked afterwards.
//!
//! # Example
//! ```rust
//! use assetreport_core::validation::parse_input_document;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let document = parse_input_document(
//!     r#"{
//!         "records": [{"key": 1, "asset_id": "A1"}],
//!         "title": "Register",
//!         "sorter": {"field": "asset_id", "order": "ascend"}
//!     }"#,
//! )?;
//! assert_eq!(document.records.len(), 1);
//! assert_eq!(document.title.as_deref(), Some("Register"));
//! # Ok(())
//! # }
//! ```

use crate::models::{ColumnDescriptor, ExportRequest, IDENTITY_FIELD, Record, SortSpec, ViewState};
use jsonschema::Validator;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;
use thiserror::Error;

/// Input document validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema compilation failed during initialization
    #[error("JSON Schema compilation failed: {message}")]
    SchemaCompilation { message: String },

    /// The document does not match the input schema
    #[error("Input validation failed with {error_count} errors: {errors:?}")]
    ValidationFailed {
        error_count: usize,
        errors: Vec<String>,
    },

    /// Two columns resolve to the same key
    #[error("Duplicate column key '{key}'")]
    DuplicateColumn { key: String },

    /// A column names the reserved list-rendering field
    #[error("Column '{key}' uses the reserved identity field '{field}'", field = IDENTITY_FIELD)]
    ReservedColumn { key: String },

    /// JSON parsing error
    #[error("JSON parsing failed: {source}")]
    JsonParsing {
        #[from]
        source: serde_json::Error,
    },
}

/// Embedded JSON Schema for export input documents
const INPUT_SCHEMA: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "Asset report export input",
  "$defs": {
    "records": {
      "type": "array",
      "items": { "type": "object" }
    },
    "column": {
      "type": "object",
      "properties": {
        "key": { "type": "string", "minLength": 1 },
        "dataIndex": { "type": "string", "minLength": 1 },
        "title": { "type": "string" },
        "format": { "enum": ["plain", "currency", "date"] }
      },
      "anyOf": [
        { "required": ["key"] },
        { "required": ["dataIndex"] }
      ]
    }
  },
  "oneOf": [
    { "$ref": "#/$defs/records" },
    {
      "type": "object",
      "required": ["records"],
      "properties": {
        "records": { "$ref": "#/$defs/records" },
        "columns": {
          "type": ["array", "null"],
          "items": { "$ref": "#/$defs/column" }
        },
        "title": { "type": "string" },
        "filename": { "type": "string" },
        "reportType": { "type": ["string", "null"] },
        "filters": {
          "type": ["object", "null"],
          "additionalProperties": { "type": ["array", "null"] }
        },
        "sorter": {
          "type": ["object", "null"],
          "properties": {
            "field": { "type": ["string", "null"] },
            "columnKey": { "type": ["string", "null"] },
            "order": { "enum": ["ascend", "descend", null] }
          }
        }
      }
    }
  ]
}"##;

/// Compiled JSON Schema instance (initialized once)
static COMPILED_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Parsed, validated export input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputDocument {
    pub records: Vec<Record>,
    pub columns: Option<Vec<ColumnDescriptor>>,
    pub title: Option<String>,
    pub filename: Option<String>,
    pub report_type: Option<String>,
    pub view: ViewState,
}

impl InputDocument {
    /// Builds an export request, keeping the request defaults for anything
    /// the document leaves out.
    pub fn into_request(self) -> ExportRequest {
        let mut request = ExportRequest::new(self.records).with_view(self.view);
        request.columns = self.columns;
        request.report_type = self.report_type;
        if let Some(title) = self.title {
            request.title = title;
        }
        if let Some(filename) = self.filename {
            request.filename = filename;
        }
        request
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Bare(Vec<Record>),
    Wrapped(Box<WrappedDocument>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WrappedDocument {
    records: Vec<Record>,
    #[serde(default)]
    columns: Option<Vec<ColumnDescriptor>>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    report_type: Option<String>,
    #[serde(default)]
    filters: Option<BTreeMap<String, Option<Vec<Value>>>>,
    #[serde(default)]
    sorter: Option<SortSpec>,
}

impl From<RawDocument> for InputDocument {
    fn from(raw: RawDocument) -> Self {
        match raw {
            RawDocument::Bare(records) => Self {
                records,
                ..Self::default()
            },
            RawDocument::Wrapped(doc) => {
                let doc = *doc;
                Self {
                    records: doc.records,
                    columns: doc.columns,
                    title: doc.title,
                    filename: doc.filename,
                    report_type: doc.report_type,
                    view: ViewState {
                        filters: doc.filters.unwrap_or_default(),
                        sorter: doc.sorter.unwrap_or_default(),
                    },
                }
            }
        }
    }
}

/// Initialize and compile the input JSON Schema
///
/// Calling this more than once is harmless; the first compiled schema is
/// kept.
///
/// # Errors
/// Returns `ValidationError::SchemaCompilation` if the embedded schema is invalid.
pub fn initialize_input_validator() -> Result<(), ValidationError> {
    if COMPILED_SCHEMA.get().is_some() {
        return Ok(());
    }

    let schema_json: Value =
        serde_json::from_str(INPUT_SCHEMA).map_err(|e| ValidationError::SchemaCompilation {
            message: format!("Failed to parse embedded schema: {}", e),
        })?;

    let compiled = jsonschema::validator_for(&schema_json).map_err(|e| {
        ValidationError::SchemaCompilation {
            message: format!("Schema compilation error: {}", e),
        }
    })?;

    let _ = COMPILED_SCHEMA.set(compiled);

    Ok(())
}

fn validator() -> Result<&'static Validator, ValidationError> {
    initialize_input_validator()?;
    COMPILED_SCHEMA
        .get()
        .ok_or_else(|| ValidationError::SchemaCompilation {
            message: "Input validator not initialized".to_string(),
        })
}

/// Validate an input document against the embedded schema and the column
/// rules.
///
/// # Errors
/// Returns every schema violation found, or the first column rule broken.
pub fn validate_input_document(json_value: &Value) -> Result<(), ValidationError> {
    let schema = validator()?;

    let errors: Vec<String> = schema
        .iter_errors(json_value)
        .map(|error| error.to_string())
        .collect();
    if !errors.is_empty() {
        return Err(ValidationError::ValidationFailed {
            error_count: errors.len(),
            errors,
        });
    }

    if let Some(columns) = json_value.get("columns").and_then(Value::as_array) {
        let columns: Vec<ColumnDescriptor> = columns
            .iter()
            .cloned()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?;
        validate_columns(&columns)?;
    }

    Ok(())
}

/// Rejects duplicate column keys and columns bound to the identity field.
pub fn validate_columns(columns: &[ColumnDescriptor]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for column in columns {
        if column.key == IDENTITY_FIELD || column.data_index == IDENTITY_FIELD {
            return Err(ValidationError::ReservedColumn {
                key: column.key.clone(),
            });
        }
        if !seen.insert(column.key.as_str()) {
            return Err(ValidationError::DuplicateColumn {
                key: column.key.clone(),
            });
        }
    }
    Ok(())
}

/// Parse, validate and load an input document.
///
/// # Errors
/// Returns validation errors for malformed JSON, schema violations or
/// invalid column lists.
pub fn parse_input_document(json_str: &str) -> Result<InputDocument, ValidationError> {
    let json_value: Value = serde_json::from_str(json_str)?;

    validate_input_document(&json_value)?;

    let raw: RawDocument = serde_json::from_value(json_value)?;
    Ok(raw.into())
}

/// The embedded input schema as a parsed value.
pub fn get_input_schema() -> Result<Value, ValidationError> {
    serde_json::from_str(INPUT_SCHEMA).map_err(|e| ValidationError::SchemaCompilation {
        message: format!("Failed to parse embedded schema: {}", e),
    })
}
