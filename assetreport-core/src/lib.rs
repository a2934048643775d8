//! Core library for asset report schema inference and export.
//!
//! Asset-management screens list records fetched from upstream APIs whose
//! field sets vary from record to record. This crate derives a stable column
//! schema for such record sets and exports them as tabular reports:
//!
//! - [`schema`]: union and canonical column inference, title derivation
//! - [`export`]: the export coordinator, view-state application and value
//!   normalization
//! - [`encoders`]: the encoder boundary plus the bundled CSV and printable
//!   HTML encoders
//! - [`validation`]: JSON Schema validation of export input documents
//!
//! # Architecture
//! - Encoders are trait objects registered per export kind
//! - Every export resolves to an [`ExportResult`]; failures never propagate
//! - Exports to the same artifact are serialized, everything else runs
//!   concurrently on tokio

pub mod config;
pub mod encoders;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod schema;
pub mod sentinel;
pub mod validation;

// Re-export commonly used types
pub use config::{ExportConfig, FormatPattern};
pub use encoders::{ReportEncoder, SpreadsheetEncoder};
pub use error::{ReportError, Result};
pub use export::{ExportCoordinator, ReportDocument};
pub use logging::init_logging;
pub use models::{
    ColumnDescriptor, ExportKind, ExportRequest, ExportResult, IDENTITY_FIELD, Record, SortOrder,
    SortSpec, ValueFormat, ViewState,
};
pub use schema::{ReportType, SchemaInferrer, infer_columns, title_case};

#[cfg(feature = "printable")]
pub use encoders::PrintableEncoder;

pub use validation::{
    InputDocument, ValidationError, initialize_input_validator, parse_input_document,
    validate_input_document,
};
