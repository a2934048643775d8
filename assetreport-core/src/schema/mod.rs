//! Column schema inference for heterogeneous record sets.
//!
//! Screens either pass an explicit column list or let the schema be derived
//! from the records themselves:
//! - **Union mode**: every populated field, in first-seen order
//! - **Canonical mode**: the fixed field list of a known report type, so
//!   export templates stay stable across data snapshots
//!
//! # Example
//! ```rust
//! use assetreport_core::schema::infer_columns;
//! use serde_json::json;
//!
//! let records: Vec<_> = [
//!     json!({"asset_id": "A1", "status": "Active"}),
//!     json!({"asset_id": "A2", "category": "IT"}),
//! ]
//! .into_iter()
//! .filter_map(|v| v.as_object().cloned())
//! .collect();
//!
//! let columns = infer_columns(&records, false, None);
//! let titles: Vec<_> = columns.iter().map(|c| c.title.as_str()).collect();
//! assert_eq!(titles, ["Asset Id", "Status", "Category"]);
//! ```

mod canonical;
mod inference;
mod title;

pub use canonical::ReportType;
pub use inference::{InferredField, InferredSchema, SchemaInferrer, infer_columns};
pub use title::title_case;
