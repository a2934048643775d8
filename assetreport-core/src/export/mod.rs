//! Export pipeline.
//!
//! An export turns an [`ExportRequest`](crate::models::ExportRequest) into a
//! file artifact and a uniform [`ExportResult`](crate::models::ExportResult):
//!
//! 1. resolve columns (explicit or inferred)
//! 2. apply the table's filter and sort state
//! 3. normalize values (sentinels, currency, dates)
//! 4. hand the [`ReportDocument`] to the encoder registered for the kind
//!
//! Exports to the same `(filename, kind)` pair are serialized; everything
//! else runs concurrently.

mod coordinator;
mod document;
mod inflight;
mod normalize;
mod view;

pub use coordinator::ExportCoordinator;
pub use document::ReportDocument;
pub use normalize::RowNormalizer;
pub use view::{apply_view, describe_view};
