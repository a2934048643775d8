//! Report encoder trait and bundled encoders.
//!
//! Encoders are the boundary to format-specific serialization. Each one
//! turns a [`ReportDocument`] into an artifact on disk and reports failure
//! only through its `Result`. The coordinator owns everything before that
//! point (schema, normalization, view state).
//!
//! Bundled encoders:
//! - [`SpreadsheetEncoder`] (`excel`): Excel-compatible CSV
//! - [`PrintableEncoder`] (`pdf`): print-ready HTML for print-to-PDF
//!
//! Byte-level XLSX or PDF writers plug in by implementing [`ReportEncoder`]
//! and registering with `ExportCoordinator::with_encoder`.

use crate::error::{ReportError, Result};
use crate::export::ReportDocument;
use crate::models::ExportKind;
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

#[cfg(feature = "printable")]
mod printable;
mod spreadsheet;

#[cfg(feature = "printable")]
pub use printable::PrintableEncoder;
pub use spreadsheet::SpreadsheetEncoder;

/// Format-specific report serializer.
///
/// # Object Safety
/// This trait is object-safe; coordinators hold encoders as
/// `Arc<dyn ReportEncoder>`.
#[async_trait]
pub trait ReportEncoder: Send + Sync {
    /// The export kind this encoder produces
    fn kind(&self) -> ExportKind;

    /// File extension of produced artifacts, without the dot
    fn extension(&self) -> &'static str;

    /// Serializes the document and delivers the artifact.
    ///
    /// # Returns
    /// The path of the written artifact
    ///
    /// # Errors
    /// Any error is reported to the user verbatim. Implementations must not
    /// leave a partially written artifact at the returned path, and should
    /// return [`ReportError::Cancelled`] without writing once
    /// `document.cancellation` has fired.
    async fn encode(&self, document: &ReportDocument) -> Result<PathBuf>;
}

/// The file stem an artifact for `filename` is written under.
///
/// Directory components and any extension are dropped; an empty name falls
/// back to `report`.
pub fn artifact_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && *s != "..")
        .unwrap_or("report")
}

/// Computes `<output_dir>/<stem>.<extension>` for a requested filename.
pub fn artifact_path(output_dir: &Path, filename: &str, extension: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", artifact_stem(filename), extension))
}

/// Writes `bytes` to `path` through a temp file in the same directory, so
/// readers see either the previous artifact or the complete new one.
///
/// Nothing is persisted once `cancellation` has fired; the temp file is
/// removed instead.
pub(crate) fn write_atomically(
    path: &Path,
    bytes: &[u8],
    cancellation: &CancellationToken,
) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(dir)
        .map_err(|e| ReportError::io(format!("Failed to create {}", dir.display()), e))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        ReportError::io(format!("Failed to create temp file in {}", dir.display()), e)
    })?;
    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| ReportError::io(format!("Failed to write {}", path.display()), e))?;

    if cancellation.is_cancelled() {
        return Err(ReportError::Cancelled);
    }
    temp.persist(path)
        .map_err(|e| ReportError::io(format!("Failed to persist {}", path.display()), e.error))?;

    Ok(())
}

/// Runs [`write_atomically`] on the blocking pool.
pub(crate) async fn write_artifact(
    path: PathBuf,
    bytes: Vec<u8>,
    cancellation: CancellationToken,
) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || {
        write_atomically(&path, &bytes, &cancellation).map(|()| path)
    })
    .await
    .map_err(|e| ReportError::encoder(format!("artifact write task failed: {}", e)))?
}
