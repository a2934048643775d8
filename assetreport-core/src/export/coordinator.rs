//! Export coordinator: resolve columns, normalize, encode, report.

use super::document::ReportDocument;
use super::inflight::InFlightRegistry;
use super::normalize::RowNormalizer;
use super::view::{apply_view, describe_view};
use crate::config::ExportConfig;
use crate::encoders::ReportEncoder;
use crate::error::{ReportError, Result};
use crate::models::{ExportKind, ExportRequest, ExportResult};
use crate::schema::infer_columns;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs exports through registered encoders.
///
/// Each call is a linear pipeline: `infer (optional) → view → normalize →
/// encode → result`. Failures of any stage come back as an unsuccessful
/// [`ExportResult`]; nothing is propagated to the caller.
pub struct ExportCoordinator {
    config: ExportConfig,
    normalizer: RowNormalizer,
    encoders: HashMap<ExportKind, Arc<dyn ReportEncoder>>,
    in_flight: Arc<InFlightRegistry>,
}

impl std::fmt::Debug for ExportCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportCoordinator")
            .field("config", &self.config)
            .field("encoders", &self.encoders.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ExportCoordinator {
    /// Creates a coordinator with no encoders registered.
    ///
    /// # Errors
    /// Returns a configuration error if `config` is invalid.
    pub fn new(config: ExportConfig) -> Result<Self> {
        let normalizer = RowNormalizer::new(&config)?;
        Ok(Self {
            config,
            normalizer,
            encoders: HashMap::new(),
            in_flight: Arc::default(),
        })
    }

    /// Creates a coordinator with the bundled encoders writing into
    /// `config.output_dir`.
    pub fn with_default_encoders(config: ExportConfig) -> Result<Self> {
        let output_dir = config.output_dir.clone();
        let coordinator = Self::new(config)?.with_encoder(Arc::new(
            crate::encoders::SpreadsheetEncoder::new(output_dir.clone()),
        ));

        #[cfg(feature = "printable")]
        let coordinator = coordinator.with_encoder(Arc::new(
            crate::encoders::PrintableEncoder::new(output_dir),
        ));

        Ok(coordinator)
    }

    /// Builder method to register an encoder, replacing any previous
    /// encoder for the same kind.
    pub fn with_encoder(mut self, encoder: Arc<dyn ReportEncoder>) -> Self {
        self.encoders.insert(encoder.kind(), encoder);
        self
    }

    /// The configuration this coordinator was built with.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Builds the encoder input for a request without encoding it.
    ///
    /// Columns are inferred with `include_all_fields = true` when the
    /// request carries none.
    pub fn prepare(&self, request: &ExportRequest) -> ReportDocument {
        let columns = match &request.columns {
            Some(columns) => columns.clone(),
            None => infer_columns(&request.records, true, request.report_type.as_deref()),
        };

        let rows = if self.config.apply_view_state && !request.view.is_empty() {
            let visible = apply_view(&request.records, &request.view);
            debug!(
                "View state kept {} of {} records",
                visible.len(),
                request.records.len()
            );
            self.normalizer.normalize_all(&visible, &columns)
        } else {
            self.normalizer.normalize_all(&request.records, &columns)
        };

        ReportDocument {
            title: request.title.clone(),
            filename: request.filename.clone(),
            report_type: request.report_type.clone(),
            columns,
            rows,
            view_description: describe_view(&request.view),
            placeholder: self.config.placeholder.clone(),
            generated_at: chrono::Utc::now(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Exports `request` in the format named by `kind` (`"excel"`/`"pdf"`).
    pub async fn export(&self, kind: &str, request: &ExportRequest) -> ExportResult {
        self.export_with_cancellation(kind, request, CancellationToken::new())
            .await
    }

    /// Like [`export`](Self::export), resolving to a `"cancelled"` failure
    /// if `token` fires before the encoder finishes.
    ///
    /// A cancelled export resolves only after its encoder has stopped, and
    /// holds its artifact until then.
    pub async fn export_with_cancellation(
        &self,
        kind: &str,
        request: &ExportRequest,
        token: CancellationToken,
    ) -> ExportResult {
        match self.run(kind, request, &token).await {
            Ok((record_count, artifact)) => {
                info!(
                    "✓ {} export '{}' wrote {} records to {}",
                    kind,
                    request.filename,
                    record_count,
                    artifact.display()
                );
                ExportResult::succeeded(record_count, Some(artifact))
            }
            Err(e) => {
                if e.is_cancelled() {
                    info!("{} export '{}' cancelled", kind, request.filename);
                } else {
                    warn!("{} export '{}' failed: {}", kind, request.filename, e);
                }
                ExportResult::failed(&e)
            }
        }
    }

    async fn run(
        &self,
        kind: &str,
        request: &ExportRequest,
        token: &CancellationToken,
    ) -> Result<(usize, PathBuf)> {
        let kind: ExportKind = kind.parse()?;
        let encoder = self
            .encoders
            .get(&kind)
            .cloned()
            .ok_or_else(|| ReportError::missing_encoder(kind.to_string()))?;

        let slot = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(ReportError::Cancelled),
            slot = self.in_flight.acquire(&request.filename, kind) => slot,
        };

        let mut document = self.prepare(request);
        document.cancellation = token.child_token();
        let record_count = document.record_count();

        // Encoders run on their own task so that a panic stays contained. The
        // slot travels with the task and is released only once it has ended.
        let mut handle = tokio::spawn(async move {
            let _slot = slot;
            encoder.encode(&document).await
        });

        let joined = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("Waiting for cancelled {} encoder to stop", kind);
                let _ = (&mut handle).await;
                return Err(ReportError::Cancelled);
            }
            joined = &mut handle => joined,
        };

        let artifact = match joined {
            Ok(result) => result?,
            Err(e) if e.is_panic() => {
                return Err(ReportError::encoder(format!("{} encoder panicked", kind)));
            }
            Err(_) => return Err(ReportError::Cancelled),
        };

        Ok((record_count, artifact))
    }
}
