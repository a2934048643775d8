//! End-to-end export tests: coordinator, bundled encoders and failure
//! containment with stub encoders.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use assetreport_core::{
    ColumnDescriptor, ExportConfig, ExportCoordinator, ExportKind, ExportRequest, Record,
    ReportDocument, ReportEncoder, ReportError, SortOrder, SortSpec, ViewState,
};
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
    values
        .into_iter()
        .map(|v| v.as_object().cloned().expect("record must be an object"))
        .collect()
}

fn register_records() -> Vec<Record> {
    records(vec![
        json!({"key": 1, "asset_id": "A1", "status": "Active", "purchase_value": 1200}),
        json!({"key": 2, "asset_id": "A2", "status": "Disposed", "purchase_value": "N/A"}),
        json!({"key": 3, "asset_id": "A3", "status": "Active", "category": "IT"}),
    ])
}

/// Encoder that always fails with a fixed message.
struct FailingEncoder(&'static str);

#[async_trait]
impl ReportEncoder for FailingEncoder {
    fn kind(&self) -> ExportKind {
        ExportKind::Excel
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }

    async fn encode(&self, _document: &ReportDocument) -> assetreport_core::Result<PathBuf> {
        Err(ReportError::encoder(self.0))
    }
}

/// Encoder that panics mid-encode.
struct PanickingEncoder;

#[async_trait]
impl ReportEncoder for PanickingEncoder {
    fn kind(&self) -> ExportKind {
        ExportKind::Pdf
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    async fn encode(&self, _document: &ReportDocument) -> assetreport_core::Result<PathBuf> {
        panic!("layout engine exploded");
    }
}

/// Encoder that records how many encodes overlap and captures its input.
#[derive(Default)]
struct RecordingEncoder {
    delay: Duration,
    running: AtomicUsize,
    max_running: AtomicUsize,
    calls: AtomicUsize,
    last_rows: std::sync::Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl ReportEncoder for RecordingEncoder {
    fn kind(&self) -> ExportKind {
        ExportKind::Excel
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }

    async fn encode(&self, document: &ReportDocument) -> assetreport_core::Result<PathBuf> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
        let finished = tokio::select! {
            _ = document.cancellation.cancelled() => false,
            _ = tokio::time::sleep(self.delay) => true,
        };
        self.running.fetch_sub(1, Ordering::SeqCst);
        if !finished {
            return Err(ReportError::Cancelled);
        }
        *self.last_rows.lock().unwrap() = document.text_rows();
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PathBuf::from(format!("{}.xlsx", document.filename)))
    }
}

/// Encoder doing its work on the blocking pool without checking for
/// cancellation, like a synchronous file writer.
#[derive(Default)]
struct BlockingEncoder {
    running: Arc<AtomicUsize>,
    max_running: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ReportEncoder for BlockingEncoder {
    fn kind(&self) -> ExportKind {
        ExportKind::Excel
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }

    async fn encode(&self, document: &ReportDocument) -> assetreport_core::Result<PathBuf> {
        let running = Arc::clone(&self.running);
        let max_running = Arc::clone(&self.max_running);
        let calls = Arc::clone(&self.calls);
        tokio::task::spawn_blocking(move || {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            max_running.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(200));
            running.fetch_sub(1, Ordering::SeqCst);
            calls.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .map_err(|e| ReportError::encoder(e.to_string()))?;
        Ok(PathBuf::from(format!("{}.xlsx", document.filename)))
    }
}

fn coordinator_with(encoder: Arc<dyn ReportEncoder>) -> ExportCoordinator {
    ExportCoordinator::new(ExportConfig::default())
        .expect("default config is valid")
        .with_encoder(encoder)
}

#[tokio::test]
async fn test_encoder_failure_is_contained() {
    let coordinator = coordinator_with(Arc::new(FailingEncoder("disk full")));
    let request = ExportRequest::new(register_records())
        .with_columns(vec![ColumnDescriptor::from_key("asset_id")])
        .with_filename("f")
        .with_title("t")
        .with_report_type("x");

    let result = coordinator.export("excel", &request).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("disk full"));
    assert_eq!(result.record_count, None);
    assert_eq!(
        result.notification(ExportKind::Excel.label()),
        "Failed to export EXCEL: disk full"
    );
}

#[tokio::test]
async fn test_unsupported_kind() {
    let coordinator = coordinator_with(Arc::new(RecordingEncoder::default()));
    let request = ExportRequest::new(register_records());

    let result = coordinator.export("docx", &request).await;

    assert!(!result.success);
    assert!(
        result
            .error
            .as_deref()
            .unwrap()
            .starts_with("unsupported export kind")
    );
}

#[tokio::test]
async fn test_missing_encoder_is_an_error_result() {
    let coordinator = ExportCoordinator::new(ExportConfig::default()).unwrap();
    let result = coordinator
        .export("pdf", &ExportRequest::new(register_records()))
        .await;

    assert!(!result.success);
    assert!(!result.error.unwrap().is_empty());
}

#[tokio::test]
async fn test_panicking_encoder_is_contained() {
    let coordinator = coordinator_with(Arc::new(PanickingEncoder));
    let result = coordinator
        .export("pdf", &ExportRequest::new(register_records()))
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("pdf encoder panicked"));
}

#[tokio::test]
async fn test_cancelled_export() {
    let encoder = Arc::new(RecordingEncoder {
        delay: Duration::from_secs(30),
        ..RecordingEncoder::default()
    });
    let coordinator = coordinator_with(encoder.clone());
    let request = ExportRequest::new(register_records());
    let token = CancellationToken::new();

    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        })
    };

    let result = coordinator
        .export_with_cancellation("excel", &request, token)
        .await;
    canceller.await.unwrap();

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("cancelled"));
    assert_eq!(encoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancelled_export_holds_artifact_until_encoder_stops() {
    let encoder = Arc::new(BlockingEncoder::default());
    let coordinator = Arc::new(coordinator_with(encoder.clone()));
    let request = Arc::new(ExportRequest::new(register_records()).with_filename("assets"));
    let token = CancellationToken::new();

    let first = {
        let coordinator = Arc::clone(&coordinator);
        let request = Arc::clone(&request);
        let token = token.clone();
        tokio::spawn(async move {
            coordinator
                .export_with_cancellation("excel", &request, token)
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(30)).await;
    token.cancel();
    let second = {
        let coordinator = Arc::clone(&coordinator);
        let request = Arc::clone(&request);
        tokio::spawn(async move { coordinator.export("excel", &request).await })
    };

    let first = first.await.unwrap();
    assert_eq!(first.error.as_deref(), Some("cancelled"));
    assert_eq!(encoder.calls.load(Ordering::SeqCst), 1);

    assert!(second.await.unwrap().success);
    assert_eq!(encoder.calls.load(Ordering::SeqCst), 2);
    assert_eq!(encoder.max_running.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let coordinator = coordinator_with(Arc::new(RecordingEncoder::default()));
    let token = CancellationToken::new();
    token.cancel();

    let result = coordinator
        .export_with_cancellation("excel", &ExportRequest::new(register_records()), token)
        .await;

    assert_eq!(result.error.as_deref(), Some("cancelled"));
}

#[tokio::test]
async fn test_row_count_fidelity_and_placeholder() {
    let encoder = Arc::new(RecordingEncoder::default());
    let coordinator = coordinator_with(encoder.clone());
    let request = ExportRequest::new(register_records()).with_columns(vec![
        ColumnDescriptor::from_key("asset_id"),
        ColumnDescriptor::from_key("purchase_value"),
        ColumnDescriptor::from_key("category"),
    ]);

    let result = coordinator.export("EXCEL", &request).await;

    assert!(result.success);
    assert_eq!(result.record_count, Some(3));
    assert_eq!(
        result.notification("EXCEL"),
        "EXCEL export completed successfully. 3 records exported."
    );

    let rows = encoder.last_rows.lock().unwrap().clone();
    assert_eq!(
        rows,
        vec![
            vec!["A1", "$1,200.00", "-"],
            vec!["A2", "-", "-"],
            vec!["A3", "-", "IT"],
        ]
    );
}

#[tokio::test]
async fn test_view_state_applied_before_normalization() {
    let encoder = Arc::new(RecordingEncoder::default());
    let coordinator = coordinator_with(encoder.clone());
    let view = ViewState::default()
        .with_filter("status", vec![json!("active")])
        .with_sorter(SortSpec::new("asset_id", SortOrder::Descend));
    let request = ExportRequest::new(register_records())
        .with_columns(vec![ColumnDescriptor::from_key("asset_id")])
        .with_view(view);

    let result = coordinator.export("excel", &request).await;

    assert_eq!(result.record_count, Some(2));
    let rows = encoder.last_rows.lock().unwrap().clone();
    assert_eq!(rows, vec![vec!["A3"], vec!["A1"]]);
}

#[tokio::test]
async fn test_view_state_metadata_only() {
    let encoder = Arc::new(RecordingEncoder::default());
    let coordinator = ExportCoordinator::new(ExportConfig::default().with_apply_view_state(false))
        .unwrap()
        .with_encoder(encoder.clone());
    let view = ViewState::default().with_filter("status", vec![json!("Active")]);
    let request = ExportRequest::new(register_records()).with_view(view);

    let document = coordinator.prepare(&request);
    assert_eq!(document.record_count(), 3);
    assert_eq!(document.view_description, vec!["Filtered by Status: Active"]);

    let result = coordinator.export("excel", &request).await;
    assert_eq!(result.record_count, Some(3));
}

#[tokio::test]
async fn test_inferred_columns_use_canonical_list() {
    let coordinator = ExportCoordinator::new(ExportConfig::default()).unwrap();
    let request = ExportRequest::new(records(vec![json!({"asset_id": "A1"})]))
        .with_report_type("disposal-management");

    let document = coordinator.prepare(&request);

    assert_eq!(document.columns.len(), 8);
    assert_eq!(document.columns[0].key, "asset_id");
    assert_eq!(
        document.text_rows(),
        vec![vec!["A1", "-", "-", "-", "-", "-", "-", "-"]]
    );
}

#[tokio::test]
async fn test_same_artifact_exports_are_serialized() {
    let encoder = Arc::new(RecordingEncoder {
        delay: Duration::from_millis(30),
        ..RecordingEncoder::default()
    });
    let coordinator = Arc::new(coordinator_with(encoder.clone()));
    let request = Arc::new(ExportRequest::new(register_records()).with_filename("assets"));

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let coordinator = Arc::clone(&coordinator);
            let request = Arc::clone(&request);
            tokio::spawn(async move { coordinator.export("excel", &request).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().success);
    }
    assert_eq!(encoder.calls.load(Ordering::SeqCst), 3);
    assert_eq!(encoder.max_running.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_filename_spellings_of_one_artifact_are_serialized() {
    let encoder = Arc::new(RecordingEncoder {
        delay: Duration::from_millis(30),
        ..RecordingEncoder::default()
    });
    let coordinator = coordinator_with(encoder.clone());
    let plain = ExportRequest::new(register_records()).with_filename("assets");
    let with_extension = ExportRequest::new(register_records()).with_filename("assets.xlsx");
    let with_directory = ExportRequest::new(register_records()).with_filename("x/assets");

    let (a, b, c) = tokio::join!(
        coordinator.export("excel", &plain),
        coordinator.export("excel", &with_extension),
        coordinator.export("excel", &with_directory),
    );

    assert!(a.success && b.success && c.success);
    assert_eq!(encoder.calls.load(Ordering::SeqCst), 3);
    assert_eq!(encoder.max_running.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_distinct_artifacts_run_concurrently() {
    let encoder = Arc::new(RecordingEncoder {
        delay: Duration::from_millis(50),
        ..RecordingEncoder::default()
    });
    let coordinator = Arc::new(coordinator_with(encoder.clone()));

    let handles: Vec<_> = ["assets", "transfers", "disposals"]
        .into_iter()
        .map(|name| {
            let coordinator = Arc::clone(&coordinator);
            let request = ExportRequest::new(register_records()).with_filename(name);
            tokio::spawn(async move { coordinator.export("excel", &request).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().success);
    }
    assert!(encoder.max_running.load(Ordering::SeqCst) > 1);
}

#[tokio::test]
async fn test_default_encoders_write_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let coordinator =
        ExportCoordinator::with_default_encoders(ExportConfig::default().with_output_dir(dir.path()))
            .unwrap();
    let request = ExportRequest::new(register_records())
        .with_filename("register")
        .with_title("Asset Register");

    let excel = coordinator.export("excel", &request).await;
    assert!(excel.success, "{:?}", excel.error);
    let csv_path = excel.artifact.unwrap();
    assert_eq!(csv_path, dir.path().join("register.csv"));
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.contains("Asset Id,Status,Purchase Value,Category"));
    assert!(csv.contains("A2,Disposed,-,-"));

    let pdf = coordinator.export("pdf", &request).await;
    assert!(pdf.success, "{:?}", pdf.error);
    let html = std::fs::read_to_string(pdf.artifact.unwrap()).unwrap();
    assert!(html.contains("Asset Register"));
    assert!(html.contains("3 records"));
}

#[tokio::test]
async fn test_empty_records_export_zero_rows() {
    let dir = tempfile::tempdir().unwrap();
    let coordinator =
        ExportCoordinator::with_default_encoders(ExportConfig::default().with_output_dir(dir.path()))
            .unwrap();

    let result = coordinator
        .export(
            "excel",
            &ExportRequest::new(Vec::new()).with_report_type("asset-register"),
        )
        .await;

    assert!(result.success);
    assert_eq!(result.record_count, Some(0));
}
