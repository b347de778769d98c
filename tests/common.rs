//! Shared fixtures for the integration tests: a small on-disk template
//! catalog and converter doubles for each conversion outcome.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use docbot_server::catalog::TemplateCatalog;
use docbot_server::convert::{ConversionFailure, PdfArtifact, PdfConverter};
use docbot_server::render::RenderedDocument;
use docbot_server::report::Reporter;
use docbot_server::AppState;

pub const TEST_TOKEN: &str = "test-chat-token";

/// Write a minimal catalog with one `leave_request` template into `dir`.
pub fn write_leave_request_catalog(dir: &Path) {
    let schema = r#"{
        "name": "Leave request",
        "fields": [
            { "key": "employee_name", "prompt": "Employee name:", "type": "text" },
            { "key": "start_date", "prompt": "First day of leave:", "type": "date" },
            { "key": "days", "prompt": "Number of days:", "type": "number", "min": 1, "max": 30 }
        ]
    }"#;
    let asset = "# Leave Request\n\n\
        Employee: {{ employee_name }}\n\n\
        - First day: {{ start_date }}\n\
        - Duration: {{ days }} day(s)\n";
    std::fs::write(dir.join("leave_request.json"), schema).unwrap();
    std::fs::write(dir.join("leave_request.tpl"), asset).unwrap();
}

pub fn leave_request_catalog() -> (tempfile::TempDir, Arc<TemplateCatalog>) {
    let dir = tempfile::tempdir().unwrap();
    write_leave_request_catalog(dir.path());
    let catalog = Arc::new(TemplateCatalog::load(dir.path()).unwrap());
    (dir, catalog)
}

/// Converter double that always succeeds with a tiny PDF-looking payload.
pub struct OkConverter;

#[async_trait]
impl PdfConverter for OkConverter {
    async fn convert(&self, doc: &RenderedDocument) -> Result<PdfArtifact, ConversionFailure> {
        let stem = doc.filename.trim_end_matches(".docx");
        Ok(PdfArtifact {
            filename: format!("{stem}.pdf"),
            pdf: b"%PDF-1.4 test".to_vec(),
        })
    }
}

/// Converter double that always fails with the configured reason.
pub struct FailingConverter(pub ConversionFailure);

#[async_trait]
impl PdfConverter for FailingConverter {
    async fn convert(&self, _doc: &RenderedDocument) -> Result<PdfArtifact, ConversionFailure> {
        Err(self.0.clone())
    }
}

/// Converter double that stalls before reporting a timeout, like a wedged
/// office process hitting its deadline.
pub struct SlowConverter(pub Duration);

#[async_trait]
impl PdfConverter for SlowConverter {
    async fn convert(&self, _doc: &RenderedDocument) -> Result<PdfArtifact, ConversionFailure> {
        tokio::time::sleep(self.0).await;
        Err(ConversionFailure::Timeout)
    }
}

/// App state over the fixture catalog and the given converter double. The
/// returned tempdir keeps the catalog files alive for the test's duration.
pub fn test_state(converter: Arc<dyn PdfConverter>) -> (tempfile::TempDir, AppState) {
    let (dir, catalog) = leave_request_catalog();
    let state = AppState::with_parts(
        catalog,
        converter,
        Reporter::new(None),
        TEST_TOKEN.to_string(),
    );
    (dir, state)
}
