//! DOCX to PDF conversion through a headless LibreOffice run.
//!
//! The native artifact is written to a temporary directory, the external
//! binary is invoked with a hard deadline, and the produced PDF is read
//! back. The temporary directory disappears with the conversion attempt.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use tokio::time::timeout;

use crate::render::RenderedDocument;

use super::{ConversionFailure, PdfArtifact, PdfConverter};

pub struct SofficeConverter {
    binary: String,
    deadline: Duration,
}

impl SofficeConverter {
    pub fn new(binary: impl Into<String>, deadline: Duration) -> Self {
        Self {
            binary: binary.into(),
            deadline,
        }
    }

    async fn run(&self, doc: &RenderedDocument) -> Result<PdfArtifact, ConversionFailure> {
        let workdir = tempfile::tempdir()
            .map_err(|e| ConversionFailure::Unknown(format!("tempdir: {e}")))?;

        let docx_path = workdir.path().join(&doc.filename);
        fs::write(&docx_path, &doc.docx)
            .await
            .map_err(|e| ConversionFailure::Unknown(format!("write input: {e}")))?;

        let running = Command::new(&self.binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(workdir.path())
            .arg(&docx_path)
            .current_dir(workdir.path())
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.deadline, running).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(ConversionFailure::ToolUnavailable);
            }
            Ok(Err(e)) => return Err(ConversionFailure::Unknown(e.to_string())),
            // kill_on_drop reaps the hung process when the future is dropped.
            Err(_) => return Err(ConversionFailure::Timeout),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConversionFailure::UnsupportedContent(
                stderr.lines().next().unwrap_or("nonzero exit").to_string(),
            ));
        }

        let pdf_path = docx_path.with_extension("pdf");
        let pdf = fs::read(&pdf_path).await.map_err(|_| {
            ConversionFailure::Unknown(format!(
                "converter exited cleanly but produced no {}",
                pdf_path.display()
            ))
        })?;

        Ok(PdfArtifact {
            filename: pdf_filename(&doc.filename),
            pdf,
        })
    }
}

#[async_trait]
impl PdfConverter for SofficeConverter {
    async fn convert(&self, doc: &RenderedDocument) -> Result<PdfArtifact, ConversionFailure> {
        log::debug!(
            "converting '{}' with {} (deadline {:?})",
            doc.filename,
            self.binary,
            self.deadline
        );
        let result = self.run(doc).await;
        if let Err(failure) = &result {
            log::warn!("conversion of '{}' failed: {failure}", doc.filename);
        }
        result
    }
}

fn pdf_filename(docx_filename: &str) -> String {
    let stem = Path::new(docx_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    format!("{stem}.pdf")
}
