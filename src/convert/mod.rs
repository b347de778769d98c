//! Format conversion - turning the native DOCX artifact into a PDF.
//!
//! Conversion depends on an external office installation, so every failure
//! mode is normalized into the `ConversionFailure` taxonomy; the native
//! artifact is never touched and stays deliverable as a fallback.

pub mod soffice;

pub use soffice::SofficeConverter;

use async_trait::async_trait;
use thiserror::Error;

use crate::render::RenderedDocument;

/// Converted artifact. Never partially populated: a failed conversion yields
/// a `ConversionFailure` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfArtifact {
    /// Suggested download filename, `.pdf` included.
    pub filename: String,
    pub pdf: Vec<u8>,
}

/// Fixed failure taxonomy for the external conversion step.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversionFailure {
    #[error("conversion tool is not installed or not runnable")]
    ToolUnavailable,
    #[error("conversion timed out")]
    Timeout,
    #[error("converter rejected the document: {0}")]
    UnsupportedContent(String),
    #[error("conversion failed: {0}")]
    Unknown(String),
}

impl ConversionFailure {
    /// Stable reason code for reports and API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ToolUnavailable => "tool_unavailable",
            Self::Timeout => "timeout",
            Self::UnsupportedContent(_) => "unsupported_content",
            Self::Unknown(_) => "unknown_failure",
        }
    }
}

/// Narrow seam to the external conversion capability. The core never
/// depends on a specific host application; tests substitute a double that
/// exercises the fallback path deterministically.
///
/// Implementations perform no retries; retrying is the caller's decision.
/// They must also bound their own run time and resolve to `Timeout` when
/// it is exceeded: the coordinator serializes conversions process-wide, so
/// a `convert` call that never returns would stall every later request.
#[async_trait]
pub trait PdfConverter: Send + Sync {
    async fn convert(&self, doc: &RenderedDocument) -> Result<PdfArtifact, ConversionFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_are_stable() {
        assert_eq!(ConversionFailure::ToolUnavailable.code(), "tool_unavailable");
        assert_eq!(ConversionFailure::Timeout.code(), "timeout");
        assert_eq!(
            ConversionFailure::UnsupportedContent("x".into()).code(),
            "unsupported_content"
        );
        assert_eq!(ConversionFailure::Unknown("x".into()).code(), "unknown_failure");
    }
}
