//! Delivery coordination - the per-request state machine that drives
//! template selection, field collection, rendering, and conversion, and
//! resolves every request to exactly one `DeliveryOutcome`.

pub mod coordinator;
pub mod session;

pub use coordinator::{DeliveryCoordinator, StepReply};
pub use session::{Session, SessionState, SessionStore};

use thiserror::Error;

use crate::collect::ValidationError;
use crate::convert::{ConversionFailure, PdfArtifact};
use crate::render::RenderedDocument;

/// Delivery formats this server hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryFormat {
    Pdf,
    Docx,
}

impl DeliveryFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// Terminal result of one request. Every code path through the coordinator
/// resolves to exactly one of these.
#[derive(Debug, Clone)]
pub enum DeliveryOutcome {
    /// Conversion succeeded; the requested format is delivered.
    Delivered {
        artifact: PdfArtifact,
        format: DeliveryFormat,
    },
    /// Conversion failed; the untouched native artifact is delivered
    /// together with the normalized failure reason.
    DeliveredWithFallback {
        native: RenderedDocument,
        reason: ConversionFailure,
    },
    /// Rendering failed; nothing to fall back to.
    Failed { reason: String },
}

impl DeliveryOutcome {
    /// The artifact to hand out, if any: (filename, format, bytes).
    pub fn document(&self) -> Option<(&str, DeliveryFormat, &[u8])> {
        match self {
            Self::Delivered { artifact, format } => {
                Some((&artifact.filename, *format, &artifact.pdf))
            }
            Self::DeliveredWithFallback { native, .. } => {
                Some((&native.filename, DeliveryFormat::Docx, &native.docx))
            }
            Self::Failed { .. } => None,
        }
    }
}

/// Recoverable errors surfaced to the chat adapter; none of them abort the
/// session beyond what the user can fix by answering again.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("unknown session")]
    SessionNotFound,
    #[error("unknown template id '{0}'")]
    TemplateNotFound(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("session has no {0} at this point")]
    WrongState(&'static str),
}
