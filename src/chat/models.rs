//! Request/response DTOs for the chat adapter.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::catalog::{FieldSpec, TemplateDescriptor};
use crate::deliver::coordinator::SessionSnapshot;
use crate::deliver::{DeliveryFormat, DeliveryOutcome, SessionState, StepReply};

#[derive(Serialize, ToSchema)]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl From<&TemplateDescriptor> for TemplateInfo {
    fn from(descriptor: &TemplateDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            fields: descriptor.fields.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    /// Free-form user label, used only in operational reports.
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SessionStartedResponse {
    pub session_id: Uuid,
    pub prompt: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FieldSubmitRequest {
    pub key: String,
    pub value: String,
}

/// How one request ended, without the artifact bytes; those are fetched
/// from the download URL.
#[derive(Serialize, ToSchema)]
pub struct OutcomeView {
    /// `delivered`, `fallback`, or `failed`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<DeliveryFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl OutcomeView {
    pub fn build(outcome: &DeliveryOutcome, session_id: Uuid) -> Self {
        let download_url = outcome
            .document()
            .map(|_| format!("/api/sessions/{session_id}/document"));
        match outcome {
            DeliveryOutcome::Delivered { artifact, format } => Self {
                status: "delivered",
                format: Some(*format),
                filename: Some(artifact.filename.clone()),
                reason: None,
                reason_code: None,
                download_url,
            },
            DeliveryOutcome::DeliveredWithFallback { native, reason } => Self {
                status: "fallback",
                format: Some(DeliveryFormat::Docx),
                filename: Some(native.filename.clone()),
                reason: Some(reason.to_string()),
                reason_code: Some(reason.code()),
                download_url,
            },
            DeliveryOutcome::Failed { reason } => Self {
                status: "failed",
                format: None,
                filename: None,
                reason: Some(reason.clone()),
                reason_code: None,
                download_url: None,
            },
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct StepResponse {
    pub session_id: Uuid,
    /// Text the chat platform should show the user next.
    pub reply: String,
    /// Field the reply is prompting for, when collection continues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeView>,
}

impl StepResponse {
    pub fn build(reply: StepReply, session_id: Uuid) -> Self {
        match reply {
            StepReply::Prompt { field, text } => Self {
                session_id,
                reply: text,
                field,
                outcome: None,
            },
            StepReply::Outcome(outcome) => {
                let view = OutcomeView::build(&outcome, session_id);
                let reply = match &outcome {
                    DeliveryOutcome::Delivered { .. } => {
                        "Here is your document as a PDF.".to_string()
                    }
                    DeliveryOutcome::DeliveredWithFallback { reason, .. } => format!(
                        "PDF conversion failed ({reason}); here is the document in its native format."
                    ),
                    DeliveryOutcome::Failed { reason } => reason.clone(),
                };
                Self {
                    session_id,
                    reply,
                    field: None,
                    outcome: Some(view),
                }
            }
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SummaryEntry {
    pub key: String,
    pub prompt: String,
    pub value: String,
}

#[derive(Serialize, ToSchema)]
pub struct SessionView {
    pub session_id: Uuid,
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub summary: Vec<SummaryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeView>,
}

impl From<SessionSnapshot> for SessionView {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            session_id: snapshot.id,
            state: snapshot.state,
            template_id: snapshot.template_id,
            summary: snapshot
                .summary
                .into_iter()
                .map(|(key, prompt, value)| SummaryEntry { key, prompt, value })
                .collect(),
            outcome: snapshot
                .outcome
                .as_ref()
                .map(|o| OutcomeView::build(o, snapshot.id)),
        }
    }
}
