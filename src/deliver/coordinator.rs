//! The per-request orchestration: SelectingTemplate → CollectingFields →
//! Rendering → Converting → Done.

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::catalog::{FieldSpec, FieldType, TemplateCatalog, TemplateDescriptor};
use crate::collect::FieldValueSet;
use crate::convert::PdfConverter;
use crate::render::{render, RenderedDocument};

use super::session::{SessionState, SessionStore};
use super::{DeliveryError, DeliveryFormat, DeliveryOutcome};

/// What the chat adapter should do next: ask another question, or hand the
/// finished outcome back to the user.
#[derive(Debug)]
pub enum StepReply {
    Prompt {
        /// Field the prompt is asking for, when one is pending.
        field: Option<String>,
        text: String,
    },
    Outcome(DeliveryOutcome),
}

/// Read-only snapshot of a session for the status endpoint.
pub struct SessionSnapshot {
    pub id: Uuid,
    pub state: SessionState,
    pub template_id: Option<String>,
    /// (key, prompt, display value) in declared order.
    pub summary: Vec<(String, String, String)>,
    pub outcome: Option<DeliveryOutcome>,
}

pub struct DeliveryCoordinator {
    catalog: Arc<TemplateCatalog>,
    converter: Arc<dyn PdfConverter>,
    store: SessionStore,
    /// Conversions are serialized process-wide: the external office
    /// instance does not tolerate overlapping invocations.
    convert_gate: Mutex<()>,
}

enum Advance {
    Ask { field: String, text: String },
    Finalize(TemplateDescriptor, FieldValueSet),
}

impl DeliveryCoordinator {
    pub fn new(catalog: Arc<TemplateCatalog>, converter: Arc<dyn PdfConverter>) -> Self {
        Self {
            catalog,
            converter,
            store: SessionStore::new(),
            convert_gate: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Open a new request in `SelectingTemplate`.
    pub fn start_session(&self, user: Option<String>) -> Uuid {
        let id = self.store.create(user);
        log::info!("session {id} started");
        id
    }

    /// Abandon a request, discarding its values and artifacts.
    pub fn abandon(&self, id: Uuid) -> bool {
        let removed = self.store.remove(id);
        if removed {
            log::info!("session {id} abandoned");
        }
        removed
    }

    pub fn snapshot(&self, id: Uuid) -> Result<SessionSnapshot, DeliveryError> {
        self.store
            .with_session(id, |s| {
                let summary = match (&s.template_id, &s.values) {
                    (Some(template_id), Some(values)) => self
                        .catalog
                        .get(template_id)
                        .map(|d| values.summary(d))
                        .unwrap_or_default(),
                    _ => Vec::new(),
                };
                SessionSnapshot {
                    id: s.id,
                    state: s.state,
                    template_id: s.template_id.clone(),
                    summary,
                    outcome: s.outcome.clone(),
                }
            })
            .ok_or(DeliveryError::SessionNotFound)
    }

    pub fn user_label(&self, id: Uuid) -> Option<String> {
        self.store.with_session(id, |s| s.user.clone()).flatten()
    }

    /// Opening prompt listing the available templates.
    pub fn select_prompt(&self) -> String {
        let listing = self
            .catalog
            .list()
            .iter()
            .map(|d| format!("{} ({})", d.id, d.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Which document do you need? Available: {listing}")
    }

    /// Bind a session to a template and start collecting fields. An unknown
    /// id is recoverable: the session stays in `SelectingTemplate`.
    pub async fn choose_template(
        &self,
        id: Uuid,
        template_id: &str,
    ) -> Result<StepReply, DeliveryError> {
        let descriptor = self
            .catalog
            .get(template_id)
            .map_err(|_| DeliveryError::TemplateNotFound(template_id.to_string()))?;
        let values = FieldValueSet::start(descriptor);

        self.store
            .with_session_mut(id, |s| {
                if s.state != SessionState::SelectingTemplate {
                    return Err(DeliveryError::WrongState("template choice"));
                }
                s.state = SessionState::CollectingFields;
                s.template_id = Some(descriptor.id.clone());
                s.values = Some(values);
                Ok(())
            })
            .ok_or(DeliveryError::SessionNotFound)??;

        log::info!("session {id} collecting fields for '{template_id}'");
        self.advance(id).await
    }

    /// Validate and store one field answer. A `ValidationError` leaves the
    /// session untouched so the adapter can reprompt for that field only.
    /// The submission that completes the set triggers render and convert.
    pub async fn submit_field(
        &self,
        id: Uuid,
        key: &str,
        raw: &str,
    ) -> Result<StepReply, DeliveryError> {
        self.store
            .with_session_mut(id, |s| {
                if s.state != SessionState::CollectingFields {
                    return Err(DeliveryError::WrongState("field input"));
                }
                let template_id = s
                    .template_id
                    .clone()
                    .ok_or(DeliveryError::WrongState("field input"))?;
                let descriptor = self
                    .catalog
                    .get(&template_id)
                    .map_err(|_| DeliveryError::TemplateNotFound(template_id))?;
                let values = s
                    .values
                    .as_mut()
                    .ok_or(DeliveryError::WrongState("field input"))?;
                values.submit(descriptor, key, raw)?;
                Ok(())
            })
            .ok_or(DeliveryError::SessionNotFound)??;

        self.advance(id).await
    }

    /// Route one free-text chat message according to the session state.
    pub async fn handle_message(&self, id: Uuid, text: &str) -> Result<StepReply, DeliveryError> {
        let state = self
            .store
            .with_session(id, |s| s.state)
            .ok_or(DeliveryError::SessionNotFound)?;

        match state {
            SessionState::SelectingTemplate => self.choose_template(id, text.trim()).await,
            SessionState::CollectingFields => {
                let key = self
                    .store
                    .with_session(id, |s| {
                        let template_id = s.template_id.as_deref()?;
                        let descriptor = self.catalog.get(template_id).ok()?;
                        let values = s.values.as_ref()?;
                        values.next_missing(descriptor).map(|spec| spec.key.clone())
                    })
                    .ok_or(DeliveryError::SessionNotFound)?
                    .ok_or(DeliveryError::WrongState("pending field"))?;
                self.submit_field(id, &key, text).await
            }
            SessionState::Rendering | SessionState::Converting => Ok(StepReply::Prompt {
                field: None,
                text: "Your document is being prepared.".to_string(),
            }),
            SessionState::Done => Ok(StepReply::Prompt {
                field: None,
                text: "This request is finished. Start a new session for another document."
                    .to_string(),
            }),
        }
    }

    /// The artifact of a finished session: (filename, format, bytes).
    pub fn outcome_document(
        &self,
        id: Uuid,
    ) -> Result<(String, DeliveryFormat, Vec<u8>), DeliveryError> {
        self.store
            .with_session(id, |s| {
                s.outcome
                    .as_ref()
                    .and_then(|o| o.document())
                    .map(|(name, format, bytes)| (name.to_string(), format, bytes.to_vec()))
            })
            .ok_or(DeliveryError::SessionNotFound)?
            .ok_or(DeliveryError::WrongState("deliverable document"))
    }

    /// Either prompt for the next missing field or, once the set is
    /// complete, run the render/convert tail of the pipeline.
    async fn advance(&self, id: Uuid) -> Result<StepReply, DeliveryError> {
        let next = self
            .store
            .with_session_mut(id, |s| -> Result<Advance, DeliveryError> {
                if s.state != SessionState::CollectingFields {
                    return Err(DeliveryError::WrongState("pending field"));
                }
                let template_id = s
                    .template_id
                    .clone()
                    .ok_or(DeliveryError::WrongState("field input"))?;
                let descriptor = self
                    .catalog
                    .get(&template_id)
                    .map_err(|_| DeliveryError::TemplateNotFound(template_id))?;
                let values = s
                    .values
                    .as_ref()
                    .ok_or(DeliveryError::WrongState("field input"))?;
                match values.next_missing(descriptor) {
                    Some(spec) => Ok(Advance::Ask {
                        field: spec.key.clone(),
                        text: prompt_for(spec),
                    }),
                    None => {
                        s.state = SessionState::Rendering;
                        Ok(Advance::Finalize(
                            descriptor.clone(),
                            values.clone(),
                        ))
                    }
                }
            })
            .ok_or(DeliveryError::SessionNotFound)??;

        match next {
            Advance::Ask { field, text } => Ok(StepReply::Prompt {
                field: Some(field),
                text,
            }),
            Advance::Finalize(descriptor, values) => {
                Ok(StepReply::Outcome(self.finalize(id, descriptor, values).await))
            }
        }
    }

    /// Render, then convert. Render failure is terminal with no fallback;
    /// conversion failure always degrades to fallback delivery of the
    /// untouched native artifact.
    async fn finalize(
        &self,
        id: Uuid,
        descriptor: TemplateDescriptor,
        values: FieldValueSet,
    ) -> DeliveryOutcome {
        let native: RenderedDocument = match render(&descriptor, &values) {
            Ok(doc) => doc,
            Err(e) => {
                log::error!("session {id}: rendering '{}' failed: {e}", descriptor.id);
                let outcome = DeliveryOutcome::Failed {
                    reason: "could not produce your document".to_string(),
                };
                self.resolve(id, outcome.clone());
                return outcome;
            }
        };

        let _ = self
            .store
            .with_session_mut(id, |s| s.state = SessionState::Converting);

        let converted = {
            let _gate = self.convert_gate.lock().await;
            self.converter.convert(&native).await
        };

        let outcome = match converted {
            Ok(artifact) => {
                log::info!("session {id}: delivered '{}' as PDF", artifact.filename);
                DeliveryOutcome::Delivered {
                    artifact,
                    format: DeliveryFormat::Pdf,
                }
            }
            Err(reason) => {
                log::warn!(
                    "session {id}: conversion failed ({}), falling back to native artifact",
                    reason.code()
                );
                DeliveryOutcome::DeliveredWithFallback { native, reason }
            }
        };

        self.resolve(id, outcome.clone());
        outcome
    }

    fn resolve(&self, id: Uuid, outcome: DeliveryOutcome) {
        let _ = self.store.with_session_mut(id, |s| {
            s.state = SessionState::Done;
            s.outcome = Some(outcome);
        });
    }
}

/// Prompt text for one field, with type-specific hints.
pub fn prompt_for(spec: &FieldSpec) -> String {
    match &spec.field_type {
        FieldType::Choice { options } => format!("{} [{}]", spec.prompt, options.join(" / ")),
        FieldType::Date => format!("{} (DD.MM.YYYY or 'today')", spec.prompt),
        _ => spec.prompt.clone(),
    }
}
