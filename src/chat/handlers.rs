//! HTTP handlers for the chat adapter.

use actix_web::{
    web::{self, Path},
    HttpRequest, HttpResponse, Responder,
};
use uuid::Uuid;

use crate::deliver::{DeliveryError, DeliveryOutcome, SessionState};
use crate::state::AppState;
use crate::ErrorResponse;

use super::models::{
    FieldSubmitRequest, MessageRequest, SessionStartedResponse, SessionView, StartSessionRequest,
    StepResponse, TemplateInfo,
};

const CHAT_TOKEN_HEADER: &str = "X-Chat-Token";

/// Check the chat platform credential. Not an authentication system; just
/// the shared token from the configuration.
fn authorize(req: &HttpRequest, state: &AppState) -> Result<(), HttpResponse> {
    let presented = req
        .headers()
        .get(CHAT_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if presented == Some(state.chat_token.as_str()) {
        Ok(())
    } else {
        Err(HttpResponse::Unauthorized()
            .json(ErrorResponse::new("Unauthorized", "missing or wrong chat token")))
    }
}

fn delivery_error_response(err: DeliveryError) -> HttpResponse {
    match err {
        DeliveryError::SessionNotFound => {
            HttpResponse::NotFound().json(ErrorResponse::not_found("unknown session"))
        }
        DeliveryError::TemplateNotFound(id) => HttpResponse::NotFound().json(
            ErrorResponse::not_found(&format!("unknown template id '{id}'")),
        ),
        DeliveryError::Validation(e) => {
            HttpResponse::UnprocessableEntity().json(ErrorResponse::new(
                "ValidationError",
                &e.to_string(),
            ))
        }
        DeliveryError::WrongState(what) => HttpResponse::Conflict().json(ErrorResponse::new(
            "Conflict",
            &format!("session has no {what} at this point"),
        )),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Chat Service",
    get,
    path = "/templates",
    responses(
        (status = 200, description = "Available document templates", body = [TemplateInfo]),
        (status = 401, description = "Missing or wrong chat token", body = ErrorResponse)
    )
)]
pub async fn list_templates(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    if let Err(resp) = authorize(&req, &state) {
        return resp;
    }
    let templates: Vec<TemplateInfo> = state
        .coordinator
        .catalog()
        .list()
        .into_iter()
        .map(TemplateInfo::from)
        .collect();
    HttpResponse::Ok().json(templates)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Chat Service",
    post,
    path = "/sessions",
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session opened", body = SessionStartedResponse),
        (status = 401, description = "Missing or wrong chat token", body = ErrorResponse)
    )
)]
pub async fn start_session(
    req: HttpRequest,
    body: Option<web::Json<StartSessionRequest>>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = authorize(&req, &state) {
        return resp;
    }
    let user = body.and_then(|b| b.into_inner().user);
    let session_id = state.coordinator.start_session(user.clone());
    state
        .reporter
        .session_started(user.as_deref().unwrap_or("anonymous"))
        .await;

    HttpResponse::Created().json(SessionStartedResponse {
        session_id,
        prompt: state.coordinator.select_prompt(),
    })
}

#[utoipa::path(
    context_path = "/api",
    tag = "Chat Service",
    get,
    path = "/sessions/{id}",
    responses(
        (status = 200, description = "Session state and collected values", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(("id" = Uuid, Path, description = "Session id"))
)]
pub async fn get_session(
    req: HttpRequest,
    id: Path<Uuid>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = authorize(&req, &state) {
        return resp;
    }
    match state.coordinator.snapshot(id.into_inner()) {
        Ok(snapshot) => HttpResponse::Ok().json(SessionView::from(snapshot)),
        Err(e) => delivery_error_response(e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Chat Service",
    post,
    path = "/sessions/{id}/message",
    request_body = MessageRequest,
    responses(
        (status = 200, description = "Next prompt or final outcome", body = StepResponse),
        (status = 404, description = "Unknown session or template", body = ErrorResponse),
        (status = 422, description = "Rejected field value", body = ErrorResponse)
    ),
    params(("id" = Uuid, Path, description = "Session id"))
)]
pub async fn post_message(
    req: HttpRequest,
    id: Path<Uuid>,
    body: web::Json<MessageRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = authorize(&req, &state) {
        return resp;
    }
    let session_id = id.into_inner();
    let was_selecting = matches!(
        state.coordinator.snapshot(session_id).map(|s| s.state),
        Ok(SessionState::SelectingTemplate)
    );

    match state.coordinator.handle_message(session_id, &body.text).await {
        Ok(reply) => {
            report_step(&state, session_id, was_selecting, &reply).await;
            HttpResponse::Ok().json(StepResponse::build(reply, session_id))
        }
        Err(e) => delivery_error_response(e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Chat Service",
    post,
    path = "/sessions/{id}/fields",
    request_body = FieldSubmitRequest,
    responses(
        (status = 200, description = "Next prompt or final outcome", body = StepResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 422, description = "Rejected field value", body = ErrorResponse)
    ),
    params(("id" = Uuid, Path, description = "Session id"))
)]
pub async fn submit_field(
    req: HttpRequest,
    id: Path<Uuid>,
    body: web::Json<FieldSubmitRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = authorize(&req, &state) {
        return resp;
    }
    let session_id = id.into_inner();
    match state
        .coordinator
        .submit_field(session_id, &body.key, &body.value)
        .await
    {
        Ok(reply) => {
            report_step(&state, session_id, false, &reply).await;
            HttpResponse::Ok().json(StepResponse::build(reply, session_id))
        }
        Err(e) => delivery_error_response(e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Chat Service",
    get,
    path = "/sessions/{id}/document",
    responses(
        (status = 200, description = "The delivered artifact (PDF, or DOCX on fallback)"),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "No deliverable document", body = ErrorResponse)
    ),
    params(("id" = Uuid, Path, description = "Session id"))
)]
pub async fn download_document(
    req: HttpRequest,
    id: Path<Uuid>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = authorize(&req, &state) {
        return resp;
    }
    match state.coordinator.outcome_document(id.into_inner()) {
        Ok((filename, format, bytes)) => HttpResponse::Ok()
            .content_type(format.mime_type())
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{filename}\""),
            ))
            .body(bytes),
        Err(e) => delivery_error_response(e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Chat Service",
    delete,
    path = "/sessions/{id}",
    responses(
        (status = 204, description = "Session abandoned"),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(("id" = Uuid, Path, description = "Session id"))
)]
pub async fn delete_session(
    req: HttpRequest,
    id: Path<Uuid>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(resp) = authorize(&req, &state) {
        return resp;
    }
    if state.coordinator.abandon(id.into_inner()) {
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::NotFound().json(ErrorResponse::not_found("unknown session"))
    }
}

/// Send the operational reports a step implies: a template was picked, or a
/// document went out.
async fn report_step(
    state: &web::Data<AppState>,
    session_id: Uuid,
    was_selecting: bool,
    reply: &crate::deliver::StepReply,
) {
    let user = state
        .coordinator
        .user_label(session_id)
        .unwrap_or_else(|| "anonymous".to_string());
    let template = state
        .coordinator
        .snapshot(session_id)
        .ok()
        .and_then(|s| s.template_id)
        .unwrap_or_default();

    if was_selecting {
        state.reporter.document_requested(&user, &template).await;
    }

    if let crate::deliver::StepReply::Outcome(outcome) = reply {
        let (code, filename) = match outcome {
            DeliveryOutcome::Delivered { artifact, .. } => {
                ("delivered", Some(artifact.filename.as_str()))
            }
            DeliveryOutcome::DeliveredWithFallback { native, .. } => {
                ("fallback", Some(native.filename.as_str()))
            }
            DeliveryOutcome::Failed { .. } => ("failed", None),
        };
        state
            .reporter
            .document_delivered(&user, &template, code, filename)
            .await;
    }
}
