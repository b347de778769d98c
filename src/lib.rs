use actix_web::middleware::Compress;
use actix_web::{web, App, HttpServer};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod catalog;
pub mod chat;
pub mod collect;
pub mod config;
pub mod convert;
pub mod deliver;
pub mod render;
pub mod report;
pub mod state;

pub use crate::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

/// Register the chat adapter routes. Shared between `run()` and the
/// integration tests.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/templates").route(web::get().to(chat::handlers::list_templates)),
            )
            .service(
                web::resource("/sessions").route(web::post().to(chat::handlers::start_session)),
            )
            .service(
                web::resource("/sessions/{id}")
                    .route(web::get().to(chat::handlers::get_session))
                    .route(web::delete().to(chat::handlers::delete_session)),
            )
            .service(
                web::resource("/sessions/{id}/message")
                    .route(web::post().to(chat::handlers::post_message)),
            )
            .service(
                web::resource("/sessions/{id}/fields")
                    .route(web::post().to(chat::handlers::submit_field)),
            )
            .service(
                web::resource("/sessions/{id}/document")
                    .route(web::get().to(chat::handlers::download_document)),
            ),
    );
}

pub async fn run() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::chat::handlers::list_templates,
            crate::chat::handlers::start_session,
            crate::chat::handlers::get_session,
            crate::chat::handlers::post_message,
            crate::chat::handlers::submit_field,
            crate::chat::handlers::download_document,
            crate::chat::handlers::delete_session
        ),
        components(
            schemas(
                chat::models::TemplateInfo,
                chat::models::StartSessionRequest,
                chat::models::SessionStartedResponse,
                chat::models::MessageRequest,
                chat::models::FieldSubmitRequest,
                chat::models::StepResponse,
                chat::models::OutcomeView,
                chat::models::SessionView,
                chat::models::SummaryEntry,
                catalog::model::FieldSpec,
                catalog::model::FieldType,
                deliver::SessionState,
                deliver::DeliveryFormat,
                ErrorResponse,
            )
        ),
        tags(
            (name = "Chat Service", description = "Conversational document generation endpoints.")
        )
    )]
    struct ApiDoc;

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // A catalog that does not validate must never accept requests.
    let app_state = match AppState::from_config(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Failed to load template catalog from {}: {e}",
                config.template_dir.display()
            );
            std::process::exit(1);
        }
    };

    log::info!(
        "Starting server at http://{}:{}",
        config.bind_addr,
        config.port
    );

    let bind = (config.bind_addr.clone(), config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .app_data(app_state.clone())
            .configure(configure_api)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(bind)?
    .run()
    .await
}
