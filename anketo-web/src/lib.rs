//! anketo-web — web UI for the anketo FHIR questionnaire client.
//!
//! Every page is a thin layer over `anketo-client`: the durable objects
//! live on the remote FHIR server, this process only holds the session.

pub mod config;
pub mod handlers;
pub mod pages;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use anketo_client::{FhirClient, Session};
use anketo_core::CodeRegistry;

/// Application state shared by all handlers.
///
/// The session is process-wide: concurrent browser tabs share the active
/// patient, last write wins. Accepted limitation of this demo client.
pub struct AppState {
    pub client: FhirClient,
    pub codes: CodeRegistry,
    pub session: RwLock<Session>,
}

impl AppState {
    pub fn new(client: FhirClient, codes: CodeRegistry) -> Self {
        Self {
            client,
            codes,
            session: RwLock::new(Session::new()),
        }
    }
}

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route(
            "/patients/new",
            get(handlers::create_patient_form).post(handlers::create_patient_submit),
        )
        .route(
            "/patients/select",
            get(handlers::select_patient_form).post(handlers::select_patient_submit),
        )
        .route(
            "/questionnaires/upload",
            get(handlers::upload_form).post(handlers::upload_submit),
        )
        .route(
            "/questionnaires/start",
            get(handlers::start_form).post(handlers::start_submit),
        )
        .route(
            "/questionnaire/{qid}",
            get(handlers::questionnaire_form).post(handlers::questionnaire_submit),
        )
        .route("/responses/{id}", get(handlers::response_summary))
        .route("/history", get(handlers::history))
        .layer(RequestBodyLimitLayer::new(1024 * 1024)) // 1MB
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
