//! Axum Router Configuration
//!
//! This module defines the HTTP routing for the application, including
//! the quiz endpoints and the OpenAPI documentation.

use crate::{
    handlers,
    models::{AskRequest, ErrorResponse, QuizResponse, StartRequest},
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::concepts, handlers::start, handlers::ask),
    components(schemas(StartRequest, AskRequest, QuizResponse, ErrorResponse)),
    tags(
        (name = "Quiz Tutor API", description = "Question serving and answer grading for the quiz tutor")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/concepts", get(handlers::concepts))
        .route("/start", post(handlers::start))
        .route("/ask", post(handlers::ask))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
