//! Axum Handlers for the Quiz API
//!
//! This module contains the logic for handling HTTP requests for the quiz
//! endpoints. It uses `utoipa` doc comments to generate OpenAPI
//! documentation.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::error;
use tutor_core::evaluator::EvaluatorError;
use tutor_core::quiz::QuizError;

use crate::{
    models::{AskRequest, ErrorResponse, QuizResponse, StartRequest},
    state::AppState,
};

pub enum ApiError {
    /// Client usage error: missing fields or an inactive session.
    BadRequest(String),
    /// Fatal configuration state: missing credential or empty lesson file.
    /// Reported with its explanation, since the operator must act on it.
    Config(String),
    /// Anything unexpected; logged in full, reported generically.
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::Config(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { message }),
            )
                .into_response(),
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::NoActiveQuestion => ApiError::BadRequest(
                "Invalid session or no question is active. Please start the quiz.".to_string(),
            ),
            QuizError::EmptyLessonStore => {
                ApiError::Config("The lesson file is empty. Cannot start the quiz.".to_string())
            }
            QuizError::Evaluator(EvaluatorError::MissingApiKey) => ApiError::Config(
                "Grading is unavailable: GEMINI_API_KEY is not configured.".to_string(),
            ),
            QuizError::Evaluator(other) => ApiError::InternalServerError(other.into()),
        }
    }
}

/// List all topics in the loaded lesson.
#[utoipa::path(
    get,
    path = "/concepts",
    responses(
        (status = 200, description = "Ordered list of topic names", body = [String])
    )
)]
pub async fn concepts(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.lessons.topics())
}

/// Start (or restart) a quiz session and serve the first question.
#[utoipa::path(
    post,
    path = "/start",
    request_body = StartRequest,
    responses(
        (status = 200, description = "First question served", body = QuizResponse),
        (status = 400, description = "Missing session_id", body = ErrorResponse),
        (status = 500, description = "Lesson store empty or internal error", body = ErrorResponse)
    )
)]
pub async fn start(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StartRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    let session_id = payload
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing session_id.".to_string()))?;

    let turn = state.quiz.start(session_id).await?;
    Ok(Json(turn.into()))
}

/// Submit an answer to the current question.
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer graded", body = QuizResponse),
        (status = 400, description = "Missing fields or no active question", body = ErrorResponse),
        (status = 500, description = "Missing credential or internal error", body = ErrorResponse)
    )
)]
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    let session_id = payload
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let answer = payload
        .answer
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let (Some(session_id), Some(answer)) = (session_id, answer) else {
        return Err(ApiError::BadRequest(
            "Missing session_id or answer.".to_string(),
        ));
    };

    let turn = state.quiz.submit(session_id, answer).await?;
    Ok(Json(turn.into()))
}
