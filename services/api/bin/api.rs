//! Main Entrypoint for the Quiz Tutor Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Loading the lesson file and opening the attempt log.
//! 3. Initializing the grading collaborator and session store.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tutor_api::{config::Config, router::create_router, state::AppState};
use tutor_core::{
    attempt_log::AttemptLog,
    evaluator::GeminiEvaluator,
    lesson::LessonStore,
    quiz::QuizService,
    session::MemorySessionStore,
};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; answer grading will fail until it is configured.");
    }

    // --- 3. Load Lesson Content and Open the Attempt Log ---
    let lessons = Arc::new(LessonStore::load_file(&config.lesson_file));
    if lessons.is_empty() {
        warn!(
            path = %config.lesson_file.display(),
            "Lesson store is empty; /start will report an error until content is provided."
        );
    } else {
        info!(topics = lessons.len(), "Lesson content loaded.");
    }

    let attempt_log = if config.disable_logging {
        info!("Attempt logging is disabled via configuration.");
        AttemptLog::disabled()
    } else {
        AttemptLog::open(&config.attempt_log_file)
    };

    // --- 4. Initialize Shared Services ---
    let evaluator = Arc::new(GeminiEvaluator::new(
        config.gemini_api_key.clone(),
        config.chat_model.clone(),
    ));
    let sessions = Arc::new(MemorySessionStore::new());
    let quiz = Arc::new(QuizService::new(
        lessons.clone(),
        sessions,
        evaluator,
        config.limits(),
        config.difficulty,
        attempt_log,
    ));

    let app_state = Arc::new(AppState {
        lessons,
        quiz,
        config: Arc::new(config.clone()),
    });

    // --- 5. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 6. Start Server ---
    info!(
        difficulty = %config.difficulty,
        model = %config.chat_model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server has shut down.");
    Ok(())
}
