//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources the handlers need.

use crate::config::Config;
use std::sync::Arc;
use tutor_core::{lesson::LessonStore, quiz::QuizService};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub lessons: Arc<LessonStore>,
    pub quiz: Arc<QuizService>,
    pub config: Arc<Config>,
}
