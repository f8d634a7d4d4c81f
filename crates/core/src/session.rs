//! Session Store
//!
//! Per-session quiz progression state, keyed by a client-supplied session
//! identifier. The store hands out snapshots; callers mutate a snapshot
//! and commit it back wholesale.
//!
//! The map itself is lock-protected, but a submission reads state, awaits
//! the grading collaborator, and then commits, so two concurrent
//! submissions for the same session id can still lose an update. That
//! matches the upstream behavior and is documented in DESIGN.md.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Progression state for one session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Indices into the lesson list already presented. Grows monotonically.
    pub asked: HashSet<usize>,
    /// Index of the topic awaiting an answer; `None` when the session has
    /// not started or every topic has been used.
    pub current: Option<usize>,
    /// Attempts made on the current topic, including the one about to be
    /// graded. Resets to 1 whenever a new topic is presented.
    pub attempts: u32,
    /// When the current topic was presented.
    pub started_at: Instant,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            asked: HashSet::new(),
            current: None,
            attempts: 0,
            started_at: Instant::now(),
        }
    }

    /// Makes `index` the current topic: marks it asked, resets the attempt
    /// counter, and restarts the question clock.
    pub fn present(&mut self, index: usize) {
        self.asked.insert(index);
        self.current = Some(index);
        self.attempts = 1;
        self.started_at = Instant::now();
    }

    /// Clears the active question once no unseen topics remain.
    pub fn exhaust(&mut self) {
        self.current = None;
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage contract for session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates fresh state for `id`, discarding any prior state. Restarting
    /// an existing session intentionally throws its history away.
    async fn create(&self, id: &str) -> SessionState;

    async fn get(&self, id: &str) -> Option<SessionState>;

    /// Replaces the stored state for `id` wholesale.
    async fn commit(&self, id: &str, state: SessionState);
}

/// In-memory session store. State does not survive a process restart.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, id: &str) -> SessionState {
        let state = SessionState::new();
        self.sessions
            .lock()
            .await
            .insert(id.to_string(), state.clone());
        state
    }

    async fn get(&self, id: &str) -> Option<SessionState> {
        self.sessions.lock().await.get(id).cloned()
    }

    async fn commit(&self, id: &str, state: SessionState) {
        self.sessions.lock().await.insert(id.to_string(), state);
    }
}
