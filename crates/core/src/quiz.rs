//! Quiz Orchestration
//!
//! `QuizService` ties the lesson store, session store, grading
//! collaborator, and attempt log together: it starts sessions, grades
//! submissions, and applies the progression policy to decide whether the
//! learner passes, retries with remediation, or falls out of a topic.

use std::sync::Arc;
use tracing::{info, warn};

use crate::attempt_log::{AttemptLog, AttemptRecord};
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::grading::{Difficulty, GradingResult, Scores};
use crate::lesson::LessonStore;
use crate::policy::{Limits, Verdict, decide};
use crate::session::{SessionState, SessionStore};
use crate::tutor;

const EXHAUSTED_MESSAGE: &str = "You've completed all the questions! Great job!";

/// Errors from starting or advancing a quiz.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// The lesson file parsed to zero entries; there is nothing to ask.
    #[error("the lesson file is empty; cannot start the quiz")]
    EmptyLessonStore,

    /// The session does not exist or has no question awaiting an answer.
    #[error("invalid session or no question is active; start the quiz first")]
    NoActiveQuestion,

    /// A fatal grading-collaborator failure (missing credential).
    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),
}

/// One turn of the conversation with the learner.
#[derive(Debug, Clone, Default)]
pub struct QuizTurn {
    pub evaluation_text: String,
    pub remediation_text: String,
    pub sme_answer: String,
    pub next_question: String,
    /// Present on graded submissions, absent on session start.
    pub scores: Option<Scores>,
}

pub struct QuizService {
    lessons: Arc<LessonStore>,
    sessions: Arc<dyn SessionStore>,
    evaluator: Arc<dyn Evaluator>,
    limits: Limits,
    difficulty: Difficulty,
    log: AttemptLog,
}

impl QuizService {
    pub fn new(
        lessons: Arc<LessonStore>,
        sessions: Arc<dyn SessionStore>,
        evaluator: Arc<dyn Evaluator>,
        limits: Limits,
        difficulty: Difficulty,
        log: AttemptLog,
    ) -> Self {
        Self {
            lessons,
            sessions,
            evaluator,
            limits,
            difficulty,
            log,
        }
    }

    /// Starts (or restarts) a session and serves its first question.
    /// Restarting an existing session id discards its history.
    pub async fn start(&self, session_id: &str) -> Result<QuizTurn, QuizError> {
        if self.lessons.is_empty() {
            return Err(QuizError::EmptyLessonStore);
        }

        let mut state = self.sessions.create(session_id).await;
        let (index, entry) = self
            .lessons
            .pick_unseen(&state.asked)
            .ok_or(QuizError::EmptyLessonStore)?;
        state.present(index);

        let question =
            tutor::decorate_question(&*self.evaluator, &entry.topic, self.difficulty).await;
        info!(session_id = %session_id, topic = %entry.topic, "Quiz session started");
        self.sessions.commit(session_id, state).await;

        Ok(QuizTurn {
            evaluation_text: "Let's get started!".to_string(),
            remediation_text: "Here is your first question:".to_string(),
            sme_answer: String::new(),
            next_question: question,
            scores: None,
        })
    }

    /// Grades one submission and advances the session per the policy.
    pub async fn submit(&self, session_id: &str, answer: &str) -> Result<QuizTurn, QuizError> {
        let mut state = self
            .sessions
            .get(session_id)
            .await
            .ok_or(QuizError::NoActiveQuestion)?;
        let index = state.current.ok_or(QuizError::NoActiveQuestion)?;
        let entry = self
            .lessons
            .entry(index)
            .ok_or(QuizError::NoActiveQuestion)?
            .clone();

        let elapsed = state.elapsed();
        let grading = match self
            .evaluator
            .evaluate(&entry.topic, &entry.answer, answer, self.difficulty)
            .await
        {
            Ok(grading) => grading,
            Err(err) if err.is_transient() => {
                warn!(
                    session_id = %session_id,
                    topic = %entry.topic,
                    error = %err,
                    "Grading failed; continuing with the safety-net result"
                );
                GradingResult::safety_net()
            }
            Err(err) => return Err(err.into()),
        };

        let mut turn = QuizTurn {
            evaluation_text: grading.evaluation_text.clone(),
            scores: Some(grading.scores),
            ..QuizTurn::default()
        };

        // The follow-up is answered whatever the verdict turns out to be.
        if let Some(question) = grading.follow_up() {
            match tutor::answer_follow_up(&*self.evaluator, &entry.topic, question).await {
                Ok(text) => turn.sme_answer = text,
                Err(err) => {
                    warn!(session_id = %session_id, error = %err, "Follow-up answer generation failed");
                }
            }
        }

        let verdict = decide(grading.scores.final_score, state.attempts, elapsed, &self.limits);
        info!(
            session_id = %session_id,
            topic = %entry.topic,
            final_score = grading.scores.final_score,
            attempts = state.attempts,
            elapsed_secs = elapsed.as_secs_f64(),
            verdict = ?verdict,
            "Submission graded"
        );

        match verdict {
            Verdict::Fallout {
                time_exceeded,
                attempts_exceeded,
            } => {
                turn.remediation_text =
                    tutor::fallout_message(&entry.topic, time_exceeded, attempts_exceeded);
                let reveal = format!(
                    "For reference, the key idea for **{}** was: *{}*",
                    entry.topic, entry.answer
                );
                if turn.sme_answer.is_empty() {
                    turn.sme_answer = reveal;
                } else {
                    turn.sme_answer = format!("{}\n\n{reveal}", turn.sme_answer);
                }
                self.log_attempt(session_id, &entry.topic, answer, &grading, elapsed, true);
                self.advance(&mut state, &mut turn).await;
            }
            Verdict::Retry => {
                state.attempts += 1;
                turn.remediation_text =
                    match tutor::remediation(&*self.evaluator, &entry.topic, &entry.answer).await {
                        Ok(text) => text,
                        Err(err) => {
                            warn!(session_id = %session_id, error = %err, "Remediation generation failed");
                            format!(
                                "No worries! Take another look at **{}** and give it one more try.",
                                entry.topic
                            )
                        }
                    };
                let base =
                    tutor::decorate_question(&*self.evaluator, &entry.topic, self.difficulty)
                        .await;
                turn.next_question = format!(
                    "**Let's give it another shot!**\n\nBased on the explanation above, how \
                     would you describe: {base}"
                );
                self.log_attempt(session_id, &entry.topic, answer, &grading, elapsed, false);
            }
            Verdict::Pass => {
                turn.remediation_text = if turn.sme_answer.is_empty() {
                    "Well done!".to_string()
                } else {
                    "Great job! I've answered your follow-up question below.".to_string()
                };
                self.log_attempt(session_id, &entry.topic, answer, &grading, elapsed, false);
                self.advance(&mut state, &mut turn).await;
            }
        }

        self.sessions.commit(session_id, state).await;
        Ok(turn)
    }

    /// Serves a fresh topic, or the exhausted message when none remain.
    async fn advance(&self, state: &mut SessionState, turn: &mut QuizTurn) {
        match self.lessons.pick_unseen(&state.asked) {
            Some((index, entry)) => {
                state.present(index);
                let question =
                    tutor::decorate_question(&*self.evaluator, &entry.topic, self.difficulty)
                        .await;
                turn.next_question = format!("Here is your next question: {question}");
            }
            None => {
                state.exhaust();
                turn.next_question = EXHAUSTED_MESSAGE.to_string();
            }
        }
    }

    fn log_attempt(
        &self,
        session_id: &str,
        topic: &str,
        answer: &str,
        grading: &GradingResult,
        elapsed: std::time::Duration,
        fallout: bool,
    ) {
        self.log.append(&AttemptRecord {
            session_id,
            topic,
            answer,
            scores: grading.scores,
            signals: &grading.signals,
            time_taken_secs: elapsed.as_secs_f64(),
            evaluation: &grading.evaluation_text,
            fallout,
        });
    }
}
