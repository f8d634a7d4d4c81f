//! API Models
//!
//! Request and response payloads for the quiz endpoints, with `utoipa`
//! schemas for the generated OpenAPI documentation.

use serde::{Deserialize, Serialize};
use tutor_core::grading::Scores;
use tutor_core::quiz::QuizTurn;
use utoipa::ToSchema;

/// Body of `POST /start`.
#[derive(Deserialize, ToSchema)]
pub struct StartRequest {
    /// Client-chosen session identifier.
    #[serde(default)]
    #[schema(example = "learner-42")]
    pub session_id: Option<String>,
}

/// Body of `POST /ask`.
#[derive(Deserialize, ToSchema)]
pub struct AskRequest {
    #[serde(default)]
    #[schema(example = "learner-42")]
    pub session_id: Option<String>,
    /// The learner's free-text answer to the current question.
    #[serde(default)]
    pub answer: Option<String>,
}

/// One turn of the quiz conversation, for both `/start` and `/ask`.
#[derive(Serialize, ToSchema)]
pub struct QuizResponse {
    pub evaluation_text: String,
    pub remediation_text: String,
    /// Follow-up answer and/or the revealed reference answer on fallout.
    pub sme_answer: String,
    pub next_question: String,
    /// Score breakdown; present only on graded submissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub scores: Option<Scores>,
}

impl From<QuizTurn> for QuizResponse {
    fn from(turn: QuizTurn) -> Self {
        Self {
            evaluation_text: turn.evaluation_text,
            remediation_text: turn.remediation_text,
            sme_answer: turn.sme_answer,
            next_question: turn.next_question,
            scores: turn.scores,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_request_tolerates_missing_session_id() {
        let payload: StartRequest = serde_json::from_str("{}").unwrap();
        assert!(payload.session_id.is_none());

        let payload: StartRequest =
            serde_json::from_str(r#"{"session_id": "learner-1"}"#).unwrap();
        assert_eq!(payload.session_id.as_deref(), Some("learner-1"));
    }

    #[test]
    fn ask_request_tolerates_missing_fields() {
        let payload: AskRequest = serde_json::from_str(r#"{"session_id": "x"}"#).unwrap();
        assert_eq!(payload.session_id.as_deref(), Some("x"));
        assert!(payload.answer.is_none());
    }

    #[test]
    fn scores_are_omitted_from_start_responses() {
        let turn = QuizTurn {
            evaluation_text: "Let's get started!".to_string(),
            remediation_text: "Here is your first question:".to_string(),
            sme_answer: String::new(),
            next_question: "**Bias**".to_string(),
            scores: None,
        };
        let json = serde_json::to_string(&QuizResponse::from(turn)).unwrap();
        assert!(!json.contains("scores"));
        assert!(json.contains("**Bias**"));
    }

    #[test]
    fn scores_serialize_with_final_key() {
        let turn = QuizTurn {
            scores: Some(Scores {
                correctness: 40,
                explanation: 40,
                bonus: 5,
                final_score: 85,
            }),
            ..QuizTurn::default()
        };
        let json = serde_json::to_string(&QuizResponse::from(turn)).unwrap();
        assert!(json.contains(r#""final":85"#));
    }
}
