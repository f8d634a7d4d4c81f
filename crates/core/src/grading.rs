//! Grading Data Model
//!
//! Types produced by the grading collaborator for a single answer
//! submission. These mirror the JSON contract the evaluator prompt asks
//! the model to emit, so they deserialize straight from the model output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-attempt score breakdown.
///
/// `final_score` is what the progression policy compares against the
/// passing threshold; the components are kept for the attempt log.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scores {
    #[serde(default)]
    pub correctness: u8,
    #[serde(default)]
    pub explanation: u8,
    #[serde(default)]
    pub bonus: u8,
    #[serde(rename = "final", default)]
    pub final_score: u8,
}

/// Qualitative signals the grader reports alongside the scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Signals {
    /// Large gap between what the learner got right and how they explained it.
    #[serde(rename = "correctness_explanation_gap")]
    pub concept_gap: bool,
    pub uncertainty_detected: bool,
    pub persona: String,
}

impl Default for Signals {
    fn default() -> Self {
        Self {
            concept_gap: false,
            uncertainty_detected: false,
            persona: "N/A".to_string(),
        }
    }
}

/// The sentinel the grading prompt uses for "the learner asked nothing".
const NO_FOLLOW_UP: &str = "none";

/// One graded attempt, as returned by the grading collaborator.
///
/// Every field carries a serde default so a partially well-formed model
/// response still yields a usable result instead of a parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingResult {
    #[serde(default)]
    pub scores: Scores,
    #[serde(default)]
    pub signals: Signals,
    #[serde(default = "default_evaluation_text")]
    pub evaluation_text: String,
    #[serde(default = "default_follow_up")]
    pub follow_up_question: String,
}

fn default_evaluation_text() -> String {
    "I received your answer.".to_string()
}

fn default_follow_up() -> String {
    "None".to_string()
}

impl GradingResult {
    /// The follow-up question embedded in the learner's answer, if the
    /// grader detected one. Empty strings and the case-insensitive
    /// `"None"` sentinel both mean "no question was asked".
    pub fn follow_up(&self) -> Option<&str> {
        let question = self.follow_up_question.trim();
        if question.is_empty() || question.eq_ignore_ascii_case(NO_FOLLOW_UP) {
            None
        } else {
            Some(question)
        }
    }

    /// Zero-score fallback used when the grading collaborator fails
    /// transiently. The quiz continues instead of blocking the learner.
    pub fn safety_net() -> Self {
        Self {
            scores: Scores::default(),
            signals: Signals::default(),
            evaluation_text: "**Technical Glitch:** I had a little trouble reading your answer. \
                              Let's try the next one!"
                .to_string(),
            follow_up_question: "None".to_string(),
        }
    }
}

/// Grading leniency mode. Alters the grader prompt and, in Easy mode,
/// enables hint decoration on outgoing questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Strict,
    #[default]
    Normal,
    Easy,
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Difficulty::Strict),
            "normal" => Ok(Difficulty::Normal),
            "easy" => Ok(Difficulty::Easy),
            other => Err(format!("'{other}' is not a valid difficulty")),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Strict => write!(f, "Strict"),
            Difficulty::Normal => write!(f, "Normal"),
            Difficulty::Easy => write!(f, "Easy"),
        }
    }
}
