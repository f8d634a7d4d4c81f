//! Grading Collaborator
//!
//! The `Evaluator` trait is the seam between the quiz logic and the
//! hosted LLM. `GeminiEvaluator` implements it against the Gemini
//! `generateContent` endpoint over plain `reqwest`, single attempt with a
//! bounded timeout and no retry. Failure modes are kept distinct: a
//! missing credential is fatal to the request, while transport and parse
//! failures are transient and the caller degrades to a safety-net result.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::grading::{Difficulty, GradingResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT_SECS: u64 = 45;

/// Errors from the grading collaborator.
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    /// No API key is configured. Fatal to the request; surfaced to the
    /// caller rather than papered over with a zero score.
    #[error("API key is missing; set GEMINI_API_KEY")]
    MissingApiKey,

    /// The API answered with an error status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request did not complete within the timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The API or the model produced a response we could not interpret.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl EvaluatorError {
    /// Transient failures are recovered locally with a safety-net grading
    /// result; only the credential error blocks the request.
    pub fn is_transient(&self) -> bool {
        !matches!(self, EvaluatorError::MissingApiKey)
    }
}

/// A collaborator that grades answers and generates tutor text.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Grades a learner's free-text answer against the reference answer.
    async fn evaluate(
        &self,
        topic: &str,
        reference: &str,
        answer: &str,
        difficulty: Difficulty,
    ) -> Result<GradingResult, EvaluatorError>;

    /// Free-text generation for remediation, hints, and follow-up answers.
    async fn generate(&self, prompt: &str) -> Result<String, EvaluatorError>;
}

// --- Wire types for the generateContent endpoint ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Gemini-backed implementation of `Evaluator`.
pub struct GeminiEvaluator {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiEvaluator {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
        }
    }

    /// Points the client at a different endpoint, used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn generate_content(
        &self,
        prompt: &str,
        force_json: bool,
    ) -> Result<String, EvaluatorError> {
        let api_key = self.api_key.as_deref().ok_or(EvaluatorError::MissingApiKey)?;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: force_json.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EvaluatorError::Timeout(REQUEST_TIMEOUT_SECS)
                } else {
                    EvaluatorError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EvaluatorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| EvaluatorError::MalformedResponse(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                EvaluatorError::MalformedResponse("no text part in response".to_string())
            })
    }
}

#[async_trait]
impl Evaluator for GeminiEvaluator {
    async fn evaluate(
        &self,
        topic: &str,
        reference: &str,
        answer: &str,
        difficulty: Difficulty,
    ) -> Result<GradingResult, EvaluatorError> {
        let prompt = grading_prompt(topic, reference, answer, difficulty);
        let raw = self.generate_content(&prompt, true).await?;
        serde_json::from_str(&raw).map_err(|e| {
            EvaluatorError::MalformedResponse(format!("grading JSON did not parse: {e}"))
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String, EvaluatorError> {
        self.generate_content(prompt, false).await
    }
}

/// Builds the grading prompt, varying the grader's role and leniency with
/// the configured difficulty.
fn grading_prompt(topic: &str, reference: &str, answer: &str, difficulty: Difficulty) -> String {
    let (system_role, leniency) = match difficulty {
        Difficulty::Strict => (
            "You are a strict academic professor grading a university exam.",
            "Deduct points for any missing technical details, lack of precision, or informal \
             language."
                .to_string(),
        ),
        Difficulty::Easy => (
            "You are a supportive middle-school tutor.",
            "EXTREME LENIENCY MODE ENABLED:\n\
             1. CONTEXT ASSUMPTION: If the student provides a correct GENERAL definition, COUNT \
             IT AS 100% CORRECT.\n\
             2. NO NITPICKING: Ignore spelling/grammar.\n\
             3. ENCOURAGEMENT: Focus entirely on what they got RIGHT."
                .to_string(),
        ),
        Difficulty::Normal => (
            "You are a fair high-school teacher.",
            "Balance precision with understanding. Award high points for the core concept, but \
             require some specific details for a perfect score."
                .to_string(),
        ),
    };

    format!(
        r#"**Role:** {system_role}

**Task:** Evaluate a student's answer against a Ground Truth definition.

**Context:**
- Topic: "{topic}"
- Student's Answer: "{answer}"
- Ground Truth (Reference Material): "{reference}"
- Grading Mode: "{difficulty}"

**Grading Instructions:**
1. {leniency}
2. **Correctness (0-50):** How factually accurate is the answer?
3. **Explanation (0-50):** Did they use their own words?
4. **Feedback:** Write a helpful evaluation. Start with the score.
5. **REDUNDANCY BLOCKER (CRITICAL):** - If the student scores less than 30 points OR says "I don't know":
   - **DO NOT** explain the concept in the `evaluation_text`.
   - **DO NOT** give the definition.
   - ONLY say "Thanks for your honesty" or "Good effort" and mention that a helpful explanation is coming up next. Keep it under 20 words.
   - *Reason:* The system will display a separate Remediation card immediately after this, so your explanation would be repetitive.

**CRITICAL LOGIC FOR FOLLOW-UP QUESTIONS:**
- **Constraint:** If the student is simply answering the quiz question (even incorrectly), set 'follow_up_question' to "None".
- **Prevention:** Do NOT infer a question. If they didn't ask, the value MUST be "None".

**JSON Output Format:**
{{
  "scores": {{
    "correctness": <int>,
    "explanation": <int>,
    "bonus": <0 or 5>,
    "final": <int>
  }},
  "signals": {{
    "correctness_explanation_gap": <bool>,
    "uncertainty_detected": <bool>,
    "persona": "<string>"
  }},
  "evaluation_text": "<string starting with '**Scores: ...**'>",
  "follow_up_question": "<string or 'None'>"
}}
"#
    )
}
