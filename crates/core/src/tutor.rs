//! Tutor Text Generation
//!
//! Friendly prose around the grading loop: remediation after a failed
//! attempt, answers to learner follow-up questions, hints in Easy mode,
//! and the message shown when the tutor gives up on a topic.

use tracing::warn;

use crate::evaluator::{Evaluator, EvaluatorError};
use crate::grading::Difficulty;

/// Generates a simple re-explanation of a topic the learner struggled with.
pub async fn remediation(
    evaluator: &dyn Evaluator,
    topic: &str,
    reference: &str,
) -> Result<String, EvaluatorError> {
    let prompt = format!(
        "You are a friendly and encouraging tutor. A student is struggling to understand \
         '{topic}'. Please provide a simple, clear explanation of this concept based on the \
         following information: '{reference}'. Start with a friendly phrase like 'No worries!' \
         or 'Let's break that down.' and keep it concise."
    );
    evaluator.generate(&prompt).await
}

/// Answers a follow-up question the learner embedded in their answer.
pub async fn answer_follow_up(
    evaluator: &dyn Evaluator,
    topic: &str,
    question: &str,
) -> Result<String, EvaluatorError> {
    let prompt = format!(
        "You are a helpful AI Tutor. A student asked a follow-up question about '{topic}'. \
         Their question is: '{question}'. Please provide a clear and concise answer to their \
         question."
    );
    evaluator.generate(&prompt).await
}

/// Generates a short, non-revealing hint for Easy mode.
pub async fn hint(evaluator: &dyn Evaluator, topic: &str) -> Result<String, EvaluatorError> {
    let prompt = format!(
        "Write a very short, fun hint (under 15 words) for a middle schooler about the concept: \
         '{topic}'. Do NOT give away the definition. Just give a clue or analogy."
    );
    evaluator.generate(&prompt).await
}

/// The message shown when fallout triggers. Time-exceeded phrasing takes
/// precedence when both conditions tripped at once.
pub fn fallout_message(topic: &str, time_exceeded: bool, attempts_exceeded: bool) -> String {
    let reason = if time_exceeded {
        "we ran out of time on that one."
    } else if attempts_exceeded {
        "we've had a few tries at that one."
    } else {
        ""
    };
    format!(
        "That was a tricky one! No problem, let's move on for now since {reason} We can always \
         come back to the topic of '{topic}' later."
    )
}

/// Renders the outgoing question text for a topic. In Easy mode a hint is
/// appended; hint generation failures are swallowed so question delivery
/// is never blocked.
pub async fn decorate_question(
    evaluator: &dyn Evaluator,
    topic: &str,
    difficulty: Difficulty,
) -> String {
    let mut question = format!("**{topic}**");

    if difficulty == Difficulty::Easy {
        match hint(evaluator, topic).await {
            Ok(text) => {
                // Models sometimes wrap hints in quotes.
                let text = text.replace(['"', '\''], "");
                question.push_str(&format!("\n\n*\u{1f4a1} Hint: {}*", text.trim()));
            }
            Err(err) => {
                warn!(topic = %topic, error = %err, "Hint generation failed; serving the bare question");
            }
        }
    }

    question
}
