//! Progression Policy
//!
//! The decision at the heart of the tutor: given the score of the latest
//! attempt, how many attempts the learner has already spent on the topic,
//! and how long they have been on it, choose between passing, retrying
//! with remediation, and giving up on the topic ("fallout").
//!
//! `decide` is a pure function of its inputs so it can be unit tested
//! without the HTTP layer or the grading collaborator.

use std::time::Duration;

/// Thresholds that parameterize the progression decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Minimum final score that counts as a pass.
    pub passing_score: u8,
    /// Attempts allowed on one topic before fallout, counted before the
    /// current submission is added.
    pub max_attempts: u32,
    /// Wall-clock budget per topic.
    pub max_time: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            passing_score: 70,
            max_attempts: 2,
            max_time: Duration::from_secs(120),
        }
    }
}

/// Outcome of grading one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Score met the threshold; move on to a new topic.
    Pass,
    /// Score fell short but budget remains; re-pose the same question
    /// with a remediation explanation.
    Retry,
    /// Score fell short and the time or attempt budget is spent; reveal
    /// the answer and move on. The flags record which condition tripped
    /// so the fallout message can name it.
    Fallout {
        time_exceeded: bool,
        attempts_exceeded: bool,
    },
}

/// Decides the outcome for one graded submission.
///
/// `attempts` is the attempt count as it stood when the submission was
/// made, i.e. before any increment for a retry.
pub fn decide(final_score: u8, attempts: u32, elapsed: Duration, limits: &Limits) -> Verdict {
    if final_score >= limits.passing_score {
        return Verdict::Pass;
    }

    let time_exceeded = elapsed > limits.max_time;
    let attempts_exceeded = attempts >= limits.max_attempts;

    if time_exceeded || attempts_exceeded {
        Verdict::Fallout {
            time_exceeded,
            attempts_exceeded,
        }
    } else {
        Verdict::Retry
    }
}
