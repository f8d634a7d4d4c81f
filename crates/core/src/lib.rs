//! Core domain logic for the quiz tutor: lesson content, per-session
//! progression state, the grading data model, the LLM-backed grading
//! collaborator, and the policy that decides pass / retry / fallout.

pub mod attempt_log;
pub mod evaluator;
pub mod grading;
pub mod lesson;
pub mod policy;
pub mod quiz;
pub mod session;
pub mod tutor;
