//! Attempt Log
//!
//! Appends one CSV row per graded attempt to a local file. Logging is
//! best effort: any failure is reported as a process-level warning and
//! never surfaces to the learner. The column schema is fixed and consumed
//! downstream, so the header order must not change.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::grading::{Scores, Signals};

const HEADER: &str = "Timestamp,Session ID,Question,Answer,Correctness Score,\
Explanation Score,Final Score,Time Taken (s),Uncertainty,Concept Gap,Persona,\
Evaluation,Fallout Triggered";

/// Everything recorded about one graded attempt.
#[derive(Debug, Clone)]
pub struct AttemptRecord<'a> {
    pub session_id: &'a str,
    pub topic: &'a str,
    pub answer: &'a str,
    pub scores: Scores,
    pub signals: &'a Signals,
    pub time_taken_secs: f64,
    pub evaluation: &'a str,
    pub fallout: bool,
}

/// Append-only CSV log of graded attempts.
pub struct AttemptLog {
    path: Option<PathBuf>,
}

impl AttemptLog {
    /// A log that silently drops every record, for the config toggle.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Opens the log at `path`, creating it with the header row when it
    /// does not exist yet. If the file cannot be created, logging is
    /// disabled for this process with a warning.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Err(err) = std::fs::write(&path, format!("{HEADER}\n")) {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "Could not create attempt log; logging disabled for this session"
                );
                return Self::disabled();
            }
            info!(path = %path.display(), "Created attempt log");
        }
        Self { path: Some(path) }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Appends one row. Failures are warnings, never errors.
    pub fn append(&self, record: &AttemptRecord<'_>) {
        let Some(path) = &self.path else {
            return;
        };

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let fields = [
            timestamp.to_string(),
            record.session_id.to_string(),
            record.topic.to_string(),
            record.answer.to_string(),
            record.scores.correctness.to_string(),
            record.scores.explanation.to_string(),
            record.scores.final_score.to_string(),
            format!("{:.2}", record.time_taken_secs),
            record.signals.uncertainty_detected.to_string(),
            record.signals.concept_gap.to_string(),
            record.signals.persona.clone(),
            record.evaluation.to_string(),
            record.fallout.to_string(),
        ];
        let row = fields
            .iter()
            .map(|f| quote_field(f))
            .collect::<Vec<_>>()
            .join(",");

        let result = OpenOptions::new()
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{row}"));
        if let Err(err) = result {
            warn!(path = %path.display(), error = %err, "Failed to append to attempt log");
        }
    }
}

/// RFC 4180 quoting: fields containing commas, quotes, or line breaks are
/// wrapped in double quotes with inner quotes doubled.
fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::Signals;

    fn sample_record<'a>(signals: &'a Signals) -> AttemptRecord<'a> {
        AttemptRecord {
            session_id: "learner-1",
            topic: "Bias",
            answer: "It skews, \"badly\", results",
            scores: Scores {
                correctness: 30,
                explanation: 25,
                bonus: 0,
                final_score: 55,
            },
            signals,
            time_taken_secs: 10.5,
            evaluation: "**Scores: 55/100** Partially right.",
            fallout: false,
        }
    }

    #[test]
    fn open_creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let log = AttemptLog::open(&path);
        assert!(log.is_enabled());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Timestamp,Session ID,Question,Answer"));
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn open_leaves_existing_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, format!("{HEADER}\nexisting,row\n")).unwrap();

        AttemptLog::open(&path);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("existing,row"));
    }

    #[test]
    fn append_writes_quoted_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let log = AttemptLog::open(&path);

        let signals = Signals::default();
        log.append(&sample_record(&signals));

        let contents = std::fs::read_to_string(&path).unwrap();
        let row = contents.lines().nth(1).unwrap();
        assert!(row.contains("learner-1,Bias"));
        // Commas and quotes in the answer are escaped, not column breaks.
        assert!(row.contains(r#""It skews, ""badly"", results""#));
        assert!(row.contains("30,25,55,10.50"));
        assert!(row.ends_with("false"));
    }

    #[test]
    fn disabled_log_drops_records() {
        let log = AttemptLog::disabled();
        assert!(!log.is_enabled());
        let signals = Signals::default();
        // Should be a silent no-op.
        log.append(&sample_record(&signals));
    }

    #[test]
    fn unwritable_path_disables_logging() {
        let log = AttemptLog::open("/nonexistent-dir/never/log.csv");
        assert!(!log.is_enabled());
    }

    #[test]
    fn quote_field_passes_plain_text_through() {
        assert_eq!(quote_field("plain"), "plain");
        assert_eq!(quote_field("has,comma"), "\"has,comma\"");
        assert_eq!(quote_field("line\nbreak"), "\"line\nbreak\"");
    }
}
