//! Lesson Store
//!
//! Parses a flat lesson file into an ordered list of topic / reference
//! answer pairs and hands out random unseen questions. The file format is
//! a sequence of `Topic: ... Answer: ...` blocks; a block runs until the
//! next `Topic:` marker or the end of the file, and the keywords are
//! case-insensitive.

use rand::seq::IndexedRandom;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

/// One unit of lesson content: a named topic and its reference answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonEntry {
    pub topic: String,
    pub answer: String,
}

/// The loaded lesson content. Immutable after construction.
#[derive(Debug, Default)]
pub struct LessonStore {
    entries: Vec<LessonEntry>,
}

impl LessonStore {
    /// Loads the lesson file at `path`. A missing file or a file with no
    /// parseable blocks produces an empty store with a warning, never an
    /// error; callers surface the empty state when a quiz is started.
    pub fn load_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Lesson file could not be read");
                return Self::default();
            }
        };
        let store = Self::parse(&text);
        if store.is_empty() {
            warn!(
                path = %path.display(),
                "No topics could be parsed from the lesson file. Check the format."
            );
        }
        store
    }

    /// Parses lesson text into entries. Blocks with an empty topic or
    /// empty answer after trimming are discarded.
    pub fn parse(text: &str) -> Self {
        let topic_marker = Regex::new(r"(?i)topic:").expect("valid topic regex");
        let answer_marker = Regex::new(r"(?i)answer:").expect("valid answer regex");

        let mut entries = Vec::new();
        let mut blocks = topic_marker.split(text);
        // Anything before the first Topic: marker is preamble.
        blocks.next();

        for block in blocks {
            let Some(marker) = answer_marker.find(block) else {
                continue;
            };
            let topic = block[..marker.start()].trim();
            let answer = block[marker.end()..].trim();
            if !topic.is_empty() && !answer.is_empty() {
                entries.push(LessonEntry {
                    topic: topic.to_string(),
                    answer: answer.to_string(),
                });
            }
        }

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, index: usize) -> Option<&LessonEntry> {
        self.entries.get(index)
    }

    /// All topic names, in file order.
    pub fn topics(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.topic.clone()).collect()
    }

    /// The reference answer for a topic, matched case-insensitively.
    /// Returns a sentinel string rather than an error when the topic is
    /// unknown; normal flow never asks for topics that do not exist.
    pub fn answer_for(&self, topic: &str) -> String {
        self.entries
            .iter()
            .find(|e| e.topic.eq_ignore_ascii_case(topic))
            .map(|e| e.answer.clone())
            .unwrap_or_else(|| format!("No reference answer found for topic: {topic}"))
    }

    /// Uniformly picks one entry whose index is not in `asked`, or `None`
    /// when every entry has been presented.
    pub fn pick_unseen(&self, asked: &HashSet<usize>) -> Option<(usize, &LessonEntry)> {
        let eligible: Vec<usize> = (0..self.entries.len())
            .filter(|i| !asked.contains(i))
            .collect();
        let index = *eligible.choose(&mut rand::rng())?;
        Some((index, &self.entries[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LESSON: &str = "\
Topic: Machine Learning
Answer: Computers learning patterns from data instead of explicit rules.

Topic: Training Data
Answer: The examples a model learns from.

topic: Overfitting
answer: Memorizing the training set instead of generalizing.
";

    #[test]
    fn parses_blocks_in_order() {
        let store = LessonStore::parse(LESSON);
        assert_eq!(store.len(), 3);
        assert_eq!(
            store.topics(),
            vec!["Machine Learning", "Training Data", "Overfitting"]
        );
        assert_eq!(
            store.entry(1).unwrap().answer,
            "The examples a model learns from."
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let store = LessonStore::parse("TOPIC: A\nANSWER: something");
        assert_eq!(store.len(), 1);
        assert_eq!(store.entry(0).unwrap().topic, "A");
    }

    #[test]
    fn blank_topics_and_answers_are_discarded() {
        let text = "Topic: \nAnswer: orphaned\nTopic: Real\nAnswer: \nTopic: Kept\nAnswer: yes";
        let store = LessonStore::parse(text);
        assert_eq!(store.topics(), vec!["Kept"]);
    }

    #[test]
    fn preamble_before_first_topic_is_ignored() {
        let text = "Lesson notes for week one.\n\nTopic: Bias\nAnswer: Systematic error.";
        let store = LessonStore::parse(text);
        assert_eq!(store.topics(), vec!["Bias"]);
    }

    #[test]
    fn block_without_answer_is_skipped() {
        let text = "Topic: Dangling\nTopic: Fine\nAnswer: present";
        let store = LessonStore::parse(text);
        assert_eq!(store.topics(), vec!["Fine"]);
    }

    #[test]
    fn missing_file_yields_empty_store() {
        let store = LessonStore::load_file("/definitely/not/here.txt");
        assert!(store.is_empty());
    }

    #[test]
    fn load_file_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{LESSON}").unwrap();
        let store = LessonStore::load_file(file.path());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn answer_lookup_is_case_insensitive_with_sentinel() {
        let store = LessonStore::parse(LESSON);
        assert_eq!(
            store.answer_for("machine learning"),
            "Computers learning patterns from data instead of explicit rules."
        );
        assert_eq!(
            store.answer_for("Quantum"),
            "No reference answer found for topic: Quantum"
        );
    }

    #[test]
    fn pick_unseen_skips_asked_indices() {
        let store = LessonStore::parse(LESSON);
        let asked: HashSet<usize> = [0, 2].into_iter().collect();
        for _ in 0..20 {
            let (index, entry) = store.pick_unseen(&asked).unwrap();
            assert_eq!(index, 1);
            assert_eq!(entry.topic, "Training Data");
        }
    }

    #[test]
    fn repeated_picks_cover_every_index_exactly_once() {
        let store = LessonStore::parse(LESSON);
        let mut asked = HashSet::new();
        let mut seen = Vec::new();
        while let Some((index, _)) = store.pick_unseen(&asked) {
            assert!(asked.insert(index), "index {index} returned twice");
            seen.push(index);
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(store.pick_unseen(&asked).is_none());
    }

    #[test]
    fn empty_store_has_nothing_to_pick() {
        let store = LessonStore::parse("no markers here");
        assert!(store.is_empty());
        assert!(store.pick_unseen(&HashSet::new()).is_none());
    }
}
