//! Append-only log of user interactions.

use super::jsonl::JsonLines;
use crate::error::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// How the user arrived at a pronunciation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    /// Picked one of the offered candidates.
    Selection,
    /// Typed a pronunciation by hand.
    ManualCorrection,
    /// Confirmed a whole sentence as-is.
    AcceptAll,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::ManualCorrection => "manual_correction",
            Self::AcceptAll => "accept_all",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger line. Never modified after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningEvent {
    pub timestamp: NaiveDateTime,
    pub word: String,
    #[serde(default)]
    pub original_word: Option<String>,
    pub ipa_choice: String,
    pub interaction_type: InteractionType,
    pub confidence: f64,
    pub selection_count: u32,
    #[serde(default)]
    pub total_word_selections: u32,
}

impl LearningEvent {
    /// Event stamped with the current local time.
    pub fn new(
        word: &str,
        original_word: Option<&str>,
        ipa_choice: &str,
        interaction_type: InteractionType,
        confidence: f64,
        selection_count: u32,
        total_word_selections: u32,
    ) -> Self {
        Self {
            timestamp: chrono::Local::now().naive_local(),
            word: word.to_string(),
            original_word: original_word.map(str::to_string),
            ipa_choice: ipa_choice.to_string(),
            interaction_type,
            confidence,
            selection_count,
            total_word_selections,
        }
    }
}

/// The learning ledger file.
#[derive(Debug)]
pub struct LearningLedger {
    log: JsonLines<LearningEvent>,
}

impl LearningLedger {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            log: JsonLines::open(path),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            log: JsonLines::in_memory(),
        }
    }

    /// Every event in recording order.
    pub fn events(&self) -> Vec<LearningEvent> {
        self.log.read_all()
    }

    pub fn events_for(&self, word: &str) -> Vec<LearningEvent> {
        self.events().into_iter().filter(|e| e.word == word).collect()
    }

    /// Number of recorded events per IPA choice for `word`.
    pub fn choice_counts(&self, word: &str) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for event in self.events_for(word) {
            *counts.entry(event.ipa_choice).or_insert(0) += 1;
        }
        counts
    }

    pub fn append(&mut self, event: LearningEvent) -> Result<()> {
        self.log.append(event)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.log.clear()
    }

    /// Events that failed to persist and live only in memory.
    pub fn unsaved(&self) -> usize {
        self.log.pending_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn event(word: &str, ipa: &str, kind: InteractionType) -> LearningEvent {
        LearningEvent::new(word, None, ipa, kind, 0.5, 1, 1)
    }

    #[test]
    fn interaction_type_serializes_snake_case() {
        let json = serde_json::to_string(&InteractionType::ManualCorrection).unwrap();
        assert_eq!(json, "\"manual_correction\"");
        assert_eq!(InteractionType::AcceptAll.to_string(), "accept_all");
    }

    #[test]
    fn event_parses_without_optional_fields() {
        let line = r#"{"timestamp":"2024-05-01T10:20:30.123456","word":"dance","ipa_choice":"dæːns","interaction_type":"selection","confidence":0.5,"selection_count":1}"#;
        let event: LearningEvent = serde_json::from_str(line).unwrap();
        assert_eq!(event.word, "dance");
        assert_eq!(event.original_word, None);
        assert_eq!(event.total_word_selections, 0);
    }

    #[test]
    fn choice_counts_replays_only_matching_word() {
        let dir = TempDir::new().unwrap();
        let mut ledger = LearningLedger::open(dir.path().join("learning.jsonl"));
        ledger.append(event("dance", "dæːns", InteractionType::Selection)).unwrap();
        ledger.append(event("dance", "dɑːns", InteractionType::Selection)).unwrap();
        ledger.append(event("dance", "dæːns", InteractionType::AcceptAll)).unwrap();
        ledger.append(event("cat", "kæt", InteractionType::Selection)).unwrap();

        let counts = ledger.choice_counts("dance");
        assert_eq!(counts["dæːns"], 2);
        assert_eq!(counts["dɑːns"], 1);
        assert_eq!(ledger.events_for("cat").len(), 1);
        assert_eq!(ledger.events().len(), 4);
    }

    #[test]
    fn reopened_ledger_sees_previous_events() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learning.jsonl");
        LearningLedger::open(&path)
            .append(event("mat", "mæt", InteractionType::ManualCorrection))
            .unwrap();

        let ledger = LearningLedger::open(&path);
        let events = ledger.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].interaction_type, InteractionType::ManualCorrection);
    }
}
