//! IPA → word lookup.
//!
//! The index is rebuilt on demand from every pronunciation source the engine
//! knows about. Entries are kept per exact IPA string; lookups never filter,
//! they only move entries of the preferred dialect to the front.

use crate::lexicon::{Dialect, PronunciationSource, ReferenceDictionary};
use crate::store::{CustomPronunciation, LearningEvent, OverrideTable};
use serde::Serialize;
use std::collections::HashMap;

/// A word that may be spelled by some IPA string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReverseCandidate {
    pub word: String,
    pub dialect: Dialect,
    pub source: PronunciationSource,
    /// Taught, corrected or promoted by the user.
    pub is_custom: bool,
    /// Highest ledger confidence, for learned entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ReverseCandidate {
    fn same_origin(&self, other: &ReverseCandidate) -> bool {
        self.word == other.word
            && self.dialect == other.dialect
            && self.source == other.source
            && self.is_custom == other.is_custom
    }
}

/// Matches for one whitespace-separated segment of a phrase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentMatches {
    pub ipa: String,
    pub candidates: Vec<ReverseCandidate>,
}

#[derive(Debug, Default)]
pub struct ReverseIndex {
    entries: HashMap<String, Vec<ReverseCandidate>>,
}

impl ReverseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct IPA keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add one mapping. Duplicates of the same origin are merged, keeping the
    /// highest confidence.
    pub fn insert(&mut self, ipa: &str, candidate: ReverseCandidate) {
        let ipa = ipa.trim();
        if ipa.is_empty() || candidate.word.is_empty() {
            return;
        }
        let list = self.entries.entry(ipa.to_string()).or_default();
        match list.iter_mut().find(|existing| existing.same_origin(&candidate)) {
            Some(existing) => {
                existing.confidence = match (existing.confidence, candidate.confidence) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (a, b) => a.or(b),
                };
            }
            None => list.push(candidate),
        }
    }

    pub fn add_overrides(&mut self, overrides: &OverrideTable, dialect: &Dialect) {
        for (word, ipa) in overrides {
            self.insert(
                ipa,
                ReverseCandidate {
                    word: word.clone(),
                    dialect: dialect.clone(),
                    source: PronunciationSource::Override,
                    is_custom: true,
                    confidence: None,
                },
            );
        }
    }

    /// Ledger choices whose confidence reached `min_confidence`.
    pub fn add_learned(&mut self, events: &[LearningEvent], dialect: &Dialect, min_confidence: f64) {
        for event in events.iter().filter(|e| e.confidence >= min_confidence) {
            self.insert(
                &event.ipa_choice,
                ReverseCandidate {
                    word: event.word.clone(),
                    dialect: dialect.clone(),
                    source: PronunciationSource::Learned,
                    is_custom: true,
                    confidence: Some(event.confidence),
                },
            );
        }
    }

    pub fn add_custom(&mut self, entries: &[CustomPronunciation]) {
        for entry in entries {
            self.insert(
                &entry.ipa,
                ReverseCandidate {
                    word: entry.word.trim().to_lowercase(),
                    dialect: entry.dialect.clone(),
                    source: entry.source,
                    is_custom: true,
                    confidence: None,
                },
            );
        }
    }

    pub fn add_reference(&mut self, reference: &ReferenceDictionary) {
        for (word, ipa) in &reference.entries {
            self.insert(
                ipa,
                ReverseCandidate {
                    word: word.clone(),
                    dialect: reference.dialect.clone(),
                    source: reference.source,
                    is_custom: false,
                    confidence: None,
                },
            );
        }
    }

    /// Every word recorded for `ipa`, preferred dialect first. Order within
    /// each group is insertion order.
    pub fn lookup(&self, ipa: &str, preferred: Option<&Dialect>) -> Vec<ReverseCandidate> {
        let mut found = self.entries.get(ipa.trim()).cloned().unwrap_or_default();
        if let Some(dialect) = preferred {
            found.sort_by_key(|c| &c.dialect != dialect);
        }
        found
    }

    /// Look up each whitespace-separated segment of `text`, keeping at most
    /// `limit` candidates per segment.
    pub fn lookup_phrase(
        &self,
        text: &str,
        preferred: Option<&Dialect>,
        limit: usize,
    ) -> Vec<SegmentMatches> {
        text.split_whitespace()
            .map(|segment| {
                let mut candidates = self.lookup(segment, preferred);
                candidates.truncate(limit);
                SegmentMatches {
                    ipa: segment.to_string(),
                    candidates,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InteractionType;

    fn words(found: &[ReverseCandidate]) -> Vec<&str> {
        found.iter().map(|c| c.word.as_str()).collect()
    }

    #[test]
    fn australian_reference_is_searchable() {
        let mut index = ReverseIndex::new();
        index.add_reference(&ReferenceDictionary::australian());
        let found = index.lookup("dæːns", None);
        assert_eq!(words(&found), vec!["dance"]);
        assert_eq!(found[0].source, PronunciationSource::AusOverride);
        assert!(!found[0].is_custom);
    }

    #[test]
    fn lookup_trims_and_misses_return_empty() {
        let mut index = ReverseIndex::new();
        index.add_reference(&ReferenceDictionary::australian());
        assert_eq!(index.lookup("  pɑːθ ", None).len(), 1);
        assert!(index.lookup("zzz", None).is_empty());
    }

    #[test]
    fn preferred_dialect_sorts_first_without_filtering() {
        let mut index = ReverseIndex::new();
        index.add_reference(&ReferenceDictionary::parse_cmu("READ  R EH1 D\n"));
        index.add_custom(&[CustomPronunciation::user("red", "rɛd", Dialect::Au)]);

        let any = index.lookup("rɛd", None);
        assert_eq!(words(&any), vec!["read", "red"]);

        let au = index.lookup("rɛd", Some(&Dialect::Au));
        assert_eq!(words(&au), vec!["red", "read"]);
    }

    #[test]
    fn duplicate_origins_are_merged_keeping_best_confidence() {
        let mut index = ReverseIndex::new();
        let events = vec![
            LearningEvent::new("dance", None, "dæːns", InteractionType::Selection, 0.65, 1, 1),
            LearningEvent::new("dance", None, "dæːns", InteractionType::AcceptAll, 0.9, 2, 2),
            LearningEvent::new("dance", None, "dɑːns", InteractionType::Selection, 0.3, 1, 3),
        ];
        index.add_learned(&events, &Dialect::Au, 0.6);

        let found = index.lookup("dæːns", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].confidence, Some(0.9));
        assert!(index.lookup("dɑːns", None).is_empty());
    }

    #[test]
    fn same_word_from_different_sources_is_kept() {
        let mut index = ReverseIndex::new();
        index.add_reference(&ReferenceDictionary::australian());
        let mut overrides = OverrideTable::new();
        overrides.insert("dance".to_string(), "dæːns".to_string());
        index.add_overrides(&overrides, &Dialect::Au);

        let found = index.lookup("dæːns", None);
        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|c| c.source == PronunciationSource::Override && c.is_custom));
    }

    #[test]
    fn phrase_lookup_segments_and_limits() {
        let mut index = ReverseIndex::new();
        index.add_reference(&ReferenceDictionary::australian());
        for n in 0..5 {
            index.add_custom(&[CustomPronunciation::user(&format!("w{n}"), "bɑːθ", Dialect::Au)]);
        }

        let segments = index.lookup_phrase("dæːns  bɑːθ xyz", None, 3);

        assert_eq!(segments.len(), 3);
        assert_eq!(words(&segments[0].candidates), vec!["dance"]);
        assert_eq!(segments[1].candidates.len(), 3);
        assert_eq!(segments[1].candidates[0].word, "bath");
        assert!(segments[2].candidates.is_empty());
    }
}
