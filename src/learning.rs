//! Confidence scoring and promotion of learned pronunciations.
//!
//! Confidence is never cached: every interaction replays the ledger for the
//! word, adds the current choice and scores it as its share of all choices,
//! boosted by how deliberate the interaction was.

use crate::defaults;
use crate::store::{InteractionType, LearningEvent, Storage};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Tunables of the confidence model.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningPolicy {
    pub confidence_threshold: f64,
    pub min_repeats: u32,
    pub manual_correction_multiplier: f64,
    pub accept_all_multiplier: f64,
    /// Promote every manual correction and accept-all regardless of score.
    pub promote_strong_interactions: bool,
}

impl Default for LearningPolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: defaults::CONFIDENCE_THRESHOLD,
            min_repeats: defaults::MIN_REPEATS,
            manual_correction_multiplier: defaults::MANUAL_CORRECTION_MULTIPLIER,
            accept_all_multiplier: defaults::ACCEPT_ALL_MULTIPLIER,
            promote_strong_interactions: defaults::PROMOTE_STRONG_INTERACTIONS,
        }
    }
}

impl LearningPolicy {
    pub fn multiplier(&self, interaction: InteractionType) -> f64 {
        match interaction {
            InteractionType::Selection => 1.0,
            InteractionType::ManualCorrection => self.manual_correction_multiplier,
            InteractionType::AcceptAll => self.accept_all_multiplier,
        }
    }

    pub fn should_promote(&self, confidence: f64, count: u32, interaction: InteractionType) -> bool {
        let earned = confidence >= self.confidence_threshold && count >= self.min_repeats;
        let strong = self.promote_strong_interactions
            && matches!(
                interaction,
                InteractionType::ManualCorrection | InteractionType::AcceptAll
            );
        earned || strong
    }
}

/// Score of one choice after it has been counted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub confidence: f64,
    /// Times this choice has been made, including now.
    pub selection_count: u32,
    /// Times any choice has been made for the word, including now.
    pub total_word_selections: u32,
}

/// Score `choice` given the prior per-choice counts of a word.
pub fn score_choice(
    prior: &BTreeMap<String, u32>,
    choice: &str,
    interaction: InteractionType,
    policy: &LearningPolicy,
) -> Score {
    let selection_count = prior.get(choice).copied().unwrap_or(0) + 1;
    let total_word_selections = prior.values().sum::<u32>() + 1;
    let base = f64::from(selection_count) / f64::from(total_word_selections);
    let confidence = (base * policy.multiplier(interaction)).clamp(0.0, 1.0);
    Score {
        confidence,
        selection_count,
        total_word_selections,
    }
}

/// Result of recording one interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordOutcome {
    pub confidence: f64,
    pub selection_count: u32,
    pub total_word_selections: u32,
    pub promoted: bool,
    /// Persistence problems that did not stop the session.
    pub warnings: Vec<String>,
}

/// Record one interaction: score it, append it to the ledger and promote it
/// to the override table when the policy says so.
///
/// `word` must already be clean. Empty word or IPA records nothing.
pub fn record(
    storage: &mut Storage,
    policy: &LearningPolicy,
    word: &str,
    original_word: Option<&str>,
    ipa: &str,
    interaction: InteractionType,
) -> RecordOutcome {
    if word.is_empty() || ipa.is_empty() {
        return RecordOutcome::default();
    }

    let prior = storage.ledger.choice_counts(word);
    let score = score_choice(&prior, ipa, interaction, policy);
    let mut outcome = RecordOutcome {
        confidence: score.confidence,
        selection_count: score.selection_count,
        total_word_selections: score.total_word_selections,
        ..RecordOutcome::default()
    };

    let event = LearningEvent::new(
        word,
        original_word,
        ipa,
        interaction,
        score.confidence,
        score.selection_count,
        score.total_word_selections,
    );
    if let Err(e) = storage.ledger.append(event) {
        outcome.warnings.push(e.to_string());
    }

    if policy.should_promote(score.confidence, score.selection_count, interaction) {
        outcome.promoted = true;
        tracing::debug!(word, ipa, confidence = score.confidence, %interaction, "promoting to override");
        if let Err(e) = storage.overrides.set(word, ipa) {
            outcome.warnings.push(e.to_string());
        }
    }
    outcome
}

/// Per-word override choice derived from the ledger: the latest manual
/// correction, or the latest choice of any kind when there is none.
pub fn derive_overrides(events: &[LearningEvent]) -> BTreeMap<String, String> {
    let mut latest: BTreeMap<String, String> = BTreeMap::new();
    let mut corrected: BTreeMap<String, String> = BTreeMap::new();
    for event in events {
        if event.word.is_empty() || event.ipa_choice.is_empty() {
            continue;
        }
        latest.insert(event.word.clone(), event.ipa_choice.clone());
        if event.interaction_type == InteractionType::ManualCorrection {
            corrected.insert(event.word.clone(), event.ipa_choice.clone());
        }
    }
    latest.extend(corrected);
    latest
}

/// Replay the ledger into the override table. Returns the number of words
/// written and any write failures.
pub fn rebuild_overrides(storage: &mut Storage) -> (usize, Vec<String>) {
    let table = derive_overrides(&storage.ledger.events());
    let mut warnings = Vec::new();
    for (word, ipa) in &table {
        if let Err(e) = storage.overrides.set(word, ipa) {
            warnings.push(e.to_string());
        }
    }
    tracing::info!(words = table.len(), "rebuilt overrides from ledger");
    (table.len(), warnings)
}

/// Summary of everything learned so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LearningStats {
    pub total_interactions: usize,
    pub unique_words: usize,
    pub manual_corrections: usize,
    /// Events whose confidence reached the threshold.
    pub high_confidence_events: usize,
    /// Entries currently in the override table.
    pub auto_promotions: usize,
    pub custom_pronunciations: usize,
    pub custom_by_dialect: BTreeMap<String, usize>,
    pub accepted_sentences: usize,
}

pub fn stats(storage: &Storage, threshold: f64) -> LearningStats {
    let events = storage.ledger.events();
    let unique: BTreeSet<&str> = events.iter().map(|e| e.word.as_str()).collect();
    let custom = storage.custom.entries();
    let mut by_dialect: HashMap<String, usize> = HashMap::new();
    for entry in &custom {
        *by_dialect.entry(entry.dialect.to_string()).or_default() += 1;
    }

    LearningStats {
        total_interactions: events.len(),
        unique_words: unique.len(),
        manual_corrections: events
            .iter()
            .filter(|e| e.interaction_type == InteractionType::ManualCorrection)
            .count(),
        high_confidence_events: events.iter().filter(|e| e.confidence >= threshold).count(),
        auto_promotions: storage.overrides.snapshot().len(),
        custom_pronunciations: custom.len(),
        custom_by_dialect: by_dialect.into_iter().collect(),
        accepted_sentences: storage.sentences.read_all().len(),
    }
}
