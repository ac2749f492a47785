//! Transcription engine: resolution, learning and reverse lookup.

use crate::assemble::assemble;
use crate::candidates::CandidateGenerator;
use crate::config::Config;
use crate::defaults;
use crate::error::Result;
use crate::learning::{self, LearningPolicy, LearningStats, RecordOutcome};
use crate::lexicon::{Dialect, FallbackTable, ReferenceDictionary, load_references};
use crate::phoneme::PhonemeMap;
use crate::resolution::{CandidateSet, ResolutionResult};
use crate::reverse::{ReverseCandidate, ReverseIndex, SegmentMatches};
use crate::store::{CustomPronunciation, InteractionType, SentenceRecord, Storage};
use crate::synth::{EspeakSynthesizer, NoSynthesizer, Synthesizer};
use crate::text::{clean_word, tokenize};
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of accepting a whole sentence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AcceptSummary {
    pub full_ipa: String,
    /// Word tokens recorded to the ledger.
    pub learned: usize,
    pub promoted: usize,
    pub warnings: Vec<String>,
}

/// Capability and table report for `check`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    pub version: String,
    pub dialect: String,
    pub synthesizer: String,
    pub synthesizer_available: bool,
    pub phoneme_rules: usize,
    pub fallback_words: usize,
    pub reference_dictionaries: Vec<(String, usize)>,
    pub overrides: usize,
    pub data_dir: Option<PathBuf>,
}

pub struct Engine {
    generator: CandidateGenerator,
    storage: Storage,
    policy: LearningPolicy,
    references: Vec<ReferenceDictionary>,
    reverse_threshold: f64,
}

impl Engine {
    pub fn new(
        generator: CandidateGenerator,
        storage: Storage,
        policy: LearningPolicy,
        references: Vec<ReferenceDictionary>,
    ) -> Self {
        Self {
            generator,
            storage,
            policy,
            references,
            reverse_threshold: defaults::REVERSE_INCLUSION_THRESHOLD,
        }
    }

    /// Engine on built-in tables and in-memory storage, with no synthesizer.
    pub fn offline(dialect: Dialect) -> Self {
        Self::new(
            CandidateGenerator::offline(dialect),
            Storage::in_memory(),
            LearningPolicy::default(),
            vec![ReferenceDictionary::australian()],
        )
    }

    /// Build an engine from configuration: load tables, probe the
    /// synthesizer and open file-backed storage.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let dialect = config.dialect();
        let phonemes = PhonemeMap::load_or_default(config.paths.phoneme_map.as_deref());
        let fallback = FallbackTable::load(config.paths.fallback_table.as_deref());
        let synthesizer: Box<dyn Synthesizer> = if config.synthesizer.enabled {
            Box::new(EspeakSynthesizer::system(
                &config.synthesizer.command,
                config.synthesizer.voice.clone(),
                config.synthesizer_timeout(),
            ))
        } else {
            Box::new(NoSynthesizer)
        };
        let data_dir = config.data_dir();
        tracing::debug!(dialect = %dialect, data_dir = %data_dir.display(), "engine configured");

        let generator = CandidateGenerator::new(phonemes, fallback, synthesizer, dialect);
        let references = load_references(config.paths.cmu_dict.as_deref());
        Ok(Self::new(
            generator,
            Storage::open(data_dir),
            config.learning_policy(),
            references,
        )
        .with_reverse_threshold(config.learning.reverse_inclusion_threshold))
    }

    pub fn with_reverse_threshold(mut self, threshold: f64) -> Self {
        self.reverse_threshold = threshold;
        self
    }

    pub fn policy(&self) -> &LearningPolicy {
        &self.policy
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn dialect(&self) -> &Dialect {
        self.generator.dialect()
    }

    /// Tokenize `text` and resolve every token.
    ///
    /// Overrides are read once per call; an overridden word gets its override
    /// as the sole candidate.
    pub fn resolve(&self, text: &str) -> Vec<ResolutionResult> {
        let overrides = self.storage.overrides.snapshot();
        tokenize(text)
            .into_iter()
            .map(|token| {
                if !token.is_word {
                    return ResolutionResult::literal(token);
                }
                let candidates = match overrides.get(&token.clean) {
                    Some(ipa) => CandidateSet::overridden(ipa.clone()),
                    None => CandidateSet::generated(self.generator.generate(&token.clean)),
                };
                ResolutionResult::new(token, candidates)
            })
            .collect()
    }

    /// Record one user interaction with `word` (cleaned here).
    pub fn record_interaction(
        &mut self,
        word: &str,
        ipa: &str,
        interaction: InteractionType,
    ) -> RecordOutcome {
        let clean = clean_word(word);
        let original = (clean != word).then_some(word);
        let outcome = learning::record(
            &mut self.storage,
            &self.policy,
            &clean,
            original,
            ipa.trim(),
            interaction,
        );
        for warning in &outcome.warnings {
            tracing::warn!(word = %clean, "{warning}");
        }
        outcome
    }

    /// Learn every word of an accepted sentence and log the sentence.
    pub fn accept_all(&mut self, text: &str, results: &[ResolutionResult]) -> AcceptSummary {
        let mut summary = AcceptSummary {
            full_ipa: assemble(results),
            ..AcceptSummary::default()
        };
        for result in results.iter().filter(|r| r.token.is_word) {
            let Some(choice) = result.final_choice() else {
                continue;
            };
            let choice = choice.to_string();
            let outcome =
                self.record_interaction(&result.token.original, &choice, InteractionType::AcceptAll);
            summary.learned += 1;
            if outcome.promoted {
                summary.promoted += 1;
            }
            summary.warnings.extend(outcome.warnings);
        }

        let record = SentenceRecord::new(text, &summary.full_ipa, summary.learned, summary.promoted);
        if let Err(e) = self.storage.sentences.append(record) {
            tracing::warn!(error = %e, "sentence log entry kept in memory only");
            summary.warnings.push(e.to_string());
        }
        tracing::info!(learned = summary.learned, promoted = summary.promoted, "sentence accepted");
        summary
    }

    /// Write an override directly, bypassing the confidence model.
    pub fn force_save(&mut self, word: &str, ipa: &str) -> Result<()> {
        let clean = clean_word(word);
        self.storage.overrides.set(&clean, ipa.trim())
    }

    /// Add a custom pronunciation for reverse lookup.
    pub fn teach(&mut self, word: &str, ipa: &str, dialect: Dialect) -> Result<()> {
        let word = word.trim().to_lowercase();
        self.storage
            .custom
            .add(CustomPronunciation::user(&word, ipa.trim(), dialect))
    }

    /// Build a fresh reverse index from every pronunciation source.
    pub fn reverse_index(&self) -> ReverseIndex {
        let dialect = self.generator.dialect();
        let mut index = ReverseIndex::new();
        index.add_overrides(&self.storage.overrides.snapshot(), dialect);
        index.add_learned(&self.storage.ledger.events(), dialect, self.reverse_threshold);
        index.add_custom(&self.storage.custom.entries());
        for reference in &self.references {
            index.add_reference(reference);
        }
        index
    }

    pub fn reverse_lookup(&self, ipa: &str, preferred: Option<&Dialect>) -> Vec<ReverseCandidate> {
        self.reverse_index().lookup(ipa, preferred)
    }

    pub fn reverse_lookup_phrase(
        &self,
        text: &str,
        preferred: Option<&Dialect>,
        limit: usize,
    ) -> Vec<SegmentMatches> {
        self.reverse_index().lookup_phrase(text, preferred, limit)
    }

    /// Rewrite overrides from the ledger. Returns the number of words written.
    pub fn rebuild_overrides(&mut self) -> (usize, Vec<String>) {
        learning::rebuild_overrides(&mut self.storage)
    }

    pub fn stats(&self) -> LearningStats {
        learning::stats(&self.storage, self.policy.confidence_threshold)
    }

    /// Remove all learned state. Idempotent.
    pub fn clear_all(&mut self) -> Result<()> {
        self.storage.clear_all()?;
        tracing::info!("cleared all learned data");
        Ok(())
    }

    pub fn system_info(&self) -> SystemInfo {
        let synthesizer = self.generator.synthesizer();
        SystemInfo {
            version: crate::version_string(),
            dialect: self.generator.dialect().to_string(),
            synthesizer: synthesizer.name().to_string(),
            synthesizer_available: synthesizer.is_available(),
            phoneme_rules: self.generator.phonemes().len(),
            fallback_words: self.generator.fallback().len(),
            reference_dictionaries: self
                .references
                .iter()
                .map(|r| (r.source.to_string(), r.len()))
                .collect(),
            overrides: self.storage.overrides.snapshot().len(),
            data_dir: self.storage.dir().map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::tests::MockCommandExecutor;
    use std::time::Duration;

    fn engine() -> Engine {
        Engine::offline(Dialect::Au)
    }

    fn lenient() -> LearningPolicy {
        LearningPolicy {
            confidence_threshold: 0.5,
            min_repeats: 1,
            promote_strong_interactions: false,
            ..LearningPolicy::default()
        }
    }

    #[test]
    fn resolve_without_corrections_assembles_first_candidates() {
        let engine = engine();
        let results = engine.resolve("The cat sat on the mat");
        let expected: Vec<&str> = results
            .iter()
            .map(|r| r.candidates.options[0].as_str())
            .collect();
        assert_eq!(assemble(&results), expected.join(" "));
        assert_eq!(assemble(&results), "ðə kæt sæt ɔn ðə mæt");
    }

    #[test]
    fn resolve_keeps_punctuation_tokens_literal() {
        let results = engine().resolve("well , ok");
        assert_eq!(results.len(), 3);
        assert!(!results[1].token.is_word);
        assert_eq!(results[1].candidates.options, vec![","]);
        assert_eq!(results[1].final_choice(), Some(","));
    }

    #[test]
    fn resolve_empty_text_is_empty() {
        assert!(engine().resolve("   ").is_empty());
    }

    #[test]
    fn manual_correction_promotes_and_overrides() {
        let mut engine = Engine::new(
            CandidateGenerator::offline(Dialect::Au),
            Storage::in_memory(),
            lenient(),
            vec![],
        );
        let outcome = engine.record_interaction("dance", "dæːns", InteractionType::ManualCorrection);
        assert!(outcome.promoted);

        let results = engine.resolve("I can't dance");
        let dance = &results[2];
        assert!(dance.candidates.has_override);
        assert_eq!(dance.candidates.options, vec!["dæːns"]);
        assert_eq!(dance.selected.as_deref(), Some("dæːns"));
    }

    #[test]
    fn record_interaction_cleans_word_and_keeps_original() {
        let mut engine = engine();
        engine.record_interaction("Dance!", "dæːns", InteractionType::Selection);
        let events = engine.storage().ledger.events();
        assert_eq!(events[0].word, "dance");
        assert_eq!(events[0].original_word.as_deref(), Some("Dance!"));
    }

    #[test]
    fn record_interaction_with_empty_word_is_noop() {
        let mut engine = engine();
        let outcome = engine.record_interaction("!!", "x", InteractionType::Selection);
        assert!(!outcome.promoted);
        assert!(engine.storage().ledger.events().is_empty());
    }

    #[test]
    fn accept_all_learns_words_and_logs_sentence() {
        let mut engine = engine();
        let mut results = engine.resolve("I can't dance !");
        results[2].correct("dɑːns");

        let summary = engine.accept_all("I can't dance !", &results);

        assert_eq!(summary.learned, 3);
        assert_eq!(summary.promoted, 3);
        assert_eq!(summary.full_ipa, "ɑɪ kæːnt dɑːns !");
        assert_eq!(engine.storage().overrides.get("dance").as_deref(), Some("dɑːns"));
        let sentences = engine.storage().sentences.read_all();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].word_count, 3);
    }

    #[test]
    fn force_save_then_reverse_lookup() {
        let mut engine = engine();
        engine.force_save("Mate", "mæɪt").unwrap();
        let found = engine.reverse_lookup("mæɪt", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].word, "mate");
    }

    #[test]
    fn teach_adds_custom_reverse_entry() {
        let mut engine = engine();
        engine.teach(" Arvo ", "ɑːvəʊ", Dialect::Au).unwrap();
        let found = engine.reverse_lookup("ɑːvəʊ", Some(&Dialect::Au));
        assert_eq!(found[0].word, "arvo");
        assert!(found[0].is_custom);
    }

    #[test]
    fn low_confidence_events_stay_out_of_reverse_index() {
        let mut engine = Engine::new(
            CandidateGenerator::offline(Dialect::Au),
            Storage::in_memory(),
            LearningPolicy {
                promote_strong_interactions: false,
                ..LearningPolicy::default()
            },
            vec![],
        );
        engine.record_interaction("tomato", "təmɑːtəʊ", InteractionType::Selection);
        engine.record_interaction("tomato", "təmæɪtəʊ", InteractionType::Selection);
        // 1.0 then 0.5
        assert_eq!(engine.reverse_lookup("təmɑːtəʊ", None).len(), 1);
        assert!(engine.reverse_lookup("təmæɪtəʊ", None).is_empty());
    }

    #[test]
    fn clear_all_resets_resolution() {
        let mut engine = engine();
        engine.force_save("dance", "dæns").unwrap();
        engine.clear_all().unwrap();
        let results = engine.resolve("dance");
        assert!(!results[0].candidates.has_override);
        engine.clear_all().unwrap();
    }

    #[test]
    fn system_info_reports_tables() {
        let info = engine().system_info();
        assert!(info.version.starts_with(env!("CARGO_PKG_VERSION")));
        assert_eq!(info.dialect, "au");
        assert!(!info.synthesizer_available);
        assert!(info.phoneme_rules >= 15);
        assert!(info.fallback_words > 0);
        assert_eq!(info.reference_dictionaries, vec![("aus_override".to_string(), 9)]);
        assert_eq!(info.data_dir, None);
    }

    #[test]
    fn synthesizer_candidates_flow_into_resolution() {
        let generator = CandidateGenerator::new(
            PhonemeMap::default(),
            FallbackTable::empty(),
            Box::new(EspeakSynthesizer::new(
                MockCommandExecutor::new().with_response("ɡˈoʊ"),
                "espeak-ng",
                None,
                Duration::from_secs(1),
            )),
            Dialect::Au,
        );
        let engine = Engine::new(generator, Storage::in_memory(), LearningPolicy::default(), vec![]);
        let results = engine.resolve("go");
        assert_eq!(results[0].candidates.options[0], "ɡˈəʊ");
    }
}
