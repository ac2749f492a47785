//! Per-word IPA candidate generation.
//!
//! Sources are consulted in priority order and each appends distinct
//! candidates, preserving first-seen order:
//! 1. external synthesizer (if the capability probe succeeded)
//! 2. curated fallback table
//! 3. letter-pattern heuristic, only when 1 and 2 produced nothing
//! 4. dialect permutations of everything collected so far

use crate::lexicon::{Dialect, FallbackTable};
use crate::phoneme::PhonemeMap;
use crate::synth::{NoSynthesizer, Synthesizer, normalize_output};

/// Ordered digraph/vowel spellings rewritten by the heuristic.
const LETTER_PATTERNS: &[(&str, &str)] = &[
    ("th", "θ"),
    ("sh", "ʃ"),
    ("ch", "tʃ"),
    ("ng", "ŋ"),
    ("oo", "uː"),
    ("ee", "iː"),
    ("ay", "eɪ"),
    ("ow", "aʊ"),
];

/// Long-vowel realizations that alternate between broad and general speakers.
const VARIANT_SWAPS: &[(&str, &str)] = &[("æː", "ɑː"), ("ɑː", "æː"), ("ɪə̯", "ɪː")];

/// Maximum dialect variants derived from a single candidate.
const MAX_VARIANTS_PER_CANDIDATE: usize = 2;

/// Best-effort spelling-to-IPA approximation for unknown words.
pub fn letter_heuristic(word: &str) -> String {
    LETTER_PATTERNS
        .iter()
        .fold(word.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Up to two variants of `ipa` with alternating long vowels swapped.
///
/// Variants equal to the input or to each other are dropped.
pub fn dialect_variants(ipa: &str) -> Vec<String> {
    let mut variants: Vec<String> = Vec::new();
    for (from, to) in VARIANT_SWAPS {
        if variants.len() >= MAX_VARIANTS_PER_CANDIDATE {
            break;
        }
        if !ipa.contains(from) {
            continue;
        }
        let variant = ipa.replace(from, to);
        if variant != ipa && !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants
}

fn push_distinct(list: &mut Vec<String>, candidate: String) {
    if !candidate.is_empty() && !list.contains(&candidate) {
        list.push(candidate);
    }
}

/// Produces ordered IPA candidates for single words.
pub struct CandidateGenerator {
    phonemes: PhonemeMap,
    fallback: FallbackTable,
    synthesizer: Box<dyn Synthesizer>,
    dialect: Dialect,
}

impl CandidateGenerator {
    pub fn new(
        phonemes: PhonemeMap,
        fallback: FallbackTable,
        synthesizer: Box<dyn Synthesizer>,
        dialect: Dialect,
    ) -> Self {
        Self {
            phonemes,
            fallback,
            synthesizer,
            dialect,
        }
    }

    /// Generator backed only by the built-in tables.
    pub fn offline(dialect: Dialect) -> Self {
        Self::new(
            PhonemeMap::default(),
            FallbackTable::builtin(),
            Box::new(NoSynthesizer),
            dialect,
        )
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn synthesizer(&self) -> &dyn Synthesizer {
        self.synthesizer.as_ref()
    }

    pub fn phonemes(&self) -> &PhonemeMap {
        &self.phonemes
    }

    pub fn fallback(&self) -> &FallbackTable {
        &self.fallback
    }

    /// Candidates for a clean word. The first entry is the preferred pick.
    ///
    /// Non-empty for any non-empty input; empty input yields an empty list.
    pub fn generate(&self, word: &str) -> Vec<String> {
        if word.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();

        if let Some(ipa) = self.synthesize(word) {
            push_distinct(&mut candidates, ipa);
        }

        if let Some(variants) = self.fallback.get(word) {
            for variant in variants {
                push_distinct(&mut candidates, self.phonemes.map(variant));
            }
        }

        if candidates.is_empty() {
            push_distinct(
                &mut candidates,
                self.phonemes.map(&letter_heuristic(word)),
            );
        }

        let base_len = candidates.len();
        for idx in 0..base_len {
            for variant in dialect_variants(&candidates[idx]) {
                push_distinct(&mut candidates, variant);
            }
        }

        if candidates.is_empty() {
            candidates.push(word.to_string());
        }
        candidates
    }

    fn synthesize(&self, word: &str) -> Option<String> {
        if !self.synthesizer.is_available() {
            return None;
        }
        match self.synthesizer.synthesize(word, &self.dialect) {
            Ok(raw) => {
                let normalized = normalize_output(&raw);
                if normalized.is_empty() {
                    tracing::debug!(word, synthesizer = self.synthesizer.name(), "synthesizer returned no phonemes");
                    None
                } else {
                    Some(self.phonemes.map(&normalized))
                }
            }
            Err(e) => {
                tracing::debug!(word, synthesizer = self.synthesizer.name(), error = %e, "synthesizer failed, falling back");
                None
            }
        }
    }
}
