//! Per-token resolution results owned by the caller.

use crate::text::WordToken;
use serde::{Deserialize, Serialize};

/// Ordered, distinct IPA options for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet {
    pub options: Vec<String>,
    /// True when the single option came from the override table.
    pub has_override: bool,
}

impl CandidateSet {
    pub fn generated(options: Vec<String>) -> Self {
        Self {
            options,
            has_override: false,
        }
    }

    pub fn overridden(ipa: String) -> Self {
        Self {
            options: vec![ipa],
            has_override: true,
        }
    }

    pub fn first(&self) -> Option<&str> {
        self.options.first().map(String::as_str)
    }
}

/// A token with its candidates and the user's decision about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub token: WordToken,
    pub candidates: CandidateSet,
    pub selected: Option<String>,
    /// Typed by the user; wins over `selected`.
    pub correction: Option<String>,
}

impl ResolutionResult {
    /// Result with the first option preselected.
    pub fn new(token: WordToken, candidates: CandidateSet) -> Self {
        let selected = candidates.first().map(str::to_string);
        Self {
            token,
            candidates,
            selected,
            correction: None,
        }
    }

    /// Non-word tokens resolve to themselves.
    pub fn literal(token: WordToken) -> Self {
        let candidates = CandidateSet::generated(vec![token.original.clone()]);
        Self::new(token, candidates)
    }

    /// Select an option by index. Out-of-range indexes are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        match self.candidates.options.get(index) {
            Some(option) => {
                self.selected = Some(option.clone());
                true
            }
            None => false,
        }
    }

    /// Set a manual correction. A blank correction clears it.
    pub fn correct(&mut self, ipa: &str) {
        let ipa = ipa.trim();
        self.correction = (!ipa.is_empty()).then(|| ipa.to_string());
    }

    /// Correction, else selection, else first option.
    pub fn final_choice(&self) -> Option<&str> {
        self.correction
            .as_deref()
            .or(self.selected.as_deref())
            .or_else(|| self.candidates.first())
    }
}
