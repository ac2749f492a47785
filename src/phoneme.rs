//! Phoneme inventory mapping.
//!
//! Rewrites transcriptions from a source inventory (generic or General
//! American IPA) into the Australian target inventory. Substitution is a
//! single left-to-right scan with longest-match-first, so already-mapped
//! symbols guarded by identity rules are left alone. The scan is not aware of
//! phoneme boundaries: a rule may rewrite a substring of a larger phoneme.

use crate::error::{IpaError, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Built-in substitution table used when no external table is available.
///
/// Identity entries protect symbols that are already in target form from
/// being rewritten by a shorter rule.
pub const DEFAULT_RULES: &[(&str, &str)] = &[
    // Centring diphthongs gain the non-syllabic offglide
    ("ɪə", "ɪə̯"),
    ("ʊə", "ʊə̯"),
    ("eə", "eə̯"),
    ("ɛə", "eə̯"),
    ("ɪɚ", "ɪə̯"),
    ("ʊɚ", "ʊə̯"),
    ("ɛɚ", "eə̯"),
    ("ɪə̯", "ɪə̯"),
    ("ʊə̯", "ʊə̯"),
    ("eə̯", "eə̯"),
    // Closing diphthongs
    ("eɪ", "æɪ"),
    ("ɛɪ", "æɪ"),
    ("aɪ", "ɑɪ"),
    ("ɑe", "ɑɪ"),
    ("aʊ", "æʊ"),
    ("oʊ", "əʊ"),
    ("əʉ", "əʊ"),
    // Monophthongs
    ("ɔː", "oː"),
    ("ɝ", "ɜː"),
    ("ɚ", "ə"),
    ("ɛ", "e"),
    ("ʉ", "ʉː"),
    ("ʉː", "ʉː"),
    ("ɹ", "r"),
    // Long vowels already in target form
    ("æː", "æː"),
    ("ɑː", "ɑː"),
    ("iː", "iː"),
    ("uː", "uː"),
    ("oː", "oː"),
];

/// ARPAbet symbols (stress digits removed) to generic IPA.
const ARPABET: &[(&str, &str)] = &[
    ("AA", "ɑː"),
    ("AE", "æ"),
    ("AH", "ə"),
    ("AO", "ɔː"),
    ("AW", "aʊ"),
    ("AY", "aɪ"),
    ("B", "b"),
    ("CH", "tʃ"),
    ("D", "d"),
    ("DH", "ð"),
    ("EH", "ɛ"),
    ("ER", "ɝ"),
    ("EY", "eɪ"),
    ("F", "f"),
    ("G", "ɡ"),
    ("HH", "h"),
    ("IH", "ɪ"),
    ("IY", "iː"),
    ("JH", "dʒ"),
    ("K", "k"),
    ("L", "l"),
    ("M", "m"),
    ("N", "n"),
    ("NG", "ŋ"),
    ("OW", "oʊ"),
    ("OY", "ɔɪ"),
    ("P", "p"),
    ("R", "r"),
    ("S", "s"),
    ("SH", "ʃ"),
    ("T", "t"),
    ("TH", "θ"),
    ("UH", "ʊ"),
    ("UW", "uː"),
    ("V", "v"),
    ("W", "w"),
    ("Y", "j"),
    ("Z", "z"),
    ("ZH", "ʒ"),
];

/// Source-to-target symbol substitution table.
#[derive(Debug, Clone, PartialEq)]
pub struct PhonemeMap {
    /// Rules sorted by descending source length (in chars), then lexically.
    rules: Vec<(String, String)>,
}

impl Default for PhonemeMap {
    fn default() -> Self {
        Self::from_pairs(
            DEFAULT_RULES
                .iter()
                .map(|(s, t)| (s.to_string(), t.to_string())),
        )
    }
}

impl PhonemeMap {
    /// Build a map from source/target pairs. Empty source symbols are ignored;
    /// a repeated source keeps its last target.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let table: BTreeMap<String, String> = pairs
            .into_iter()
            .filter(|(source, _)| !source.is_empty())
            .collect();
        let mut rules: Vec<(String, String)> = table.into_iter().collect();
        rules.sort_by(|a, b| {
            b.0.chars()
                .count()
                .cmp(&a.0.chars().count())
                .then_with(|| a.0.cmp(&b.0))
        });
        Self { rules }
    }

    /// Parse a JSON object of `"source": "target"` pairs.
    pub fn from_json(json: &str) -> Result<Self> {
        let table: BTreeMap<String, String> = serde_json::from_str(json)?;
        Ok(Self::from_pairs(table))
    }

    /// Load a JSON table from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents).map_err(|e| IpaError::ResourceParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load the table at `path`, falling back to the built-in table when the
    /// path is absent, unreadable or invalid.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::from_file(path) {
            Ok(map) if !map.is_empty() => map,
            Ok(_) => {
                tracing::warn!(path = %path.display(), "phoneme map is empty, using built-in table");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "phoneme map unavailable, using built-in table");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrite a transcription into the target inventory.
    ///
    /// Total: unmapped characters pass through unchanged.
    pub fn map(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len() + source.len() / 4);
        let mut rest = source;
        'scan: while !rest.is_empty() {
            for (from, to) in &self.rules {
                if let Some(tail) = rest.strip_prefix(from.as_str()) {
                    out.push_str(to);
                    rest = tail;
                    continue 'scan;
                }
            }
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
        out
    }
}

/// Convert a whitespace-separated ARPAbet sequence into generic IPA.
///
/// Stress digits are dropped and unknown symbols pass through lowercased.
pub fn arpabet_to_ipa(phonemes: &str) -> String {
    phonemes
        .split_whitespace()
        .map(|symbol| {
            let bare = symbol.trim_end_matches(|c: char| c.is_ascii_digit());
            ARPABET
                .iter()
                .find(|(arpa, _)| arpa.eq_ignore_ascii_case(bare))
                .map(|(_, ipa)| ipa.to_string())
                .unwrap_or_else(|| bare.to_lowercase())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_table_has_at_least_fifteen_rules() {
        assert!(PhonemeMap::default().len() >= 15);
    }

    #[test]
    fn map_rewrites_general_american_diphthongs() {
        let map = PhonemeMap::default();
        assert_eq!(map.map("deɪ"), "dæɪ");
        assert_eq!(map.map("ɡoʊ"), "ɡəʊ");
        assert_eq!(map.map("taɪm"), "tɑɪm");
        assert_eq!(map.map("əˈbaʊt"), "əˈbæʊt");
    }

    #[test]
    fn map_prefers_longest_match() {
        let map = PhonemeMap::default();
        // "ɪə" must win over any single-symbol rule
        assert_eq!(map.map("hɪə"), "hɪə̯");
        // Long vowels already in target form are guarded
        assert_eq!(map.map("dæːns"), "dæːns");
        assert_eq!(map.map("ʉː"), "ʉː");
        assert_eq!(map.map("ʉ"), "ʉː");
        // GA open-mid onset and r-coloured offglide still form one diphthong
        assert_eq!(map.map("ðɛə"), "ðeə̯");
        assert_eq!(map.map("hɪɚ"), "hɪə̯");
    }

    #[test]
    fn map_is_stable_on_already_mapped_output() {
        let map = PhonemeMap::default();
        for input in ["hɪə", "ʃʊə", "ðeə", "deɪ", "θɔːt", "bɝd", "ðɛə", "hɪɚ", "ðɛɚ", "dɛɪ"] {
            let once = map.map(input);
            assert_eq!(map.map(&once), once, "remapping {input} changed {once}");
        }
    }

    #[test]
    fn map_is_identity_without_source_symbols() {
        let map = PhonemeMap::default();
        for input in ["", "hello", "kæt", "123", "ʃ"] {
            assert_eq!(map.map(input), input);
            assert_eq!(map.map(&map.map(input)), input);
        }
    }

    #[test]
    fn map_substitutions_do_not_overlap() {
        let map = PhonemeMap::from_pairs(vec![
            ("ab".to_string(), "X".to_string()),
            ("bc".to_string(), "Y".to_string()),
        ]);
        assert_eq!(map.map("abc"), "Xc");
        assert_eq!(map.map("bcab"), "YX");
    }

    #[test]
    fn empty_source_symbol_is_ignored() {
        let map = PhonemeMap::from_pairs(vec![(String::new(), "x".to_string())]);
        assert!(map.is_empty());
        assert_eq!(map.map("abc"), "abc");
    }

    #[test]
    fn from_json_parses_object() {
        let map = PhonemeMap::from_json(r#"{"a": "b", "ɛ": "e"}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.map("ɛa"), "eb");
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let map = PhonemeMap::load_or_default(Some(Path::new("/nonexistent/hce_map.json")));
        assert_eq!(map, PhonemeMap::default());
    }

    #[test]
    fn load_or_default_falls_back_on_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[not, an, object").unwrap();
        let map = PhonemeMap::load_or_default(Some(file.path()));
        assert_eq!(map, PhonemeMap::default());
    }

    #[test]
    fn load_or_default_uses_external_table() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(r#"{"æ": "æː"}"#.as_bytes()).unwrap();
        let map = PhonemeMap::load_or_default(Some(file.path()));
        assert_eq!(map.len(), 1);
        assert_eq!(map.map("kæt"), "kæːt");
    }

    #[test]
    fn arpabet_converts_and_strips_stress() {
        assert_eq!(arpabet_to_ipa("D AE1 N S"), "dæns");
        assert_eq!(arpabet_to_ipa("HH AH0 L OW1"), "həloʊ");
        assert_eq!(arpabet_to_ipa("TH IY1"), "θiː");
    }

    #[test]
    fn arpabet_passes_unknown_symbols_through() {
        assert_eq!(arpabet_to_ipa("QX1 K"), "qxk");
        assert_eq!(arpabet_to_ipa(""), "");
    }

    #[test]
    fn arpabet_output_maps_into_target_inventory() {
        let map = PhonemeMap::default();
        assert_eq!(map.map(&arpabet_to_ipa("G OW1")), "ɡəʊ");
        assert_eq!(map.map(&arpabet_to_ipa("B ER1 D")), "bɜːd");
    }
}
