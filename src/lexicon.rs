//! Curated pronunciation tables.
//!
//! The fallback table supplies per-word candidates when the synthesizer is
//! unavailable. Reference dictionaries are dialect-tagged word/IPA lists used
//! only by the reverse resolver.

use crate::error::{IpaError, Result};
use crate::phoneme::arpabet_to_ipa;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Regional pronunciation norm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Dialect {
    Au,
    Us,
    Uk,
    Other(String),
}

impl Dialect {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Au => "au",
            Self::Us => "us",
            Self::Uk => "uk",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for Dialect {
    fn from(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "au" | "en-au" => Self::Au,
            "us" | "en-us" => Self::Us,
            "uk" | "gb" | "en-gb" => Self::Uk,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Dialect {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<Dialect> for String {
    fn from(dialect: Dialect) -> Self {
        dialect.as_str().to_string()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a pronunciation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PronunciationSource {
    /// CMU Pronouncing Dictionary (General American).
    Cmu,
    /// Built-in Australian reference table.
    AusOverride,
    /// Taught explicitly by a user.
    User,
    /// Promoted into the override table.
    Override,
    /// High-confidence learning ledger entry.
    Learned,
}

impl fmt::Display for PronunciationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cmu => "cmu",
            Self::AusOverride => "aus_override",
            Self::User => "user",
            Self::Override => "override",
            Self::Learned => "learned",
        };
        write!(f, "{name}")
    }
}

/// Built-in fallback candidates, in source inventory. Variants are ordered by preference.
const BUILTIN_FALLBACK: &[(&str, &[&str])] = &[
    ("a", &["ə", "eɪ"]),
    ("about", &["əˈbaʊt"]),
    ("an", &["ən", "æn"]),
    ("and", &["ənd", "ænd"]),
    ("answer", &["æːnsə", "ɑːnsə"]),
    ("ask", &["æːsk", "ɑːsk"]),
    ("at", &["æt", "ət"]),
    ("australia", &["əˈstreɪljə", "ɒˈstreɪljə"]),
    ("bath", &["bæːθ", "bɑːθ"]),
    ("be", &["biː"]),
    ("beer", &["bɪə"]),
    ("bird", &["bɝd"]),
    ("blue", &["bluː"]),
    ("book", &["bʊk"]),
    ("can", &["kæn", "kən"]),
    ("can't", &["kæːnt", "kɑːnt"]),
    ("cant", &["kæːnt", "kɑːnt"]),
    ("car", &["kɑː"]),
    ("castle", &["kæːsəl", "kɑːsəl"]),
    ("cat", &["kæt"]),
    ("chance", &["tʃæːns", "tʃɑːns"]),
    ("cool", &["kuːl"]),
    ("could", &["kʊd"]),
    ("dance", &["dæːns", "dɑːns"]),
    ("day", &["deɪ"]),
    ("do", &["duː"]),
    ("dog", &["dɔɡ"]),
    ("example", &["ɪɡzæːmpəl", "ɪɡzɑːmpəl"]),
    ("few", &["fjuː"]),
    ("food", &["fuːd"]),
    ("girl", &["ɡɝl"]),
    ("go", &["ɡəʊ", "ɡoː"]),
    ("good", &["ɡʊd"]),
    ("graph", &["ɡræːf", "ɡrɑːf"]),
    ("he", &["hiː"]),
    ("hello", &["həˈloʊ"]),
    ("here", &["hɪə"]),
    ("house", &["haʊs"]),
    ("i", &["aɪ"]),
    ("in", &["ɪn"]),
    ("is", &["ɪz"]),
    ("it", &["ɪt"]),
    ("know", &["nəʊ", "noː"]),
    ("laugh", &["læːf", "lɑːf"]),
    ("look", &["lʊk"]),
    ("make", &["meɪk"]),
    ("mat", &["mæt"]),
    ("mate", &["meɪt"]),
    ("me", &["miː"]),
    ("my", &["maɪ"]),
    ("new", &["njuː", "nuː"]),
    ("nice", &["naɪs"]),
    ("no", &["nəʊ", "noː"]),
    ("now", &["naʊ"]),
    ("of", &["ɔv", "əv"]),
    ("on", &["ɔn"]),
    ("out", &["aʊt"]),
    ("park", &["pɑːk"]),
    ("path", &["pæːθ", "pɑːθ"]),
    ("plant", &["plæːnt", "plɑːnt"]),
    ("put", &["pʊt"]),
    ("sat", &["sæt"]),
    ("school", &["skuːl"]),
    ("see", &["siː"]),
    ("she", &["ʃiː"]),
    ("should", &["ʃʊd"]),
    ("sure", &["ʃʊə", "ʃɔː"]),
    ("take", &["teɪk"]),
    ("the", &["ðə", "ðiː"]),
    ("there", &["ðeə"]),
    ("time", &["taɪm"]),
    ("to", &["tuː", "tə"]),
    ("today", &["təˈdeɪ"]),
    ("too", &["tuː"]),
    ("took", &["tʊk"]),
    ("tour", &["tʊə"]),
    ("true", &["truː"]),
    ("view", &["vjuː"]),
    ("water", &["ˈwɔːtə"]),
    ("way", &["weɪ"]),
    ("we", &["wiː"]),
    ("where", &["weə"]),
    ("would", &["wʊd"]),
    ("yes", &["jɛs"]),
    ("you", &["juː"]),
];

/// Australian reference pronunciations, already in target inventory.
const AUSTRALIAN_REFERENCE: &[(&str, &str)] = &[
    ("dance", "dæːns"),
    ("castle", "kæːsəl"),
    ("path", "pɑːθ"),
    ("bath", "bɑːθ"),
    ("laugh", "lɑːf"),
    ("chance", "tʃɑːns"),
    ("plant", "plɑːnt"),
    ("graph", "ɡrɑːf"),
    ("example", "ɪɡzɑːmpəl"),
];

/// Curated word → IPA variants table keyed by clean word.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallbackTable {
    entries: HashMap<String, Vec<String>>,
}

impl FallbackTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table.
    pub fn builtin() -> Self {
        let entries = BUILTIN_FALLBACK
            .iter()
            .map(|(word, variants)| {
                (
                    word.to_string(),
                    variants.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect();
        Self { entries }
    }

    /// Parse a JSON object of `"word": ["ipa", ...]` entries.
    ///
    /// Keys are lowercased; entries with no variants are dropped.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(json)?;
        let entries = raw
            .into_iter()
            .map(|(word, variants)| {
                let variants: Vec<String> = variants
                    .into_iter()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect();
                (word.trim().to_lowercase(), variants)
            })
            .filter(|(word, variants)| !word.is_empty() && !variants.is_empty())
            .collect();
        Ok(Self { entries })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents).map_err(|e| IpaError::ResourceParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Built-in table, with the entries of `path` (if readable) taking precedence.
    pub fn load(path: Option<&Path>) -> Self {
        let mut table = Self::builtin();
        if let Some(path) = path {
            match Self::from_file(path) {
                Ok(external) => table.merge(external),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "fallback table unavailable, using built-in entries");
                }
            }
        }
        table
    }

    /// Insert every entry of `other`, replacing existing words.
    pub fn merge(&mut self, other: FallbackTable) {
        self.entries.extend(other.entries);
    }

    pub fn insert(&mut self, word: &str, variants: Vec<String>) {
        if !word.is_empty() && !variants.is_empty() {
            self.entries.insert(word.to_lowercase(), variants);
        }
    }

    pub fn get(&self, word: &str) -> Option<&[String]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A dialect-tagged list of word/IPA pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDictionary {
    pub dialect: Dialect,
    pub source: PronunciationSource,
    pub entries: Vec<(String, String)>,
}

impl ReferenceDictionary {
    /// Built-in Australian reference table.
    pub fn australian() -> Self {
        Self {
            dialect: Dialect::Au,
            source: PronunciationSource::AusOverride,
            entries: AUSTRALIAN_REFERENCE
                .iter()
                .map(|(w, ipa)| (w.to_string(), ipa.to_string()))
                .collect(),
        }
    }

    /// Parse CMU Pronouncing Dictionary text.
    ///
    /// Lines starting with `;;;` are comments. Alternate pronunciations such as
    /// `READ(2)` are folded onto the base word. Malformed lines are skipped.
    pub fn parse_cmu(text: &str) -> Self {
        let entries = text
            .lines()
            .filter(|line| !line.starts_with(";;;"))
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let head = parts.next()?;
                let phonemes: Vec<&str> = parts.collect();
                if phonemes.is_empty() {
                    return None;
                }
                let word = match head.find('(') {
                    Some(idx) if head.ends_with(')') => &head[..idx],
                    _ => head,
                };
                Some((word.to_lowercase(), arpabet_to_ipa(&phonemes.join(" "))))
            })
            .collect();
        Self {
            dialect: Dialect::Us,
            source: PronunciationSource::Cmu,
            entries,
        }
    }

    /// Load a CMU dictionary file. The file is Latin-1 in the wild, so invalid
    /// UTF-8 is replaced rather than rejected.
    pub fn from_cmu_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::parse_cmu(&String::from_utf8_lossy(&bytes)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load the reference dictionaries available at start-up: the built-in
/// Australian table plus the CMU dictionary when a readable path is given.
pub fn load_references(cmu_path: Option<&Path>) -> Vec<ReferenceDictionary> {
    let mut references = vec![ReferenceDictionary::australian()];
    if let Some(path) = cmu_path {
        match ReferenceDictionary::from_cmu_file(path) {
            Ok(cmu) => {
                tracing::info!(path = %path.display(), entries = cmu.len(), "loaded CMU dictionary");
                references.push(cmu);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "CMU dictionary unavailable");
            }
        }
    }
    references
}
