//! Tokenization of input text into word tokens.

use serde::{Deserialize, Serialize};

/// A whitespace-delimited token of the input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordToken {
    /// Token exactly as it appeared in the input.
    pub original: String,
    /// Lookup key: lowercased, punctuation removed, apostrophes and hyphens kept.
    pub clean: String,
    /// False for tokens made only of punctuation or symbols.
    pub is_word: bool,
}

impl WordToken {
    pub fn new(original: &str) -> Self {
        let clean = clean_word(original);
        let is_word = clean.chars().any(char::is_alphanumeric);
        Self {
            original: original.to_string(),
            clean,
            is_word,
        }
    }
}

/// Normalize a word into its lookup key.
pub fn clean_word(word: &str) -> String {
    word.trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '\'' || *c == '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split text on whitespace into tokens, preserving order.
pub fn tokenize(text: &str) -> Vec<WordToken> {
    text.split_whitespace().map(WordToken::new).collect()
}
