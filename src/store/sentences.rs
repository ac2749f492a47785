//! Log of sentences accepted as a whole.

use super::jsonl::JsonLines;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub timestamp: NaiveDateTime,
    pub text: String,
    pub full_ipa: String,
    pub word_count: usize,
    pub auto_promotions: usize,
}

impl SentenceRecord {
    pub fn new(text: &str, full_ipa: &str, word_count: usize, auto_promotions: usize) -> Self {
        Self {
            timestamp: chrono::Local::now().naive_local(),
            text: text.to_string(),
            full_ipa: full_ipa.to_string(),
            word_count,
            auto_promotions,
        }
    }
}

pub type SentenceLog = JsonLines<SentenceRecord>;
