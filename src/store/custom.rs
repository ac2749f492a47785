//! User-taught pronunciations.
//!
//! Stored as one JSON array rewritten atomically on each change. Unlike
//! overrides, a word may have several custom pronunciations and the same IPA
//! may belong to several words.

use crate::defaults;
use crate::error::Result;
use crate::lexicon::{Dialect, PronunciationSource};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_dialect() -> Dialect {
    Dialect::from(defaults::DIALECT)
}

fn default_source() -> PronunciationSource {
    PronunciationSource::User
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPronunciation {
    pub word: String,
    pub ipa: String,
    #[serde(default = "default_dialect")]
    pub dialect: Dialect,
    #[serde(default = "default_source")]
    pub source: PronunciationSource,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

impl CustomPronunciation {
    /// A user-taught entry stamped with the current local time.
    pub fn user(word: &str, ipa: &str, dialect: Dialect) -> Self {
        Self {
            word: word.to_string(),
            ipa: ipa.to_string(),
            dialect,
            source: PronunciationSource::User,
            timestamp: Some(chrono::Local::now().naive_local()),
        }
    }
}

#[derive(Debug)]
pub struct CustomPronunciations {
    path: Option<PathBuf>,
    /// Entries not yet on disk.
    pending: Vec<CustomPronunciation>,
}

impl CustomPronunciations {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            pending: Vec::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            pending: Vec::new(),
        }
    }

    /// Entries on disk followed by entries not yet written.
    pub fn entries(&self) -> Vec<CustomPronunciation> {
        let mut entries: Vec<CustomPronunciation> = match &self.path {
            Some(path) => super::read_json_file(path).unwrap_or_default(),
            None => Vec::new(),
        };
        entries.extend(self.pending.iter().cloned());
        entries
    }

    /// Append an entry. Blank word or IPA is ignored.
    pub fn add(&mut self, entry: CustomPronunciation) -> Result<()> {
        if entry.word.trim().is_empty() || entry.ipa.trim().is_empty() {
            return Ok(());
        }
        let Some(path) = &self.path else {
            self.pending.push(entry);
            return Ok(());
        };

        let written = super::load_for_rewrite::<Vec<CustomPronunciation>>(path).and_then(
            |mut entries| {
                entries.extend(self.pending.iter().cloned());
                entries.push(entry.clone());
                let bytes = serde_json::to_vec_pretty(&entries)?;
                super::write_atomic(path, &bytes)
            },
        );
        match written {
            Ok(()) => {
                self.pending.clear();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), word = %entry.word, error = %e, "custom pronunciation kept in memory only");
                self.pending.push(entry);
                Err(e)
            }
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        self.pending.clear();
        match &self.path {
            Some(path) => super::remove_if_exists(path).map(|_| ()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn add_appends_and_keeps_duplicates_per_word() {
        let dir = TempDir::new().unwrap();
        let mut custom = CustomPronunciations::open(dir.path().join("custom.json"));
        custom.add(CustomPronunciation::user("dance", "dæːns", Dialect::Au)).unwrap();
        custom.add(CustomPronunciation::user("dance", "dæns", Dialect::Us)).unwrap();

        let entries = custom.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].dialect, Dialect::Us);
        assert_eq!(entries[1].source, PronunciationSource::User);
    }

    #[test]
    fn blank_entries_are_ignored() {
        let mut custom = CustomPronunciations::in_memory();
        custom.add(CustomPronunciation::user(" ", "dæːns", Dialect::Au)).unwrap();
        custom.add(CustomPronunciation::user("dance", "", Dialect::Au)).unwrap();
        assert!(custom.entries().is_empty());
    }

    #[test]
    fn legacy_entries_default_dialect_and_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"[{"word": "mate", "ipa": "mæɪt"}]"#).unwrap();

        let entries = CustomPronunciations::open(&path).entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].dialect, Dialect::Au);
        assert_eq!(entries[0].source, PronunciationSource::User);
        assert_eq!(entries[0].timestamp, None);
    }

    #[test]
    fn invalid_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(CustomPronunciations::open(&path).entries().is_empty());
    }

    #[test]
    fn add_after_invalid_file_preserves_original_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        let broken = r#"[{"word": "arvo", "ipa": "ɑːvəʊ"}, {"word": "ute", "ipa": "jʉːt",}]"#;
        std::fs::write(&path, broken).unwrap();
        let mut custom = CustomPronunciations::open(&path);

        custom.add(CustomPronunciation::user("mate", "mæɪt", Dialect::Au)).unwrap();

        let entries = custom.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word, "mate");
        let set_aside: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().ends_with(".corrupt"))
            .collect();
        assert_eq!(set_aside.len(), 1);
        assert_eq!(std::fs::read_to_string(&set_aside[0]).unwrap(), broken);
    }

    #[test]
    fn failed_write_keeps_entry_in_memory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::create_dir(&path).unwrap();
        let mut custom = CustomPronunciations::open(&path);

        assert!(custom.add(CustomPronunciation::user("dance", "dæːns", Dialect::Au)).is_err());
        assert_eq!(custom.entries().len(), 1);
    }

    #[test]
    fn clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        let mut custom = CustomPronunciations::open(&path);
        custom.add(CustomPronunciation::user("dance", "dæːns", Dialect::Au)).unwrap();
        custom.clear().unwrap();
        assert!(!path.exists());
        custom.clear().unwrap();
    }
}
