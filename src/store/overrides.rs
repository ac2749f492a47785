//! Authoritative word → IPA overrides.

use crate::error::{IpaError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Clean word → IPA. At most one entry per word.
pub type OverrideTable = BTreeMap<String, String>;

/// Storage for promoted pronunciations.
///
/// Implementations must return current state from [`OverrideStore::snapshot`]
/// on every call; callers take one snapshot per resolution request.
pub trait OverrideStore: Send {
    /// Current table.
    fn snapshot(&self) -> OverrideTable;

    fn get(&self, word: &str) -> Option<String> {
        self.snapshot().remove(word)
    }

    /// Insert or replace an entry. Empty word or IPA is a no-op.
    fn set(&mut self, word: &str, ipa: &str) -> Result<()>;

    /// Remove every entry. Idempotent.
    fn delete_all(&mut self) -> Result<()>;
}

/// Override table kept in process memory only.
#[derive(Debug, Default)]
pub struct MemoryOverrideStore {
    table: OverrideTable,
}

impl OverrideStore for MemoryOverrideStore {
    fn snapshot(&self) -> OverrideTable {
        self.table.clone()
    }

    fn set(&mut self, word: &str, ipa: &str) -> Result<()> {
        if word.is_empty() || ipa.is_empty() {
            return Ok(());
        }
        self.table.insert(word.to_string(), ipa.to_string());
        Ok(())
    }

    fn delete_all(&mut self) -> Result<()> {
        self.table.clear();
        Ok(())
    }
}

/// Override table persisted as a JSON object file.
///
/// Entries whose write failed live in an in-process overlay that shadows
/// the file until a later write succeeds.
#[derive(Debug)]
pub struct JsonOverrideStore {
    path: PathBuf,
    overlay: OverrideTable,
}

impl JsonOverrideStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            overlay: OverrideTable::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries held only in memory after a failed write.
    pub fn unsaved(&self) -> &OverrideTable {
        &self.overlay
    }
}

impl OverrideStore for JsonOverrideStore {
    fn snapshot(&self) -> OverrideTable {
        let mut table: OverrideTable = super::read_json_file(&self.path).unwrap_or_default();
        table.extend(self.overlay.iter().map(|(w, i)| (w.clone(), i.clone())));
        table
    }

    fn set(&mut self, word: &str, ipa: &str) -> Result<()> {
        if word.is_empty() || ipa.is_empty() {
            return Ok(());
        }
        let written = super::load_for_rewrite::<OverrideTable>(&self.path).and_then(|mut table| {
            table.extend(self.overlay.iter().map(|(w, i)| (w.clone(), i.clone())));
            table.insert(word.to_string(), ipa.to_string());
            let bytes = serde_json::to_vec_pretty(&table)?;
            super::write_atomic(&self.path, &bytes)
        });
        match written {
            Ok(()) => {
                self.overlay.clear();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), word, error = %e, "override kept in memory only");
                self.overlay.insert(word.to_string(), ipa.to_string());
                Err(match e {
                    IpaError::Persist { .. } => e,
                    other => IpaError::Persist {
                        path: self.path.display().to_string(),
                        message: other.to_string(),
                    },
                })
            }
        }
    }

    fn delete_all(&mut self) -> Result<()> {
        self.overlay.clear();
        super::remove_if_exists(&self.path).map(|_| ())
    }
}
