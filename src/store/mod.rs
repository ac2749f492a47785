//! Persisted state: overrides, learning ledger, custom pronunciations and
//! the accepted-sentence log.
//!
//! Every read goes back to disk. Concurrent writers from several processes
//! are not supported: the last whole-file write wins and appends may
//! interleave.

pub mod custom;
pub mod jsonl;
pub mod ledger;
pub mod overrides;
pub mod sentences;

use crate::defaults;
use crate::error::{IpaError, Result};
use std::path::{Path, PathBuf};

pub use custom::{CustomPronunciation, CustomPronunciations};
pub use jsonl::JsonLines;
pub use ledger::{InteractionType, LearningEvent, LearningLedger};
pub use overrides::{JsonOverrideStore, MemoryOverrideStore, OverrideStore, OverrideTable};
pub use sentences::{SentenceLog, SentenceRecord};

/// Replace `path` with `bytes` via a temp file in the same directory.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| IpaError::Persist {
        path: path.display().to_string(),
        message: e.error.to_string(),
    })?;
    Ok(())
}

/// Why a whole-file JSON store could not be loaded.
#[derive(Debug)]
pub(crate) enum ReadFailure {
    /// The file exists but could not be read.
    Io(std::io::Error),
    /// The file was read but is not valid for its store.
    Invalid,
}

/// Read a JSON document. A missing or blank file yields `T::default()`.
pub(crate) fn read_json_file<T>(path: &Path) -> std::result::Result<T, ReadFailure>
where
    T: serde::de::DeserializeOwned + Default,
{
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read store file");
            return Err(ReadFailure::Io(e));
        }
    };
    if contents.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&contents).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "store file is invalid, ignoring");
        ReadFailure::Invalid
    })
}

/// Load a whole-file store before rewriting it. An invalid file is set aside
/// first; an unreadable one refuses the write.
pub(crate) fn load_for_rewrite<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match read_json_file(path) {
        Ok(value) => Ok(value),
        Err(ReadFailure::Invalid) => set_aside_corrupt(path).map(|_| T::default()),
        Err(ReadFailure::Io(e)) => Err(IpaError::Persist {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}

/// Move an unparsable file out of the way as `<name>.<stamp>.corrupt` so the
/// next whole-file write does not replace hand-edited entries.
fn set_aside_corrupt(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = chrono::Local::now().format("%Y%m%dT%H%M%S%.3f");
    let target = path.with_file_name(format!("{name}.{stamp}.corrupt"));
    std::fs::rename(path, &target).map_err(|e| IpaError::Persist {
        path: path.display().to_string(),
        message: format!("cannot set aside invalid file: {e}"),
    })?;
    tracing::warn!(path = %path.display(), moved_to = %target.display(), "invalid file set aside");
    Ok(target)
}

/// Remove a file, treating "already gone" as success. Returns whether a file was removed.
pub(crate) fn remove_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(IpaError::Persist {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}

/// All persisted state of one engine.
pub struct Storage {
    pub overrides: Box<dyn OverrideStore>,
    pub ledger: LearningLedger,
    pub custom: CustomPronunciations,
    pub sentences: SentenceLog,
    dir: Option<PathBuf>,
}

impl Storage {
    /// File-backed storage rooted at `dir`. Nothing is created until the first write.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            overrides: Box::new(JsonOverrideStore::new(dir.join(defaults::OVERRIDES_FILE))),
            ledger: LearningLedger::open(dir.join(defaults::LEDGER_FILE)),
            custom: CustomPronunciations::open(dir.join(defaults::CUSTOM_PRONUNCIATIONS_FILE)),
            sentences: SentenceLog::open(dir.join(defaults::SENTENCE_LOG_FILE)),
            dir: Some(dir),
        }
    }

    /// Ephemeral storage for tests and throwaway sessions.
    pub fn in_memory() -> Self {
        Self {
            overrides: Box::new(MemoryOverrideStore::default()),
            ledger: LearningLedger::in_memory(),
            custom: CustomPronunciations::in_memory(),
            sentences: SentenceLog::in_memory(),
            dir: None,
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Remove every persisted file. Idempotent; the first failure is returned
    /// after all removals have been attempted.
    pub fn clear_all(&mut self) -> Result<()> {
        let results = [
            self.overrides.delete_all(),
            self.ledger.clear(),
            self.sentences.clear(),
            self.custom.clear(),
        ];
        results.into_iter().collect::<Result<Vec<()>>>().map(|_| ())
    }
}
