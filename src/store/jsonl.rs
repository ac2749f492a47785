//! Append-only newline-delimited JSON record files.

use crate::error::{IpaError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// An append-only JSON-lines file.
///
/// Records that could not be written are kept in memory, in order, and
/// returned by [`JsonLines::read_all`] after the persisted ones. The next
/// successful append writes them ahead of the new record, so the file never
/// holds a record newer than one still pending. Without a path the log is
/// memory-only.
#[derive(Debug)]
pub struct JsonLines<T> {
    path: Option<PathBuf>,
    pending: Vec<T>,
}

impl<T: Serialize + DeserializeOwned + Clone> JsonLines<T> {
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

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of records held only in memory.
    pub fn pending_len(&self) -> usize {
        if self.path.is_some() {
            self.pending.len()
        } else {
            0
        }
    }

    /// Read every record. A missing file is empty; corrupt lines are skipped.
    pub fn read_all(&self) -> Vec<T> {
        let mut records = match &self.path {
            Some(path) => read_records(path),
            None => Vec::new(),
        };
        records.extend(self.pending.iter().cloned());
        records
    }

    /// Append one record, flushing earlier unwritten records first.
    ///
    /// On failure the record is kept in memory and the error is returned.
    pub fn append(&mut self, record: T) -> Result<()> {
        self.pending.push(record);
        let Some(path) = &self.path else {
            return Ok(());
        };
        match append_records(path, &self.pending) {
            Ok(()) => {
                self.pending.clear();
                Ok(())
            }
            Err(e) => Err(IpaError::Persist {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Remove the file and any in-memory records. Idempotent.
    pub fn clear(&mut self) -> Result<()> {
        self.pending.clear();
        match &self.path {
            Some(path) => super::remove_if_exists(path).map(|_| ()),
            None => Ok(()),
        }
    }
}

fn append_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut lines = String::new();
    for record in records {
        lines.push_str(&serde_json::to_string(record)?);
        lines.push('\n');
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    // One write call per batch keeps concurrent appends line-aligned on most filesystems.
    file.write_all(lines.as_bytes())?;
    Ok(())
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read record file");
            return Vec::new();
        }
    };
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), line = idx + 1, error = %e, "skipping malformed record");
                None
            }
        })
        .collect()
}
