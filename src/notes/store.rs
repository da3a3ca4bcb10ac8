//! File-backed note collection.
//!
//! The whole list is read and written at once; there is no partial update and
//! no locking. Callers own the in-memory `Vec<Note>` between load and save.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::types::Note;

pub struct NoteStore {
    path: PathBuf,
}

impl NoteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all notes. A missing file is an empty vault.
    pub fn load(&self) -> Result<Vec<Note>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let notes: Vec<Note> = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse notes file {}", self.path.display()))?;
        tracing::debug!(count = notes.len(), "notes loaded");
        Ok(notes)
    }

    /// Overwrite the file with `notes`.
    pub fn save(&self, notes: &[Note]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create data dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(notes)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        tracing::debug!(count = notes.len(), "notes saved");
        Ok(())
    }
}

/// Creation-time id: `now_secs`, or one past the largest existing id if that is later.
pub fn next_id(notes: &[Note], now_secs: i64) -> i64 {
    let max_existing = notes.iter().map(|n| n.id).max().unwrap_or(i64::MIN);
    now_secs.max(max_existing.saturating_add(1))
}

pub fn find_mut(notes: &mut [Note], id: i64) -> Option<&mut Note> {
    notes.iter_mut().find(|n| n.id == id)
}

/// Remove the note with `id`. Returns whether anything was removed.
pub fn remove(notes: &mut Vec<Note>, id: i64) -> bool {
    let before = notes.len();
    notes.retain(|n| n.id != id);
    notes.len() != before
}
