//! Note record definitions.
//!
//! A [`Note`] is what lives in `notes.json`. Its `content` is ciphertext
//! exactly when `secret` is set. A [`NoteDraft`] is the user-facing input for
//! creating or editing a note, always carrying plaintext.

use serde::{Deserialize, Serialize};

/// Display format for note timestamps (local time, minute precision).
pub const NOTE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Preview length shown in note listings.
pub const PREVIEW_CHARS: usize = 200;

/// A stored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unix seconds at creation, bumped for uniqueness.
    pub id: i64,
    pub title: String,
    /// Plaintext, or a cipher token when `secret` is true.
    pub content: String,
    /// Last save time in [`NOTE_TIMESTAMP_FORMAT`].
    pub timestamp: String,
    #[serde(default)]
    pub secret: bool,
}

/// Plaintext input for a save. `id: None` creates a new note.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub secret: bool,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            secret: false,
        }
    }

    pub fn secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }

    pub fn editing(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.content.is_empty()
    }
}

/// Truncate to [`PREVIEW_CHARS`] characters, appending `...` when cut.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let cut: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

pub fn now_timestamp() -> String {
    chrono::Local::now().format(NOTE_TIMESTAMP_FORMAT).to_string()
}
