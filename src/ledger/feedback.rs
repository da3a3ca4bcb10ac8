//! Append-only log of user verdicts on AI answers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const FEEDBACK_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackStatus {
    Correct,
    Wrong,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Correct => "Correct",
            Self::Wrong => "Wrong",
        }
    }
}

impl std::fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub timestamp: String,
    pub query: String,
    pub answer: String,
    pub context_used: String,
    pub status: FeedbackStatus,
}

impl FeedbackEntry {
    pub fn now(query: &str, answer: &str, context_used: &str, status: FeedbackStatus) -> Self {
        Self {
            timestamp: chrono::Local::now()
                .format(FEEDBACK_TIMESTAMP_FORMAT)
                .to_string(),
            query: query.to_string(),
            answer: answer.to_string(),
            context_used: context_used.to_string(),
            status,
        }
    }
}

pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> Result<Vec<FeedbackEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&contents).context("feedback log is corrupt")
    }

    pub fn append(&self, entry: FeedbackEntry) -> Result<()> {
        let mut entries = self.entries()?;
        tracing::info!(status = %entry.status, "feedback recorded");
        entries.push(entry);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn append_keeps_previous_entries() {
        let tmp = TempDir::new().unwrap();
        let log = FeedbackLog::new(tmp.path().join("feedback_log.json"));

        log.append(FeedbackEntry::now("q1", "a1", "ctx", FeedbackStatus::Correct))
            .unwrap();
        log.append(FeedbackEntry::now("q2", "a2", "ctx", FeedbackStatus::Wrong))
            .unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].query, "q1");
        assert_eq!(entries[1].status, FeedbackStatus::Wrong);
    }

    #[test]
    fn status_serializes_capitalized() {
        let entry = FeedbackEntry::now("q", "a", "c", FeedbackStatus::Correct);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["status"], "Correct");
        assert_eq!(json["context_used"], "c");
        assert!(chrono::NaiveDateTime::parse_from_str(
            json["timestamp"].as_str().unwrap(),
            FEEDBACK_TIMESTAMP_FORMAT
        )
        .is_ok());
    }
}
