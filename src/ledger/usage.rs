//! Approximate AI token and cost accounting.
//!
//! Token counts are estimated as characters / 4. Cost is tokens / 1000 times
//! the configured per-1k rate. Both totals only ever grow.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_tokens: f64,
    pub total_cost: f64,
}

/// Characters / 4, counted in Unicode scalar values.
pub fn estimate_tokens(text: &str) -> f64 {
    text.chars().count() as f64 / 4.0
}

pub struct UsageLedger {
    path: PathBuf,
    cost_per_1k_tokens: f64,
}

impl UsageLedger {
    pub fn new(path: impl Into<PathBuf>, cost_per_1k_tokens: f64) -> Self {
        Self {
            path: path.into(),
            cost_per_1k_tokens,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current totals, or `None` when nothing has been recorded yet.
    pub fn load(&self) -> Result<Option<UsageStats>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let stats = serde_json::from_str(&contents).context("usage stats file is corrupt")?;
        Ok(Some(stats))
    }

    /// Add the estimate for `text` to the totals and persist them.
    pub fn track(&self, text: &str) -> Result<UsageStats> {
        let tokens = estimate_tokens(text);
        let cost = tokens / 1000.0 * self.cost_per_1k_tokens;

        let mut stats = self.load()?.unwrap_or_default();
        stats.total_tokens += tokens;
        stats.total_cost += cost;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string(&stats)?)
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        tracing::debug!(tokens, total_tokens = stats.total_tokens, "usage tracked");
        Ok(stats)
    }

    /// Like [`track`](Self::track) but only logs failures. Accounting must not break an answer.
    pub fn track_quietly(&self, text: &str) {
        if let Err(e) = self.track(text) {
            tracing::warn!(error = %e, "failed to record AI usage");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn estimate_is_chars_over_four() {
        assert_eq!(estimate_tokens(""), 0.0);
        assert_eq!(estimate_tokens("abcd"), 1.0);
        assert_eq!(estimate_tokens("abcdef"), 1.5);
        assert_eq!(estimate_tokens("ééée"), 1.0);
    }

    #[test]
    fn track_accumulates() {
        let tmp = TempDir::new().unwrap();
        let ledger = UsageLedger::new(tmp.path().join("usage_stats.json"), 0.000125);
        assert!(ledger.load().unwrap().is_none());

        ledger.track(&"x".repeat(4000)).unwrap();
        let stats = ledger.track(&"y".repeat(400)).unwrap();

        assert!((stats.total_tokens - 1100.0).abs() < 1e-9);
        assert!((stats.total_cost - 1.1 * 0.000125).abs() < 1e-12);
        assert_eq!(ledger.load().unwrap(), Some(stats));
    }

    #[test]
    fn reads_file_written_with_integer_totals() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("usage_stats.json");
        std::fs::write(&path, r#"{"total_tokens": 10, "total_cost": 0}"#).unwrap();

        let stats = UsageLedger::new(path, 0.0).load().unwrap().unwrap();
        assert_eq!(stats.total_tokens, 10.0);
    }
}
