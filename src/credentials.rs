//! Credential record: SHA-256 digests of the PIN and the recovery key.
//!
//! The record is a small JSON file. Its presence is what "initialized" means;
//! a recovery reset simply deletes it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::crypto::{digests_match, hash_secret};

pub const MIN_PIN_LEN: usize = 4;

/// Stored credential digests. Never holds plaintext secrets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub pin_hash: String,
    pub recovery_hash: String,
}

pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_initialized(&self) -> bool {
        self.path.exists()
    }

    /// Write the digests of `pin` and `recovery_key`. Refuses to overwrite.
    pub fn initialize(&self, pin: &str, recovery_key: &str) -> Result<()> {
        anyhow::ensure!(
            !self.is_initialized(),
            "credential record already exists at {}",
            self.path.display()
        );

        let record = CredentialRecord {
            pin_hash: hash_secret(pin),
            recovery_hash: hash_secret(recovery_key),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create data dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string(&record)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        tracing::info!(path = %self.path.display(), "credential record created");
        Ok(())
    }

    pub fn verify_pin(&self, pin: &str) -> Result<bool> {
        Ok(self
            .load()?
            .is_some_and(|r| digests_match(&r.pin_hash, &hash_secret(pin))))
    }

    pub fn verify_recovery_key(&self, key: &str) -> Result<bool> {
        Ok(self
            .load()?
            .is_some_and(|r| digests_match(&r.recovery_hash, &hash_secret(key))))
    }

    /// Delete the record. Encrypted notes keep their original key.
    pub fn reset(&self) -> Result<()> {
        if self.is_initialized() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove {}", self.path.display()))?;
            tracing::warn!(path = %self.path.display(), "credential record deleted");
        }
        Ok(())
    }

    fn load(&self) -> Result<Option<CredentialRecord>> {
        if !self.is_initialized() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let record = serde_json::from_str(&contents).context("credential record is corrupt")?;
        Ok(Some(record))
    }
}

/// Setup rule: PIN and confirmation match and the PIN is long enough.
pub fn pin_is_acceptable(pin: &str, confirm: &str) -> bool {
    pin == confirm && pin.chars().count() >= MIN_PIN_LEN
}
