//! Typed errors for the vault's public operations.
//!
//! Plumbing code uses `anyhow` internally; anything a caller might want to
//! match on (wrong PIN, locked vault, missing note) surfaces as [`VaultError`].

use std::path::PathBuf;

use thiserror::Error;

use crate::ai::AiError;
use crate::crypto::CipherError;
use crate::export::ExportError;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("vault is not initialized; run `notevault init` first")]
    NotInitialized,

    #[error("vault is already initialized")]
    AlreadyInitialized,

    #[error("PINs must match and be at least {min} characters")]
    InvalidPin { min: usize },

    #[error("incorrect PIN")]
    IncorrectPin,

    #[error("incorrect recovery key")]
    IncorrectRecoveryKey,

    #[error("salt file missing at {}; secret notes cannot be decrypted without it", .0.display())]
    MissingSalt(PathBuf),

    #[error("vault is locked")]
    Locked,

    #[error("note not found: {0}")]
    NoteNotFound(i64),

    #[error("a note needs a title or content")]
    EmptyNote,

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type VaultResult<T> = std::result::Result<T, VaultError>;
