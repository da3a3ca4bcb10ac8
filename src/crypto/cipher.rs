//! PIN-derived authenticated encryption for secret notes.
//!
//! Keys come from PBKDF2-HMAC-SHA256 (100,000 iterations, 32-byte output).
//! Tokens are `base64url(0x80 || nonce[12] || ciphertext || tag)`.
//!
//! The salt is per vault: [`load_or_create_salt`] writes 16 random bytes to a
//! salt file on first use. [`LEGACY_SALT`] is the fixed salt older vaults used;
//! with it every vault derives the same key for the same PIN.

use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

pub const KDF_ITERATIONS: u32 = 100_000;
pub const SALT_LEN: usize = 16;
pub const LEGACY_SALT: &[u8] = b"stable_salt_123";

/// Shown in place of note content that cannot be decrypted with the session key.
pub const DECRYPTION_ERROR_SENTINEL: &str = "[Decryption Error: Check PIN]";

const TOKEN_VERSION: u8 = 0x80;
const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("encryption failed")]
    Encrypt,

    #[error("ciphertext is not a valid token")]
    MalformedToken,

    #[error("decryption failed: wrong PIN or tampered ciphertext")]
    Decrypt,

    #[error("decrypted content is not valid UTF-8")]
    InvalidUtf8,
}

/// AES-256-GCM cipher keyed from a PIN.
#[derive(Clone)]
pub struct NoteCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for NoteCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NoteCipher(..)")
    }
}

impl NoteCipher {
    /// Derive the note key from `pin` and `salt`. Deliberately slow.
    pub fn derive(pin: &str, salt: &[u8]) -> Self {
        let mut key = [0u8; 32];
        pbkdf2::pbkdf2_hmac::<Sha256>(pin.as_bytes(), salt, KDF_ITERATIONS, &mut key);
        let cipher = Aes256Gcm::new(&key.into());
        key.fill(0);
        Self { cipher }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Encrypt)?;

        let mut token = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
        token.push(TOKEN_VERSION);
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);
        Ok(URL_SAFE.encode(token))
    }

    pub fn decrypt(&self, token: &str) -> Result<String, CipherError> {
        let raw = URL_SAFE
            .decode(token.trim())
            .map_err(|_| CipherError::MalformedToken)?;
        if raw.len() <= 1 + NONCE_LEN || raw[0] != TOKEN_VERSION {
            return Err(CipherError::MalformedToken);
        }

        let (nonce, ciphertext) = raw[1..].split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::Decrypt)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
    }
}

/// Decrypt for display: any failure becomes [`DECRYPTION_ERROR_SENTINEL`].
pub fn decrypt_for_display(cipher: &NoteCipher, token: &str) -> String {
    match cipher.decrypt(token) {
        Ok(plaintext) => plaintext,
        Err(e) => {
            tracing::debug!(error = %e, "note decryption failed");
            DECRYPTION_ERROR_SENTINEL.to_string()
        }
    }
}

/// Read an existing vault salt.
pub fn load_salt(path: &Path) -> Result<Vec<u8>> {
    let encoded = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read salt file: {}", path.display()))?;
    let salt = URL_SAFE
        .decode(encoded.trim())
        .context("salt file is not valid base64")?;
    anyhow::ensure!(!salt.is_empty(), "salt file {} is empty", path.display());
    Ok(salt)
}

/// Read the vault salt, generating and persisting a fresh one if absent.
/// Only vault setup should call this.
pub fn load_or_create_salt(path: &Path) -> Result<Vec<u8>> {
    if path.exists() {
        return load_salt(path);
    }

    let mut salt = vec![0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create data dir: {}", parent.display()))?;
    }
    std::fs::write(path, URL_SAFE.encode(&salt))
        .with_context(|| format!("failed to write salt file: {}", path.display()))?;
    tracing::info!(path = %path.display(), "generated vault salt");

    Ok(salt)
}
