//! Hashing and symmetric encryption primitives.
//!
//! [`hash_secret`] produces the SHA-256 hex digests stored in the credential
//! record. [`cipher::NoteCipher`] turns a PIN into an AES-256-GCM key via
//! PBKDF2 and encrypts secret note content.

pub mod cipher;

use rand::rngs::OsRng;
use rand::Rng;
use sha2::{Digest, Sha256};

pub use cipher::{decrypt_for_display, CipherError, NoteCipher, DECRYPTION_ERROR_SENTINEL};

const RECOVERY_KEY_LEN: usize = 16;
const RECOVERY_KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// SHA-256 hex digest of a PIN or recovery key.
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Compare two digests without short-circuiting on the first differing byte.
pub fn digests_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Random 16-character recovery key over `A-Z0-9`.
pub fn generate_recovery_key() -> String {
    let mut rng = OsRng;
    (0..RECOVERY_KEY_LEN)
        .map(|_| RECOVERY_KEY_ALPHABET[rng.gen_range(0..RECOVERY_KEY_ALPHABET.len())] as char)
        .collect()
}
