//! PIN-protected personal note vault with encrypted secret notes and
//! retrieval-augmented questions over your own notes.
//!
//! Notes live in a JSON file. Notes marked secret are stored as AES-256-GCM
//! tokens under a key derived from the user's PIN, and are only listed,
//! searched, or sent to the answering model while the vault is unlocked.
//!
//! # Architecture
//!
//! - **Storage**: flat JSON files under `~/.notevault/` (credentials, notes,
//!   usage ledger, feedback log) plus a per-vault salt
//! - **Crypto**: PBKDF2-HMAC-SHA256 key derivation, AES-256-GCM notes,
//!   SHA-256 digests for the PIN and recovery key
//! - **Embeddings**: Local ONNX Runtime with all-MiniLM-L6-v2 (384 dimensions)
//! - **Retrieval**: exact L2 search over an in-memory index cached per
//!   content version
//! - **Answering**: Gemini `generateContent` over HTTP, with a token and cost
//!   ledger
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`credentials`]: PIN and recovery-key record
//! - [`crypto`]: Key derivation, note encryption, digests
//! - [`notes`]: Note model, persistence, and search filter
//! - [`embedding`]: Text-to-vector pipeline and the flat retrieval index
//! - [`ai`]: Answering client and local summarizer
//! - [`ledger`]: Usage and feedback records
//! - [`export`]: PDF and DOCX rendering
//! - [`session`]: Unlock state and auto-lock
//! - [`vault`]: The facade tying it all together

pub mod ai;
pub mod config;
pub mod credentials;
pub mod crypto;
pub mod embedding;
pub mod error;
pub mod export;
pub mod ledger;
pub mod notes;
pub mod session;
pub mod vault;

pub use config::NoteVaultConfig;
pub use error::{VaultError, VaultResult};
pub use vault::{Answer, Vault};
