//! The vault facade: credentials, notes, session, retrieval, and exports
//! composed into the operations a user performs.
//!
//! A [`Vault`] owns the in-memory note list and writes it back after every
//! mutation. Every mutation also bumps a content version, which keys the
//! cached retrieval index.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::ai::{self, GeminiClient};
use crate::config::{expand_tilde, NoteVaultConfig};
use crate::credentials::{pin_is_acceptable, CredentialStore, MIN_PIN_LEN};
use crate::crypto::cipher::{load_or_create_salt, load_salt, LEGACY_SALT};
use crate::crypto::{decrypt_for_display, generate_recovery_key, NoteCipher};
use crate::embedding::{self, EmbeddingProvider, FlatIndex, IndexCache, Retrieval};
use crate::error::{VaultError, VaultResult};
use crate::export::{self, ExportFormat, PdfFont};
use crate::ledger::{FeedbackEntry, FeedbackLog, FeedbackStatus, UsageLedger, UsageStats};
use crate::notes::store::{find_mut, next_id, remove};
use crate::notes::types::{now_timestamp, preview};
use crate::notes::{filter_notes, Note, NoteDraft, NoteStore};
use crate::session::Session;

/// A question, the context retrieved for it, and the model's reply.
#[derive(Debug, Clone)]
pub struct Answer {
    pub question: String,
    pub retrieval: Retrieval,
    pub context: String,
    pub text: String,
}

pub struct Vault {
    config: NoteVaultConfig,
    credentials: CredentialStore,
    store: NoteStore,
    notes: Vec<Note>,
    session: Session,
    version: u64,
    index: IndexCache,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    ai: GeminiClient,
    feedback: FeedbackLog,
}

/// Note texts as a reader sees them: secret notes decrypted when a key is given.
fn display_texts(notes: &[Note], cipher: Option<&NoteCipher>) -> Vec<String> {
    notes.iter().map(|n| display_text(n, cipher)).collect()
}

fn display_text(note: &Note, cipher: Option<&NoteCipher>) -> String {
    match (note.secret, cipher) {
        (true, Some(cipher)) => decrypt_for_display(cipher, &note.content),
        _ => note.content.clone(),
    }
}

impl Vault {
    /// Open the vault described by `config`, loading notes from disk.
    pub fn open(config: NoteVaultConfig) -> anyhow::Result<Self> {
        let credentials = CredentialStore::new(config.config_record_path());
        let store = NoteStore::new(config.notes_path());
        let notes = store.load()?;
        let usage = UsageLedger::new(config.usage_path(), config.ai.cost_per_1k_tokens);
        let ai = GeminiClient::from_config(&config.ai, usage)?;
        let feedback = FeedbackLog::new(config.feedback_path());
        let session = Session::new(Duration::from_secs(config.session.auto_lock_seconds));

        tracing::info!(
            data_dir = %config.resolved_data_dir().display(),
            notes = notes.len(),
            initialized = credentials.is_initialized(),
            "vault opened"
        );

        Ok(Self {
            config,
            credentials,
            store,
            notes,
            session,
            version: 0,
            index: IndexCache::default(),
            embedder: None,
            ai,
            feedback,
        })
    }

    /// Use `embedder` instead of loading the configured model on first question.
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self.index.invalidate();
        self
    }

    pub fn with_ai_client(mut self, ai: GeminiClient) -> Self {
        self.ai = ai;
        self
    }

    pub fn config(&self) -> &NoteVaultConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn content_version(&self) -> u64 {
        self.version
    }

    // ── credentials & session ────────────────────────────────────────────────

    pub fn is_initialized(&self) -> bool {
        self.credentials.is_initialized()
    }

    /// First-run setup with a freshly generated recovery key, which is returned.
    pub fn initialize(&mut self, pin: &str, confirm: &str) -> VaultResult<String> {
        let recovery_key = generate_recovery_key();
        self.initialize_with_recovery_key(pin, confirm, &recovery_key)?;
        Ok(recovery_key)
    }

    /// First-run setup with a recovery key the user has already been shown.
    pub fn initialize_with_recovery_key(
        &mut self,
        pin: &str,
        confirm: &str,
        recovery_key: &str,
    ) -> VaultResult<()> {
        if self.credentials.is_initialized() {
            return Err(VaultError::AlreadyInitialized);
        }
        if !pin_is_acceptable(pin, confirm) {
            return Err(VaultError::InvalidPin { min: MIN_PIN_LEN });
        }
        // salt first, so a failure here leaves the vault uninitialized
        if !self.config.crypto.legacy_fixed_salt {
            load_or_create_salt(&self.config.salt_path())?;
        }
        self.credentials.initialize(pin, recovery_key)?;
        Ok(())
    }

    pub fn unlock(&mut self, pin: &str) -> VaultResult<()> {
        if !self.credentials.is_initialized() {
            return Err(VaultError::NotInitialized);
        }
        if !self.credentials.verify_pin(pin)? {
            tracing::warn!("unlock attempt with incorrect PIN");
            return Err(VaultError::IncorrectPin);
        }

        let cipher = NoteCipher::derive(pin, &self.salt()?);
        self.session.unlock(cipher, Instant::now());
        self.bump_version();
        tracing::info!("vault unlocked");
        Ok(())
    }

    pub fn lock(&mut self) {
        if self.session.is_unlocked() {
            self.session.lock();
            self.bump_version();
            tracing::info!("vault locked");
        }
    }

    /// Apply auto-lock. Returns true when the session was locked by this call.
    pub fn check_expiry(&mut self) -> bool {
        self.check_expiry_at(Instant::now())
    }

    /// [`check_expiry`](Self::check_expiry) against an explicit clock reading.
    pub fn check_expiry_at(&mut self, now: Instant) -> bool {
        let expired = self.session.check_expiry(now);
        if expired {
            self.bump_version();
        }
        expired
    }

    /// Forget the PIN via the recovery key. Secret notes stay encrypted under the old PIN.
    pub fn reset_with_recovery_key(&mut self, recovery_key: &str) -> VaultResult<()> {
        if !self.credentials.verify_recovery_key(recovery_key)? {
            return Err(VaultError::IncorrectRecoveryKey);
        }
        self.credentials.reset()?;
        self.lock();
        Ok(())
    }

    /// Salt of an initialized vault. Only setup creates one.
    fn salt(&self) -> VaultResult<Vec<u8>> {
        if self.config.crypto.legacy_fixed_salt {
            return Ok(LEGACY_SALT.to_vec());
        }
        let path = self.config.salt_path();
        if !path.exists() {
            tracing::error!(path = %path.display(), "vault salt is missing");
            return Err(VaultError::MissingSalt(path));
        }
        Ok(load_salt(&path)?)
    }

    fn require_unlocked(&mut self) -> VaultResult<NoteCipher> {
        self.check_expiry();
        self.session.cipher().cloned().ok_or(VaultError::Locked)
    }

    fn bump_version(&mut self) {
        self.version += 1;
        self.index.invalidate();
    }

    // ── notes ────────────────────────────────────────────────────────────────

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Notes visible in the current lock state that match `query`.
    pub fn list(&self, query: &str) -> Vec<&Note> {
        filter_notes(&self.notes, self.session.is_unlocked(), query)
    }

    /// A note visible in the current lock state.
    pub fn note(&self, id: i64) -> VaultResult<&Note> {
        let note = self
            .notes
            .iter()
            .find(|n| n.id == id)
            .ok_or(VaultError::NoteNotFound(id))?;
        if note.secret && !self.session.is_unlocked() {
            return Err(VaultError::Locked);
        }
        Ok(note)
    }

    /// Content as shown to the user: decrypted when secret and unlocked.
    pub fn display_content(&self, note: &Note) -> String {
        display_text(note, self.session.cipher())
    }

    pub fn preview(&self, note: &Note) -> String {
        preview(&self.display_content(note))
    }

    /// Plaintext draft of an existing note, ready to edit and re-save.
    ///
    /// A secret note the session key cannot decrypt fails with
    /// [`VaultError::Cipher`], so its ciphertext is never overwritten.
    pub fn edit_draft(&mut self, id: i64) -> VaultResult<NoteDraft> {
        self.check_expiry();
        let note = self.note(id)?;
        let content = if note.secret {
            self.session
                .cipher()
                .ok_or(VaultError::Locked)?
                .decrypt(&note.content)?
        } else {
            note.content.clone()
        };
        let draft = NoteDraft {
            id: Some(note.id),
            title: note.title.clone(),
            content,
            secret: note.secret,
        };
        self.session.touch(Instant::now());
        Ok(draft)
    }

    /// Create or update a note. Secret drafts need an unlocked session and are encrypted.
    pub fn save_note(&mut self, draft: NoteDraft) -> VaultResult<i64> {
        if draft.is_empty() {
            return Err(VaultError::EmptyNote);
        }
        self.check_expiry();
        if let Some(id) = draft.id {
            // the existing note must be visible in the current state
            self.note(id)?;
        }

        let content = if draft.secret {
            self.require_unlocked()?.encrypt(&draft.content)?
        } else {
            draft.content
        };
        let timestamp = now_timestamp();

        let id = match draft.id {
            Some(id) => {
                let note = find_mut(&mut self.notes, id).ok_or(VaultError::NoteNotFound(id))?;
                note.title = draft.title;
                note.content = content;
                note.timestamp = timestamp;
                note.secret = draft.secret;
                id
            }
            None => {
                let id = next_id(&self.notes, chrono::Utc::now().timestamp());
                self.notes.insert(
                    0,
                    Note {
                        id,
                        title: draft.title,
                        content,
                        timestamp,
                        secret: draft.secret,
                    },
                );
                id
            }
        };

        self.store.save(&self.notes)?;
        self.bump_version();
        self.session.touch(Instant::now());
        tracing::info!(id, secret = draft.secret, "note saved");
        Ok(id)
    }

    pub fn delete_note(&mut self, id: i64) -> VaultResult<()> {
        self.check_expiry();
        self.note(id)?;
        remove(&mut self.notes, id);
        self.store.save(&self.notes)?;
        self.bump_version();
        tracing::info!(id, "note deleted");
        Ok(())
    }

    // ── AI ───────────────────────────────────────────────────────────────────

    fn embedder(&mut self) -> VaultResult<Arc<dyn EmbeddingProvider>> {
        if let Some(embedder) = &self.embedder {
            return Ok(Arc::clone(embedder));
        }
        let provider: Arc<dyn EmbeddingProvider> =
            Arc::from(embedding::create_provider(&self.config.embedding)?);
        tracing::info!("embedding provider ready");
        self.embedder = Some(Arc::clone(&provider));
        Ok(provider)
    }

    /// Nearest note texts for `question`. Needs an unlocked session.
    pub fn retrieve(&mut self, question: &str) -> VaultResult<Retrieval> {
        let cipher = self.require_unlocked()?;
        let embedder = self.embedder()?;
        let notes = &self.notes;
        let index = self.index.get_or_build(self.version, || {
            FlatIndex::build(embedder.as_ref(), display_texts(notes, Some(&cipher)))
        })?;
        let k = self.config.retrieval.top_k.max(1);
        Ok(index.query(embedder.as_ref(), question, k)?)
    }

    /// Retrieval-augmented answer. Provider failures come back as answer text.
    pub async fn ask(&mut self, question: &str) -> VaultResult<Answer> {
        let retrieval = self.retrieve(question)?;
        self.session.touch(Instant::now());

        let context = retrieval.context();
        let text = match &retrieval {
            Retrieval::NoNotes => context.clone(),
            Retrieval::Matches(_) => self.ai.answer(question, &context).await,
        };

        Ok(Answer {
            question: question.to_string(),
            retrieval,
            context,
            text,
        })
    }

    pub fn record_feedback(&self, answer: &Answer, status: FeedbackStatus) -> VaultResult<()> {
        self.feedback.append(FeedbackEntry::now(
            &answer.question,
            &answer.text,
            &answer.context,
            status,
        ))?;
        Ok(())
    }

    pub fn feedback_log(&self) -> &FeedbackLog {
        &self.feedback
    }

    /// Condense a long draft to its first sentences.
    pub fn summarize(&mut self, text: &str) -> String {
        self.session.touch(Instant::now());
        ai::summarize(text, self.ai.usage())
    }

    pub fn usage(&self) -> VaultResult<Option<UsageStats>> {
        Ok(self.ai.usage().load()?)
    }

    // ── export ───────────────────────────────────────────────────────────────

    /// Render a visible note in `format`, using its displayed content.
    pub fn export(&mut self, id: i64, format: ExportFormat) -> VaultResult<Vec<u8>> {
        self.check_expiry();
        let note = self.note(id)?;
        let content = self.display_content(note);
        let bytes = match format {
            ExportFormat::Pdf => {
                let font = PdfFont::resolve(&expand_tilde(&self.config.export.font_path));
                export::render_pdf(&note.title, &content, &font)?
            }
            ExportFormat::Docx => export::render_docx(&note.title, &content)?,
        };
        tracing::info!(id, format = format.extension(), bytes = bytes.len(), "note exported");
        Ok(bytes)
    }

    pub fn export_pdf(&mut self, id: i64) -> VaultResult<Vec<u8>> {
        self.export(id, ExportFormat::Pdf)
    }

    pub fn export_docx(&mut self, id: i64) -> VaultResult<Vec<u8>> {
        self.export(id, ExportFormat::Docx)
    }
}
