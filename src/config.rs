use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NoteVaultConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub crypto: CryptoConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub ai: AiConfig,
    pub session: SessionConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the credential record, notes, salt, and ledgers.
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CryptoConfig {
    /// Derive keys from the historical fixed salt instead of the per-vault salt file.
    pub legacy_fixed_salt: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AiConfig {
    pub api_base: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    /// Estimated USD per 1000 tokens, used for the usage ledger.
    pub cost_per_1k_tokens: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub auto_lock_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    /// TrueType font with Unicode coverage. Falls back to Helvetica when missing.
    pub font_path: String,
}

impl Default for NoteVaultConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            storage: StorageConfig::default(),
            crypto: CryptoConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            ai: AiConfig::default(),
            session: SessionConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_vault_dir().to_string_lossy().into_owned(),
        }
    }
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            legacy_fixed_salt: false,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_vault_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 2 }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-2.5-flash-lite".into(),
            api_key_env: "GEMINI_API_KEY".into(),
            request_delay_ms: 2000,
            timeout_secs: 60,
            cost_per_1k_tokens: 0.000125,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_lock_seconds: 150,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        let font_path = default_vault_dir()
            .join("fonts")
            .join("dejavu-sans")
            .join("DejaVuSans.ttf")
            .to_string_lossy()
            .into_owned();
        Self { font_path }
    }
}

/// Returns `~/.notevault/`, or `./.notevault` when no home directory is known.
pub fn default_vault_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".notevault")
}

/// Returns the default config file path: `~/.notevault/config.toml`
pub fn default_config_path() -> PathBuf {
    default_vault_dir().join("config.toml")
}

impl NoteVaultConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            NoteVaultConfig::default()
        };

        config.apply_env_overrides();
        config.clamp_values();
        Ok(config)
    }

    /// Build a config rooted at `dir`: data files, models, and fonts all live under it.
    pub fn rooted_at(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let mut config = NoteVaultConfig::default();
        config.storage.data_dir = dir.to_string_lossy().into_owned();
        config.embedding.cache_dir = dir.join("models").to_string_lossy().into_owned();
        config.export.font_path = dir
            .join("fonts")
            .join("dejavu-sans")
            .join("DejaVuSans.ttf")
            .to_string_lossy()
            .into_owned();
        config
    }

    /// Apply environment variable overrides (NOTEVAULT_DIR, NOTEVAULT_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NOTEVAULT_DIR") {
            self.storage.data_dir = val;
        }
        if let Ok(val) = std::env::var("NOTEVAULT_LOG_LEVEL") {
            self.logging.log_level = val;
        }
    }

    /// Retrieval needs at least one neighbor.
    fn clamp_values(&mut self) {
        if self.retrieval.top_k == 0 {
            tracing::warn!("retrieval.top_k = 0 is not usable, using 1");
            self.retrieval.top_k = 1;
        }
    }

    /// Resolve the data directory, expanding `~` if needed.
    pub fn resolved_data_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.data_dir)
    }

    pub fn config_record_path(&self) -> PathBuf {
        self.resolved_data_dir().join("vault_config.json")
    }

    pub fn notes_path(&self) -> PathBuf {
        self.resolved_data_dir().join("notes.json")
    }

    pub fn salt_path(&self) -> PathBuf {
        self.resolved_data_dir().join("vault.salt")
    }

    pub fn usage_path(&self) -> PathBuf {
        self.resolved_data_dir().join("usage_stats.json")
    }

    pub fn feedback_path(&self) -> PathBuf {
        self.resolved_data_dir().join("feedback_log.json")
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
