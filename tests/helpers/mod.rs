#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use notevault::ai::GeminiClient;
use notevault::embedding::EmbeddingProvider;
use notevault::ledger::UsageLedger;
use notevault::{NoteVaultConfig, Vault};
use tempfile::TempDir;

pub const TEST_PIN: &str = "1234";

/// Deterministic embedder: one axis per keyword, plus a constant bias axis.
/// Texts sharing keywords land close together.
pub struct KeywordEmbedder {
    keywords: Vec<&'static str>,
}

impl Default for KeywordEmbedder {
    fn default() -> Self {
        Self {
            keywords: vec!["wifi", "password", "grocery", "milk", "rust", "flight", "dentist"],
        }
    }
}

impl EmbeddingProvider for KeywordEmbedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut v: Vec<f32> = self
            .keywords
            .iter()
            .map(|k| lower.matches(k).count() as f32)
            .collect();
        v.push(0.1);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.keywords.len() + 1
    }
}

/// Config rooted in `dir` with no request delay.
pub fn test_config(dir: &Path) -> NoteVaultConfig {
    let mut config = NoteVaultConfig::rooted_at(dir);
    config.ai.request_delay_ms = 0;
    config
}

/// Answering client pointed at `api_base` with an explicit key.
pub fn ai_client(config: &NoteVaultConfig, api_base: &str, api_key: Option<&str>) -> GeminiClient {
    let mut ai = config.ai.clone();
    ai.api_base = api_base.to_string();
    let usage = UsageLedger::new(config.usage_path(), ai.cost_per_1k_tokens);
    GeminiClient::from_config(&ai, usage)
        .unwrap()
        .with_api_key(api_key.map(String::from))
}

/// Fresh vault in `tmp` using the keyword embedder and no API key.
pub fn test_vault(tmp: &TempDir) -> Vault {
    vault_with_ai(tmp, "http://127.0.0.1:9", None)
}

/// Vault in `tmp` whose answering client talks to `api_base`.
pub fn vault_with_ai(tmp: &TempDir, api_base: &str, api_key: Option<&str>) -> Vault {
    let config = test_config(tmp.path());
    let ai = ai_client(&config, api_base, api_key);
    Vault::open(config)
        .unwrap()
        .with_embedder(Arc::new(KeywordEmbedder::default()))
        .with_ai_client(ai)
}

/// Initialized with [`TEST_PIN`] and unlocked.
pub fn unlocked_vault(tmp: &TempDir) -> Vault {
    let mut vault = test_vault(tmp);
    vault.initialize(TEST_PIN, TEST_PIN).unwrap();
    vault.unlock(TEST_PIN).unwrap();
    vault
}
