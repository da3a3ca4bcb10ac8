pub mod ask;
pub mod export;
pub mod init;
pub mod notes;
pub mod reset;
pub mod shell;
pub mod usage;

use anyhow::{Context, Result};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tokio::io::AsyncWriteExt;

use notevault::config::{EmbeddingConfig, NoteVaultConfig};
use notevault::embedding::local::{model_files, model_is_downloaded, MODEL_FILE, TOKENIZER_FILE};
use notevault::Vault;

const MODEL_BASE_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

/// Environment variable consulted before prompting for the PIN.
pub const PIN_ENV: &str = "NOTEVAULT_PIN";

/// Open the configured vault, failing early if setup has not been run.
pub fn open_initialized(config: &NoteVaultConfig) -> Result<Vault> {
    let vault = Vault::open(config.clone())?;
    anyhow::ensure!(
        vault.is_initialized(),
        "vault is not initialized; run `notevault init` first"
    );
    Ok(vault)
}

/// PIN from `NOTEVAULT_PIN`, or a hidden terminal prompt.
pub fn read_pin(prompt: &str) -> Result<String> {
    if let Ok(pin) = std::env::var(PIN_ENV) {
        return Ok(pin);
    }
    Password::new()
        .with_prompt(prompt)
        .interact()
        .context("failed to read PIN")
}

/// Prompt for the PIN and unlock.
pub fn unlock(vault: &mut Vault) -> Result<()> {
    let pin = read_pin("Vault PIN")?;
    vault.unlock(&pin)?;
    Ok(())
}

/// Download the ONNX embedding model and tokenizer to the cache directory.
pub async fn model_download(config: &EmbeddingConfig) -> Result<()> {
    let (model_path, tokenizer_path) = model_files(config);
    if model_is_downloaded(config) {
        println!("Embedding model already present in {}", config.cache_dir);
        return Ok(());
    }
    if let Some(dir) = model_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create cache dir: {}", dir.display()))?;
    }

    for (file, dest, label) in [
        (MODEL_FILE, &model_path, "model.onnx (~90MB)"),
        (TOKENIZER_FILE, &tokenizer_path, "tokenizer.json"),
    ] {
        if dest.exists() {
            println!("{file} already present at {}", dest.display());
            continue;
        }
        let url = if file == MODEL_FILE {
            format!("{MODEL_BASE_URL}/onnx/{file}")
        } else {
            format!("{MODEL_BASE_URL}/{file}")
        };
        println!("Downloading {label}...");
        download_file(&url, dest).await?;
        println!("Saved to {}", dest.display());
    }

    println!("Embedding model ready.");
    Ok(())
}

/// Download a file with a progress bar. Writes to a temp file, then renames.
async fn download_file(url: &str, dest: &Path) -> Result<()> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("HTTP request failed for {url}"))?;

    anyhow::ensure!(
        response.status().is_success(),
        "download failed with HTTP {}",
        response.status()
    );

    let pb = match response.content_length() {
        Some(size) => {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  {bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")?
                    .progress_chars("##-"),
            );
            pb
        }
        None => ProgressBar::new_spinner(),
    };

    let tmp_path = dest.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp_path)
        .await
        .with_context(|| format!("failed to create temp file: {}", tmp_path.display()))?;

    let bytes = response.bytes().await.context("error reading response")?;
    pb.inc(bytes.len() as u64);
    file.write_all(&bytes)
        .await
        .context("error writing to file")?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp_path, dest)
        .await
        .context("failed to rename temp file")?;

    pb.finish_and_clear();
    tracing::info!(path = %dest.display(), "model file downloaded");
    Ok(())
}
