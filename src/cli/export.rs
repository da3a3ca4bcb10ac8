//! CLI `export` command: write one note as PDF or DOCX.

use anyhow::{Context, Result};
use std::path::PathBuf;

use notevault::export::{file_name_for, ExportFormat};
use notevault::{NoteVaultConfig, Vault};

use super::{open_initialized, unlock};

pub fn export(
    config: &NoteVaultConfig,
    id: i64,
    format: ExportFormat,
    out: Option<PathBuf>,
    unlock_first: bool,
) -> Result<()> {
    let mut vault = open_initialized(config)?;
    if unlock_first {
        unlock(&mut vault)?;
    }
    let path = write_export(&mut vault, id, format, out)?;
    println!("Exported note {id} to {}", path.display());
    Ok(())
}

/// Render note `id` and write it to `out`, or `<title>.<ext>` when not given.
pub fn write_export(
    vault: &mut Vault,
    id: i64,
    format: ExportFormat,
    out: Option<PathBuf>,
) -> Result<PathBuf> {
    let bytes = vault.export(id, format)?;
    let path = match out {
        Some(path) => path,
        None => PathBuf::from(file_name_for(&vault.note(id)?.title, format)),
    };
    std::fs::write(&path, bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
