//! CLI note commands: add, edit, delete, list, show, summarize.

use anyhow::{Context, Result};
use std::io::Read;

use notevault::notes::{Note, NoteDraft};
use notevault::{NoteVaultConfig, Vault};

use super::{open_initialized, unlock};

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf.trim_end().to_string())
}

/// Open the vault, unlocking it when asked.
fn open(config: &NoteVaultConfig, unlock_first: bool) -> Result<Vault> {
    let mut vault = open_initialized(config)?;
    if unlock_first {
        unlock(&mut vault)?;
    }
    Ok(vault)
}

pub fn add(
    config: &NoteVaultConfig,
    title: String,
    content: Option<String>,
    secret: bool,
) -> Result<()> {
    let mut vault = open(config, secret)?;
    let content = match content {
        Some(c) => c,
        None => read_stdin()?,
    };
    let id = vault.save_note(NoteDraft::new(title, content).secret(secret))?;
    println!("Saved note {id}{}", if secret { " (secret)" } else { "" });
    Ok(())
}

pub fn edit(
    config: &NoteVaultConfig,
    id: i64,
    title: Option<String>,
    content: Option<String>,
    secret: Option<bool>,
) -> Result<()> {
    let mut vault = open_initialized(config)?;
    let needs_key = secret.unwrap_or(false)
        || vault.notes().iter().any(|n| n.id == id && n.secret);
    if needs_key {
        unlock(&mut vault)?;
    }

    let mut draft = vault.edit_draft(id)?;
    if let Some(title) = title {
        draft.title = title;
    }
    if let Some(content) = content {
        draft.content = content;
    }
    if let Some(secret) = secret {
        draft.secret = secret;
    }
    vault.save_note(draft)?;
    println!("Updated note {id}");
    Ok(())
}

pub fn delete(config: &NoteVaultConfig, id: i64, unlock_first: bool) -> Result<()> {
    let mut vault = open(config, unlock_first)?;
    vault.delete_note(id)?;
    println!("Deleted note {id}");
    Ok(())
}

fn print_summary(vault: &Vault, note: &Note) {
    let lock = if note.secret { "🔒 " } else { "" };
    println!("[{}] {lock}{}  ({})", note.id, note.title, note.timestamp);
    println!("    {}", vault.preview(note).replace('\n', "\n    "));
}

pub fn list(config: &NoteVaultConfig, query: &str, unlock_first: bool) -> Result<()> {
    let vault = open(config, unlock_first)?;
    print_listing(&vault, query);
    Ok(())
}

/// Heading plus one summary per matching note.
pub fn print_listing(vault: &Vault, query: &str) {
    println!("{}", vault.session().heading());
    println!("{}", "=".repeat(40));
    let notes = vault.list(query);
    if notes.is_empty() {
        println!("No notes.");
    }
    for note in notes {
        print_summary(vault, note);
    }
}

pub fn show(config: &NoteVaultConfig, id: i64, unlock_first: bool) -> Result<()> {
    let vault = open(config, unlock_first)?;
    print_note(&vault, id)
}

pub fn print_note(vault: &Vault, id: i64) -> Result<()> {
    let note = vault.note(id)?;
    println!("{}", note.title);
    println!("{}", "-".repeat(40));
    println!("{}", vault.display_content(note));
    println!();
    println!("Saved: {}", note.timestamp);
    Ok(())
}

pub fn summarize(config: &NoteVaultConfig, text: Option<String>) -> Result<()> {
    let mut vault = Vault::open(config.clone())?;
    let text = match text {
        Some(t) => t,
        None => read_stdin()?,
    };
    println!("{}", vault.summarize(&text));
    Ok(())
}
