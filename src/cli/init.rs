//! CLI `init` command: first-run PIN setup.

use anyhow::{bail, Result};
use dialoguer::Password;

use notevault::{NoteVaultConfig, Vault};

/// Prompt for a PIN twice and initialize the vault, printing the recovery key once.
pub fn init(config: &NoteVaultConfig) -> Result<()> {
    let mut vault = Vault::open(config.clone())?;
    if vault.is_initialized() {
        bail!("vault is already initialized at {}", config.resolved_data_dir().display());
    }

    println!("🔐 Vault Setup");
    let pin = Password::new().with_prompt("Create PIN").interact()?;
    let confirm = Password::new().with_prompt("Confirm PIN").interact()?;

    let recovery_key = vault.initialize(&pin, &confirm)?;

    println!();
    println!("Vault initialized.");
    println!("RECOVERY KEY: {recovery_key}");
    println!("Write it down. It is shown only once and is the only way to reset a forgotten PIN.");
    Ok(())
}
