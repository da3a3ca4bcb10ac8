//! CLI `reset` command: forget the PIN using the recovery key.

use anyhow::{bail, Result};
use dialoguer::Password;
use std::io::Write;

use notevault::NoteVaultConfig;

use super::open_initialized;

/// Verify the recovery key and delete the credential record after user confirmation.
pub fn reset(config: &NoteVaultConfig) -> Result<()> {
    let mut vault = open_initialized(config)?;

    println!("WARNING: This removes the PIN. Notes are kept, but secret notes stay");
    println!("encrypted under the old PIN and only that PIN can read them.");
    println!("Vault: {}", config.resolved_data_dir().display());
    print!("\nType YES to confirm: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if input.trim() != "YES" {
        bail!("reset cancelled");
    }

    let key = Password::new().with_prompt("Recovery key").interact()?;
    vault.reset_with_recovery_key(key.trim())?;

    println!("PIN removed. Run `notevault init` to set a new one.");
    Ok(())
}
