use anyhow::Result;

use notevault::{NoteVaultConfig, Vault};

/// Display accumulated token usage and estimated cost.
pub fn usage(config: &NoteVaultConfig) -> Result<()> {
    let vault = Vault::open(config.clone())?;
    print_usage(&vault)
}

pub fn print_usage(vault: &Vault) -> Result<()> {
    println!("💰 Usage");
    println!("{}", "=".repeat(40));
    match vault.usage()? {
        Some(stats) => {
            println!("  Tokens:  {}", stats.total_tokens as u64);
            println!("  Cost:    ${:.5}", stats.total_cost);
        }
        None => println!("  No usage recorded yet."),
    }
    Ok(())
}
