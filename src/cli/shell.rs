//! CLI `shell` command: one interactive session with lock state and auto-lock.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input};
use std::io::Write;
use std::time::Instant;

use notevault::export::ExportFormat;
use notevault::notes::NoteDraft;
use notevault::{NoteVaultConfig, Vault};

use super::{ask, export, notes, open_initialized, read_pin, usage};

const HELP: &str = "\
Commands:
  list [query]          list visible notes
  show <id>             show a note
  add [--secret]        add a note
  edit <id>             edit a note
  delete <id>           delete a note
  ask <question>        ask about your notes (unlocked)
  summarize <text>      summarize text
  export <id> [pdf|docx]
  usage                 token usage and cost
  unlock | lock
  help | quit";

pub async fn shell(config: &NoteVaultConfig) -> Result<()> {
    let mut vault = open_initialized(config)?;
    println!("{}  (type `help` for commands)", vault.session().heading());

    let stdin = std::io::stdin();
    loop {
        print!("{}", prompt(&vault));
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        if vault.check_expiry() {
            println!("🚨 Vault auto-locked after inactivity.");
        }

        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match cmd {
            "" => {}
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            _ => {
                if let Err(e) = run(&mut vault, cmd, rest).await {
                    println!("Error: {e}");
                }
            }
        }
    }

    vault.lock();
    Ok(())
}

fn prompt(vault: &Vault) -> String {
    let session = vault.session();
    if session.is_unlocked() {
        format!("🔓 [{}s] > ", session.seconds_until_lock(Instant::now()))
    } else {
        "🔒 > ".to_string()
    }
}

fn parse_id(arg: &str) -> Result<i64> {
    arg.split_whitespace()
        .next()
        .unwrap_or("")
        .parse()
        .with_context(|| format!("expected a note id, got `{arg}`"))
}

async fn run(vault: &mut Vault, cmd: &str, rest: &str) -> Result<()> {
    match cmd {
        "unlock" => {
            vault.unlock(&read_pin("Vault PIN")?)?;
            println!("{}", vault.session().heading());
        }
        "lock" => {
            vault.lock();
            println!("{}", vault.session().heading());
        }
        "list" | "ls" => notes::print_listing(vault, rest),
        "show" => notes::print_note(vault, parse_id(rest)?)?,
        "add" => {
            let secret = rest == "--secret";
            let title: String = Input::new().with_prompt("Title").allow_empty(true).interact_text()?;
            let content: String = Input::new().with_prompt("Content").allow_empty(true).interact_text()?;
            let id = vault.save_note(NoteDraft::new(title, content).secret(secret))?;
            println!("Saved note {id}");
        }
        "edit" => {
            let mut draft = vault.edit_draft(parse_id(rest)?)?;
            draft.title = Input::new()
                .with_prompt("Title")
                .with_initial_text(draft.title.clone())
                .allow_empty(true)
                .interact_text()?;
            draft.content = Input::new()
                .with_prompt("Content")
                .with_initial_text(draft.content.clone())
                .allow_empty(true)
                .interact_text()?;
            draft.secret = Confirm::new()
                .with_prompt("Secret?")
                .default(draft.secret)
                .interact()?;
            let id = vault.save_note(draft)?;
            println!("Updated note {id}");
        }
        "delete" | "rm" => {
            let id = parse_id(rest)?;
            vault.delete_note(id)?;
            println!("Deleted note {id}");
        }
        "ask" => ask::answer_question(vault, rest).await?,
        "summarize" => println!("{}", vault.summarize(rest)),
        "export" => {
            let mut args = rest.split_whitespace();
            let id = parse_id(args.next().unwrap_or(""))?;
            let format: ExportFormat = args
                .next()
                .unwrap_or("pdf")
                .parse()
                .map_err(anyhow::Error::msg)?;
            let path = export::write_export(vault, id, format, None)?;
            println!("Exported note {id} to {}", path.display());
        }
        "usage" => usage::print_usage(vault)?,
        other => println!("Unknown command `{other}`. Type `help`."),
    }
    Ok(())
}
