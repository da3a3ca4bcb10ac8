//! CLI `ask` command: retrieval-augmented question with optional feedback.

use anyhow::Result;
use dialoguer::Select;
use std::io::IsTerminal;

use notevault::embedding::Retrieval;
use notevault::ledger::FeedbackStatus;
use notevault::{Answer, NoteVaultConfig, Vault};

use super::{open_initialized, unlock};

pub async fn ask(config: &NoteVaultConfig, question: &str) -> Result<()> {
    let mut vault = open_initialized(config)?;
    unlock(&mut vault)?;
    answer_question(&mut vault, question).await
}

/// Answer `question` from the vault, print it, and ask whether it was right.
pub async fn answer_question(vault: &mut Vault, question: &str) -> Result<()> {
    let answer = vault.ask(question).await?;
    println!("{}", answer.text);

    if answer.retrieval == Retrieval::NoNotes || !std::io::stdin().is_terminal() {
        return Ok(());
    }
    if let Some(status) = prompt_feedback()? {
        record(vault, &answer, status)?;
    }
    Ok(())
}

fn prompt_feedback() -> Result<Option<FeedbackStatus>> {
    let choice = Select::new()
        .with_prompt("Was this answer correct?")
        .items(&["✅ Yes", "❌ No", "Skip"])
        .default(2)
        .interact_opt()?;
    Ok(match choice {
        Some(0) => Some(FeedbackStatus::Correct),
        Some(1) => Some(FeedbackStatus::Wrong),
        _ => None,
    })
}

fn record(vault: &Vault, answer: &Answer, status: FeedbackStatus) -> Result<()> {
    vault.record_feedback(answer, status)?;
    match status {
        FeedbackStatus::Correct => println!("Feedback saved. Thanks!"),
        FeedbackStatus::Wrong => println!("Logged for review."),
    }
    Ok(())
}
