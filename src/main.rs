mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use notevault::export::ExportFormat;
use notevault::NoteVaultConfig;

#[derive(Parser)]
#[command(name = "notevault", version, about = "PIN-protected note vault with AI answers")]
struct Cli {
    /// Config file (default: ~/.notevault/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Set the PIN and print a one-time recovery key
    Init,
    /// Add a note
    Add {
        #[arg(long, short)]
        title: String,
        /// Note body (read from stdin when omitted)
        #[arg(long, short)]
        content: Option<String>,
        /// Encrypt the note; requires the PIN
        #[arg(long)]
        secret: bool,
    },
    /// Edit a note in place
    Edit {
        id: i64,
        #[arg(long, short)]
        title: Option<String>,
        #[arg(long, short)]
        content: Option<String>,
        /// Mark the note secret (true) or public (false)
        #[arg(long)]
        secret: Option<bool>,
    },
    /// Delete a note
    Delete {
        id: i64,
        #[arg(long)]
        unlock: bool,
    },
    /// List notes, optionally filtered by a search term
    List {
        query: Option<String>,
        /// Unlock first so secret notes are shown
        #[arg(long)]
        unlock: bool,
    },
    /// Show one note in full
    Show {
        id: i64,
        #[arg(long)]
        unlock: bool,
    },
    /// Ask a question answered from your notes
    Ask { question: String },
    /// Summarize text (read from stdin when omitted)
    Summarize { text: Option<String> },
    /// Export a note as PDF or DOCX
    Export {
        id: i64,
        #[arg(long, short, default_value = "pdf")]
        format: ExportFormat,
        /// Output file (default: <title>.<ext> in the current directory)
        #[arg(long, short)]
        out: Option<PathBuf>,
        #[arg(long)]
        unlock: bool,
    },
    /// Show AI token usage and estimated cost
    Usage,
    /// Forget the PIN using the recovery key
    Reset,
    /// Interactive session with auto-lock
    Shell,
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.notevault/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    // GEMINI_API_KEY and friends may come from a .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NoteVaultConfig::load_from(path)?,
        None => NoteVaultConfig::load()?,
    };

    // Log to stderr so note output on stdout stays clean.
    let filter = EnvFilter::try_new(&config.logging.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Init => cli::init::init(&config)?,
        Command::Add {
            title,
            content,
            secret,
        } => cli::notes::add(&config, title, content, secret)?,
        Command::Edit {
            id,
            title,
            content,
            secret,
        } => cli::notes::edit(&config, id, title, content, secret)?,
        Command::Delete { id, unlock } => cli::notes::delete(&config, id, unlock)?,
        Command::List { query, unlock } => {
            cli::notes::list(&config, query.as_deref().unwrap_or(""), unlock)?
        }
        Command::Show { id, unlock } => cli::notes::show(&config, id, unlock)?,
        Command::Ask { question } => cli::ask::ask(&config, &question).await?,
        Command::Summarize { text } => cli::notes::summarize(&config, text)?,
        Command::Export {
            id,
            format,
            out,
            unlock,
        } => cli::export::export(&config, id, format, out, unlock)?,
        Command::Usage => cli::usage::usage(&config)?,
        Command::Reset => cli::reset::reset(&config)?,
        Command::Shell => cli::shell::shell(&config).await?,
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.embedding).await?;
            }
        },
    }

    Ok(())
}
